// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task: a unit of work claimed by exactly one agent at a time.

use crate::agent::{AgentId, ProjectId};
use crate::decision::DecisionId;
use crate::spawn::SpawnId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a task.
    pub struct TaskId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Active,
    Done,
    Cancelled,
}

impl TaskStatus {
    /// Valid target statuses from the current one.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Active, Pending)
                | (Pending, Done)
                | (Active, Done)
                | (Pending, Cancelled)
                | (Active, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub creator_id: AgentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_id: Option<DecisionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_id: Option<SpawnId>,
    pub content: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum TaskTransitionError {
    #[error("cannot move task from {from:?} to {to:?}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },
    #[error("claiming a task requires an assignee")]
    MissingAssignee,
    #[error("task is assigned to another agent")]
    WrongAssignee,
}

impl Task {
    pub fn set_status(
        &mut self,
        next: TaskStatus,
        acting_agent: Option<&AgentId>,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), TaskTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TaskTransitionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        if matches!(self.status, TaskStatus::Active) {
            if let (Some(current), Some(acting)) = (&self.assignee_id, acting_agent) {
                if current != acting {
                    return Err(TaskTransitionError::WrongAssignee);
                }
            }
        }
        if next == TaskStatus::Active {
            let agent = acting_agent.ok_or(TaskTransitionError::MissingAssignee)?;
            self.assignee_id = Some(agent.clone());
        }
        self.status = next;
        if matches!(next, TaskStatus::Done | TaskStatus::Cancelled) {
            self.closed_at = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
