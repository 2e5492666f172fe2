// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tasks: units of work claimed by exactly one agent at a time.

use crate::rows::task_from_row;
use crate::{Ledger, LedgerError};
use chrono::Utc;
use space_core::{AgentId, Task, TaskId, TaskStatus};
use space_store::{resolve, Query, TASKS};

pub struct Tasks<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

const COLUMNS: &str = "id, project_id, creator_id, assignee_id, decision_id, spawn_id, content, \
    status, result, created_at, closed_at, deleted_at";

impl<I: space_core::IdGen> Tasks<'_, I> {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &self,
        project_id: &str,
        creator_id: &str,
        assignee_id: Option<&str>,
        decision_id: Option<&str>,
        spawn_id: Option<&str>,
        content: &str,
    ) -> Result<Task, LedgerError> {
        if content.trim().is_empty() {
            return Err(LedgerError::Validation("task content is empty".to_string()));
        }
        let task = Task {
            id: TaskId::new(self.ledger.ids.next()),
            project_id: project_id.into(),
            creator_id: creator_id.into(),
            assignee_id: assignee_id.map(Into::into),
            decision_id: decision_id.map(Into::into),
            spawn_id: spawn_id.map(Into::into),
            content: content.to_string(),
            status: if assignee_id.is_some() { TaskStatus::Active } else { TaskStatus::Pending },
            result: None,
            created_at: crate::rows::now(),
            closed_at: None,
            deleted_at: None,
        };
        self.ledger.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (id, project_id, creator_id, assignee_id, decision_id, spawn_id,
                    content, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    task.id.as_str(),
                    task.project_id.as_str(),
                    task.creator_id.as_str(),
                    task.assignee_id.as_ref().map(|a| a.as_str()),
                    task.decision_id.as_ref().map(|d| d.as_str()),
                    task.spawn_id.as_ref().map(|s| s.as_str()),
                    task.content,
                    status_str(task.status),
                    task.created_at,
                ],
            )?;
            Ok(())
        })?;
        Ok(task)
    }

    pub fn get(&self, reference: &str) -> Result<Task, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let id = resolve(conn, TASKS, reference)?;
            let sql = format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1");
            conn.query_row(&sql, [&id], task_from_row).map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => space_store::StoreError::NotFound {
                    table: "tasks".to_string(),
                    reference: reference.to_string(),
                },
                other => space_store::StoreError::Sqlite(other),
            })
        })?)
    }

    pub fn fetch_for_agent(&self, agent_id: &str) -> Result<Vec<Task>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("tasks", COLUMNS)
                .where_clause("assignee_id = ?1", agent_id.to_string())
                .not_deleted()
                .raw("status IN ('pending', 'active')")
                .order("created_at ASC")
                .fetch(conn, task_from_row)
        })?)
    }

    pub fn fetch_open(&self, project_id: &str) -> Result<Vec<Task>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("tasks", COLUMNS)
                .where_clause("project_id = ?1", project_id.to_string())
                .not_deleted()
                .raw("status IN ('pending', 'active')")
                .order("created_at ASC")
                .fetch(conn, task_from_row)
        })?)
    }

    /// Moves `reference` to `next`, optionally as `acting_agent` (required
    /// when transitioning into `Active`, and enforced as the holder when
    /// leaving `Active`).
    pub fn set_status(
        &self,
        reference: &str,
        next: TaskStatus,
        acting_agent: Option<&str>,
        result: Option<String>,
    ) -> Result<Task, LedgerError> {
        let mut task = self.get(reference)?;
        let acting = acting_agent.map(AgentId::new);
        task.set_status(next, acting.as_ref(), Utc::now())
            .map_err(|e| LedgerError::State(e.to_string()))?;
        task.result = result.or(task.result);
        self.ledger.store.with_conn(|conn| {
            conn.execute(
                "UPDATE tasks SET status = ?1, assignee_id = ?2, result = ?3, closed_at = ?4
                 WHERE id = ?5",
                rusqlite::params![
                    status_str(task.status),
                    task.assignee_id.as_ref().map(|a| a.as_str()),
                    task.result,
                    task.closed_at,
                    task.id.as_str(),
                ],
            )?;
            Ok(())
        })?;
        Ok(task)
    }

    /// Reassigns an active task to another agent without going through
    /// `Pending`, for a human handing work off mid-flight.
    pub fn switch(&self, reference: &str, new_assignee: &str) -> Result<Task, LedgerError> {
        let mut task = self.get(reference)?;
        if task.status != TaskStatus::Active && task.status != TaskStatus::Pending {
            return Err(LedgerError::State(format!(
                "cannot switch assignee of a task in status {:?}",
                task.status
            )));
        }
        task.assignee_id = Some(new_assignee.into());
        task.status = TaskStatus::Active;
        self.ledger.store.with_conn(|conn| {
            conn.execute(
                "UPDATE tasks SET assignee_id = ?1, status = ?2 WHERE id = ?3",
                rusqlite::params![new_assignee, status_str(TaskStatus::Active), task.id.as_str()],
            )?;
            Ok(())
        })?;
        Ok(task)
    }

    pub fn delete(&self, reference: &str) -> Result<(), LedgerError> {
        let task = self.get(reference)?;
        self.ledger.artifacts().soft_delete("tasks", task.id.as_str())
    }
}

fn status_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Active => "active",
        TaskStatus::Done => "done",
        TaskStatus::Cancelled => "cancelled",
    }
}
