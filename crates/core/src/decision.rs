// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision: a proposal an agent raises for another agent (often a human) to
//! commit, action, or reject.
//!
//! Status is not a stored enum — it is derived from which of
//! `committed_at`/`actioned_at`/`rejected_at` are set, the way the rest of
//! the timestamp-as-state-machine fields in this model work.

use crate::agent::{AgentId, ProjectId};
use crate::spawn::SpawnId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a decision.
    pub struct DecisionId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Proposed,
    Committed,
    Actioned,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub project_id: ProjectId,
    pub agent_id: AgentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_id: Option<SpawnId>,
    pub content: String,
    pub rationale: String,
    /// Whether the decision, once actioned, can be cleanly undone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default)]
    pub refs: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actioned_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, thiserror::Error)]
#[error("cannot {action} a decision in status {status:?}")]
pub struct DecisionStateError {
    pub action: &'static str,
    pub status: DecisionStatus,
}

impl Decision {
    pub fn status(&self) -> DecisionStatus {
        if self.rejected_at.is_some() {
            DecisionStatus::Rejected
        } else if self.actioned_at.is_some() {
            DecisionStatus::Actioned
        } else if self.committed_at.is_some() {
            DecisionStatus::Committed
        } else {
            DecisionStatus::Proposed
        }
    }

    /// A committed decision mentioning `@human` that hasn't been actioned or
    /// rejected yet — the target of the daemon's 48h decay sweep.
    pub fn is_human_blocked(&self) -> bool {
        self.status() == DecisionStatus::Committed && self.content.contains("@human")
    }

    pub fn commit(&mut self, at: chrono::DateTime<chrono::Utc>) -> Result<(), DecisionStateError> {
        if self.status() != DecisionStatus::Proposed {
            return Err(DecisionStateError { action: "commit", status: self.status() });
        }
        self.committed_at = Some(at);
        Ok(())
    }

    pub fn action(&mut self, outcome: Option<String>, at: chrono::DateTime<chrono::Utc>) -> Result<(), DecisionStateError> {
        if self.status() != DecisionStatus::Committed {
            return Err(DecisionStateError { action: "action", status: self.status() });
        }
        self.actioned_at = Some(at);
        self.outcome = outcome;
        Ok(())
    }

    pub fn reject(&mut self, at: chrono::DateTime<chrono::Utc>) -> Result<(), DecisionStateError> {
        if !matches!(self.status(), DecisionStatus::Proposed | DecisionStatus::Committed) {
            return Err(DecisionStateError { action: "reject", status: self.status() });
        }
        self.rejected_at = Some(at);
        Ok(())
    }

    pub fn uncommit(&mut self) -> Result<(), DecisionStateError> {
        if self.status() != DecisionStatus::Committed {
            return Err(DecisionStateError { action: "uncommit", status: self.status() });
        }
        self.committed_at = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
