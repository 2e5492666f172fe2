// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Insight: a short, citable observation an agent records for the swarm.

use crate::agent::{AgentId, ProjectId};
use crate::decision::DecisionId;
use crate::spawn::SpawnId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an insight.
    pub struct InsightId;
}

pub const INSIGHT_MAX_LEN: usize = 280;

/// How an insight came to be, derived at creation time from the citations it
/// carries against *other* agents' authorship (never the author's own work).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// No citations of other agents' decisions/insights.
    Solo,
    /// Cites exactly one other agent's work.
    Collaborative,
    /// Cites two or more other agents' work.
    Synthesis,
}

impl Provenance {
    /// Classify from a count of distinct *other* agents cited.
    pub fn from_other_agent_count(n: usize) -> Self {
        match n {
            0 => Provenance::Solo,
            1 => Provenance::Collaborative,
            _ => Provenance::Synthesis,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: InsightId,
    pub project_id: ProjectId,
    pub agent_id: AgentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_id: Option<SpawnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_id: Option<DecisionId>,
    pub domain: String,
    pub content: String,
    #[serde(default = "default_true")]
    pub open: bool,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    /// Recorded when closed: could one agent have reached this alone?
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterfactual: Option<bool>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum InsightValidationError {
    #[error("insight content is empty")]
    Empty,
    #[error("insight content is {len} characters, exceeding the {max} limit")]
    TooLong { len: usize, max: usize },
}

impl Insight {
    pub fn validate_content(content: &str) -> Result<(), InsightValidationError> {
        if content.trim().is_empty() {
            return Err(InsightValidationError::Empty);
        }
        if content.chars().count() > INSIGHT_MAX_LEN {
            return Err(InsightValidationError::TooLong {
                len: content.chars().count(),
                max: INSIGHT_MAX_LEN,
            });
        }
        Ok(())
    }

    pub fn is_question(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
#[path = "insight_tests.rs"]
mod tests;
