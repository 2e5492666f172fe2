// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawn: a single process lifetime of a vendor agent CLI acting for an [`Agent`](crate::agent::Agent).

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a spawn (one process lifetime).
    pub struct SpawnId;
}

/// The vendor CLI a spawn's process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderName {
    Claude,
    Codex,
    Gemini,
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderName::Claude => "claude",
            ProviderName::Codex => "codex",
            ProviderName::Gemini => "gemini",
        };
        write!(f, "{s}")
    }
}

/// Sovereign spawns are the agent's one standing process; directed spawns are
/// one-off invocations (e.g. a task dispatched to a helper) that may coexist
/// with a sovereign spawn for the same agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMode {
    Sovereign,
    Directed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnStatus {
    Active,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawn {
    pub id: SpawnId,
    pub agent_id: AgentId,
    /// The spawn that dispatched this one, if any (directed spawns and
    /// resumes launched on another agent's behalf).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_spawn_id: Option<SpawnId>,
    pub provider: ProviderName,
    pub mode: SpawnMode,
    pub status: SpawnStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<i32>,
    /// Vendor session identifier captured from the first `context_init` event,
    /// used to build `--resume` arguments on relaunch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Canonical error token (see the stderr pattern table); empty/null on a
    /// clean completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// SHA-256 hash chain over the trace file, set once the spawn finalizes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_hash: Option<String>,
    #[serde(default)]
    pub resume_count: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Canonical error tokens the stderr pattern table and the scheduler's
/// resume step both key off of.
pub const RESUMABLE_ERRORS: &[&str] = &["reaped", "orphaned process", "terminated", "timeout", "no summary"];

impl Spawn {
    pub fn is_active(&self) -> bool {
        matches!(self.status, SpawnStatus::Active)
    }

    pub fn is_sovereign(&self) -> bool {
        matches!(self.mode, SpawnMode::Sovereign)
    }

    /// A spawn is resumable iff it has a non-empty session id and is done.
    pub fn is_resumable(&self) -> bool {
        !self.is_active() && matches!(&self.session_id, Some(s) if !s.is_empty())
    }

    /// Whether this done spawn crashed with an error the scheduler's resume
    /// step will retry (at most once, via `resume_count`).
    pub fn is_recognized_crash(&self) -> bool {
        !self.is_active()
            && self
                .error
                .as_deref()
                .map(|e| RESUMABLE_ERRORS.iter().any(|token| e.starts_with(token)))
                .unwrap_or(false)
    }

    /// Invariant: a `done` spawn must carry a non-empty summary or a
    /// non-null error. Checked before persisting a transition to `done`.
    pub fn has_valid_terminal_state(&self) -> bool {
        if self.is_active() {
            return true;
        }
        matches!(&self.summary, Some(s) if !s.is_empty()) || self.error.is_some()
    }
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
