// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identity: the persistent roster entry a spawn acts on behalf of.
//!
//! An [`Agent`] is not a process. It is a row that outlives any number of
//! [`crate::spawn::Spawn`]s — the handle a human or another agent addresses
//! in a citation, a task assignment, or an `@mention`.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an agent roster entry.
    pub struct AgentId;
}

crate::define_id! {
    /// Unique identifier for a project.
    pub struct ProjectId;
}

/// Name of the project every install is seeded with; always exists.
pub const GLOBAL_PROJECT_NAME: &str = "_global";

/// Whether an agent is a human operator, an AI identity bound to a provider,
/// or a non-interactive system actor (used for daemon-authored rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Human,
    Ai,
    System,
}

/// A roster entry: a human, AI, or system identity that can be spawned,
/// cited, assigned tasks, and mentioned in replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Short, unique, human-typed handle (`@handle` in replies).
    pub handle: String,
    pub kind: AgentKind,
    /// Default model hint; the router may substitute on cooldown/capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Identity prompt name under `agents/<handle>/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Set when this agent has been merged into another (archived with a pointer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_into: Option<AgentId>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Agent {
    pub fn is_human(&self) -> bool {
        matches!(self.kind, AgentKind::Human)
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Standard,
    Proto,
    Customer,
}

/// A project: the unit of grouping for agents, decisions, insights, and tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub kind: ProjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Project {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
