// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reply: a threaded comment against a decision, insight, or task, carrying
//! `@handle` mentions (with `@human` expanding to every human agent).

use crate::agent::{AgentId, ProjectId};
use crate::spawn::SpawnId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

crate::define_id! {
    /// Unique identifier for a reply.
    pub struct ReplyId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentType {
    Insight,
    Decision,
    Task,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: ReplyId,
    pub parent_type: ParentType,
    pub parent_id: String,
    pub author_id: AgentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_id: Option<SpawnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub content: String,
    #[serde(default)]
    pub mentions: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn mention_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"@([a-zA-Z0-9_-]+)").expect("mention regex is a compile-time constant")
    })
}

/// Parse `@handle` mentions from `content`. `@human` is left as the literal
/// string `"human"`; the ledger expands it to every human agent's handle at
/// insert time (the parser here stays ignorant of the roster).
pub fn parse_mentions(content: &str) -> Vec<String> {
    mention_pattern()
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .collect()
}

#[cfg(test)]
#[path = "reply_tests.rs"]
mod tests;
