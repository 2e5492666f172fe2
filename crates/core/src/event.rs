// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical event kinds every provider adapter normalizes raw vendor output
//! into. These are what the trace store persists, the pub/sub bus fans out,
//! and the monitor thread inspects for state/session-id/auto-summary signals.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonicalEvent {
    Text {
        role: Role,
        content: String,
    },
    ToolCall {
        tool_use_id: String,
        tool_name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        tool_name: Option<String>,
        #[serde(default)]
        is_error: bool,
        output: String,
    },
    Usage {
        input_tokens: u64,
        output_tokens: u64,
        #[serde(default)]
        cache_read_tokens: u64,
    },
    ContextInit {
        session_id: String,
        #[serde(default)]
        resumed: bool,
    },
    StateChange {
        state: SpawnState,
    },
    Daemon {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnState {
    Working,
    WaitingForInput,
    Idle,
}

impl CanonicalEvent {
    /// Events that count as "work happened" for `has_work_events` — the
    /// distinction between a spawn that merely woke up and exited versus one
    /// that actually did something before failing.
    pub fn is_work_event(&self) -> bool {
        matches!(
            self,
            CanonicalEvent::ToolCall { .. }
                | CanonicalEvent::ToolResult { .. }
                | CanonicalEvent::Text {
                    role: Role::Assistant,
                    ..
                }
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
