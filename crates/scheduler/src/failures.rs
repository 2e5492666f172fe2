// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A short-lived backoff for agents whose last launch attempt errored,
//! backed by the shared runtime state file rather than the ledger — this
//! is scheduling hygiene, not a durable record.

use crate::SchedulerError;
use space_config::StateFile;
use space_core::AgentId;
use std::collections::{HashMap, HashSet};

pub const FAILURE_BACKOFF_SECONDS: i64 = 300;

const KEY: &str = "agent_failures";

/// Agent ids whose most recent recorded failure is still within the
/// backoff window.
pub fn recently_failed_agents(state: &StateFile, now: chrono::DateTime<chrono::Utc>) -> Result<HashSet<AgentId>, SchedulerError> {
    let failures = load(state)?;
    let cutoff = now.timestamp() - FAILURE_BACKOFF_SECONDS;
    Ok(failures.into_iter().filter(|(_, ts)| *ts > cutoff).map(|(id, _)| AgentId::new(id)).collect())
}

pub fn record_agent_failure(state: &StateFile, agent_id: &AgentId, error: &str, now: chrono::DateTime<chrono::Utc>) -> Result<(), SchedulerError> {
    let mut failures = load(state)?;
    failures.insert(agent_id.as_str().to_string(), now.timestamp());
    save(state, &failures)?;
    tracing::warn!(agent = agent_id.as_str(), error = %truncate(error, 100), "recorded agent failure");
    Ok(())
}

pub fn clear_agent_failure(state: &StateFile, agent_id: &AgentId) -> Result<(), SchedulerError> {
    let mut failures = load(state)?;
    if failures.remove(agent_id.as_str()).is_some() {
        save(state, &failures)?;
    }
    Ok(())
}

fn load(state: &StateFile) -> Result<HashMap<String, i64>, SchedulerError> {
    let value = state.get(KEY)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()).unwrap_or_default())
}

fn save(state: &StateFile, failures: &HashMap<String, i64>) -> Result<(), SchedulerError> {
    state.set(KEY, serde_json::to_value(failures).unwrap_or_default())?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
#[path = "failures_tests.rs"]
mod tests;
