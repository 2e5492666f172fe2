// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launching one picked agent, and the bookkeeping around a launch that
//! fails: recording the failure for the backoff window, and raising a
//! provider cooldown plus a one-shot quota-block insight if the failure
//! was a provider error.

use crate::SchedulerError;
use chrono::{DateTime, Utc};
use space_config::StateFile;
use space_core::{Agent, IdGen};
use space_engine::{LaunchEnv, LaunchRequest};
use space_ledger::Ledger;
use space_router::Router;
use std::time::Duration;

/// Resolves `agent`'s model through the router, and if available, launches
/// it fresh. Records and clears failure-backoff state around the attempt
/// and, on a provider-shaped failure, blocks the provider and announces it
/// once via an insight.
pub fn spawn_agent<I: IdGen>(
    ledger: &Ledger<I>,
    ids: &I,
    env: &LaunchEnv<'_>,
    router: &Router,
    state: &StateFile,
    agent: &Agent,
    now: DateTime<Utc>,
) -> Result<(), SchedulerError> {
    let Some(model) = agent.model.as_deref() else {
        tracing::warn!(agent = agent.handle, "skip: no model configured");
        state.set("last_skip_at", serde_json::to_value(now).unwrap_or_default())?;
        return Ok(());
    };
    let provider = space_providers::models::map(model)?;
    if router.provider_blocked(provider) {
        let until = router.provider_blocked_until(provider);
        tracing::warn!(agent = agent.handle, %provider, until = ?until, "skip: provider cooldown");
        state.set("last_skip_at", serde_json::to_value(now).unwrap_or_default())?;
        return Ok(());
    }
    if !router.provider_available(provider) {
        tracing::warn!(agent = agent.handle, %provider, "skip: provider at capacity");
        state.set("last_skip_at", serde_json::to_value(now).unwrap_or_default())?;
        return Ok(());
    }

    let request = LaunchRequest {
        agent_id: agent.id.clone(),
        instruction: None,
        spawn: None,
        cwd: None,
        timeout: Duration::from_secs(60 * 60),
        model_override: None,
        mode: space_core::SpawnMode::Sovereign,
        caller_spawn_id: None,
        skills: crate::pick::resolve_skills(agent),
        focus_project: None,
        allowed_tools: None,
        images: Vec::new(),
    };

    match space_engine::launch(ledger, ids, env, request) {
        Ok(_) => {
            crate::clear_agent_failure(state, &agent.id)?;
            Ok(())
        }
        Err(e) => {
            crate::record_agent_failure(state, &agent.id, &e.to_string(), now)?;
            if let Some(blocked_until) = router.record_provider_error(provider, &e.to_string()) {
                if router.needs_notification(provider) {
                    notify_quota_block(ledger, provider, blocked_until, now)?;
                    router.mark_notified(provider);
                }
            }
            Err(e.into())
        }
    }
}

fn notify_quota_block<I: IdGen>(
    ledger: &Ledger<I>,
    provider: space_core::ProviderName,
    until: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), SchedulerError> {
    let system = ledger.agents().ensure_system()?;
    let global = ledger.projects().ensure_global()?;
    let duration = until - now;
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let time_str = if hours > 0 { format!("{hours}h{minutes}m") } else { format!("{minutes}m") };

    let content = format!("{provider} quota exhausted, blocked for {time_str}");
    if let Err(e) = ledger.insights().create(global.id.as_str(), system.id.as_str(), None, None, "quota", &content) {
        tracing::warn!(error = %e, "failed to create quota notification insight");
    }
    Ok(())
}

#[cfg(test)]
#[path = "spawn_agent_tests.rs"]
mod tests;
