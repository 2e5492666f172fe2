// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pick step: weighted sampling without replacement over idle agents,
//! favoring whoever has spawned least today, has mail waiting, or is
//! otherwise due.

use crate::{eligible_agents, SchedulerError};
use chrono::{DateTime, TimeZone, Utc};
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use space_config::{Config, StateFile};
use space_core::{Agent, IdGen, Spawn};
use space_ledger::Ledger;
use space_router::Router;
use std::collections::HashSet;

const INBOX_WEIGHT: f64 = 1.5;
const RECENT_SPAWN_PENALTY: f64 = 0.5;
const RECENT_SPAWN_WINDOW_SECONDS: i64 = 300;

/// Skills every spawn gets regardless of identity — the vocabulary an agent
/// needs to orient itself after waking up.
pub const BASE_SKILLS: &[&str] = &["wake", "connect", "manual"];

/// Draws up to `count` idle agents without replacement, weighted by
/// fairness (spawned-today deficit, squared), inbox/stream urgency, and
/// recency penalty, then any per-handle bias configured in `config.yaml`.
#[allow(clippy::too_many_arguments)]
pub fn pick_idle_agents<I: IdGen>(
    ledger: &Ledger<I>,
    config: &Config,
    router: &Router,
    state: &StateFile,
    count: u32,
    active: &[Spawn],
    now: DateTime<Utc>,
) -> Result<Vec<Agent>, SchedulerError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let eligible = eligible_agents(ledger, config, router)?;
    if eligible.is_empty() {
        return Ok(Vec::new());
    }

    let active_ids: HashSet<&str> = active.iter().map(|s| s.agent_id.as_str()).collect();
    let failed_ids = crate::recently_failed_agents(state, now)?;
    let last_agent = ledger.spawns().last_finished_agent()?;

    let idle: Vec<Agent> = eligible
        .into_iter()
        .filter(|a| !active_ids.contains(a.id.as_str()))
        .filter(|a| !failed_ids.contains(&a.id))
        .filter(|a| last_agent.as_deref() != Some(a.id.as_str()))
        .collect();
    if idle.is_empty() {
        return Ok(Vec::new());
    }

    let project_id = match &config.swarm.project {
        Some(name) => Some(ledger.projects().get(name)?.id.as_str().to_string()),
        None => None,
    };
    let with_inbox = ledger.insights().agents_with_inbox(project_id.as_deref())?;
    let has_stream = ledger.insights().has_unprocessed_stream()?;

    let idle_ids: Vec<String> = idle.iter().map(|a| a.id.as_str().to_string()).collect();
    let today_start = Utc.from_utc_datetime(&now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default());
    let spawn_counts = ledger.spawns().count_since(&idle_ids, today_start)?;
    let last_spawned = ledger.spawns().last_spawned_at(&idle_ids)?;
    let max_spawns = spawn_counts.values().copied().max().unwrap_or(1).max(1);

    let weight = |agent: &Agent| -> f64 {
        let n = spawn_counts.get(agent.id.as_str()).copied().unwrap_or(0);
        let fairness_base = 1.0 + (max_spawns - n) as f64 / (max_spawns + 1) as f64;
        let fairness = fairness_base.powi(2);

        let inbox_mult = if with_inbox.contains(&agent.handle) { INBOX_WEIGHT } else { 1.0 };
        let stream_mult = if has_stream { INBOX_WEIGHT } else { 1.0 };

        let recency_penalty = match last_spawned.get(agent.id.as_str()) {
            Some(last) if (now - *last).num_seconds() < RECENT_SPAWN_WINDOW_SECONDS => RECENT_SPAWN_PENALTY,
            _ => 1.0,
        };

        let bias = config.swarm.weights.as_ref().and_then(|w| w.get(&agent.handle)).copied().unwrap_or(1.0);
        fairness * inbox_mult * stream_mult * recency_penalty * bias
    };

    let mut remaining: Vec<(Agent, f64)> = idle.into_iter().map(|a| {
        let w = weight(&a);
        (a, w)
    }).collect();

    let mut selected = Vec::new();
    let mut rng = rand::thread_rng();
    while selected.len() < count as usize && !remaining.is_empty() {
        let weights: Vec<f64> = remaining.iter().map(|(_, w)| *w).collect();
        if weights.iter().sum::<f64>() <= 0.0 {
            break;
        }
        let Ok(dist) = WeightedIndex::new(&weights) else { break };
        let idx = dist.sample(&mut rng);
        let (agent, _) = remaining.remove(idx);
        selected.push(agent);
    }

    Ok(selected)
}

/// `BASE_SKILLS` plus any skill extras a caller wants attached for this
/// pick — identity-specific skill extension (reading a per-agent skill
/// list out of its identity file) has no grounded loader in this codebase
/// yet, so only the base list is resolved here.
pub fn resolve_skills(_agent: &Agent) -> Vec<String> {
    BASE_SKILLS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
#[path = "pick_tests.rs"]
mod tests;
