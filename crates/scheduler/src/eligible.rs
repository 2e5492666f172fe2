// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Which agents the pick step is allowed to consider right now, and how
//! many concurrent slots the swarm has left.

use crate::SchedulerError;
use space_config::Config;
use space_core::{Agent, IdGen, Spawn};
use space_ledger::Ledger;
use space_router::Router;

/// Non-archived AI agents with a model, narrowed by `config.swarm.agents`/
/// `providers` if set, and further narrowed to providers the router
/// currently considers available (not in cooldown, under capacity).
pub fn eligible_agents<I: IdGen>(ledger: &Ledger<I>, config: &Config, router: &Router) -> Result<Vec<Agent>, SchedulerError> {
    let mut agents = ledger.agents().fetch_ai()?;

    if let Some(allowed_handles) = &config.swarm.agents {
        agents.retain(|a| allowed_handles.contains(&a.handle));
    }
    if let Some(allowed_providers) = &config.swarm.providers {
        agents.retain(|a| {
            let Some(model) = a.model.as_deref() else { return false };
            let Ok(provider) = space_providers::models::map(model) else { return false };
            allowed_providers.iter().any(|p| p == &provider.to_string())
        });
    }
    agents.retain(|a| {
        let Some(model) = a.model.as_deref() else { return false };
        let Ok(provider) = space_providers::models::map(model) else { return false };
        router.provider_available(provider)
    });
    Ok(agents)
}

/// Active sovereign spawns — the concurrency-accounting pool.
pub fn active_sovereign<I: IdGen>(ledger: &Ledger<I>) -> Result<Vec<Spawn>, SchedulerError> {
    Ok(ledger.spawns().fetch_active_sovereign()?)
}

pub fn available_slots(config: &Config, active: &[Spawn]) -> u32 {
    config.swarm.concurrency.saturating_sub(active.len() as u32)
}

#[cfg(test)]
#[path = "eligible_tests.rs"]
mod tests;
