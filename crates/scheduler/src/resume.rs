// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The resume step: at most one crashed-but-resumable sovereign spawn gets
//! relaunched per tick, so a transient vendor-CLI crash doesn't strand an
//! agent mid-task until the next human nudge.

use crate::SchedulerError;
use space_core::{IdGen, Spawn};
use space_engine::{LaunchEnv, LaunchRequest};
use space_ledger::Ledger;
use std::collections::HashSet;
use std::time::Duration;

/// Picks up to `slots.min(1)` resumable crashed spawns whose agent isn't
/// currently active and relaunches each with a neutral wake-up instruction,
/// incrementing `resume_count` first so a repeat crash doesn't retry again.
pub fn resume_step<I: IdGen>(
    ledger: &Ledger<I>,
    ids: &I,
    env: &LaunchEnv<'_>,
    slots: u32,
    active: &[Spawn],
) -> Result<Vec<Spawn>, SchedulerError> {
    let budget = slots.min(1);
    if budget == 0 {
        return Ok(Vec::new());
    }

    let active_agent_ids: HashSet<&str> = active.iter().map(|s| s.agent_id.as_str()).collect();
    let candidates = ledger.spawns().fetch_resumable_crashed()?;

    let mut resumed = Vec::new();
    for spawn in candidates {
        if resumed.len() >= budget as usize {
            break;
        }
        if active_agent_ids.contains(spawn.agent_id.as_str()) {
            continue;
        }

        let request = LaunchRequest {
            agent_id: spawn.agent_id.clone(),
            instruction: Some("continue".to_string()),
            spawn: Some(spawn.clone()),
            cwd: None,
            timeout: Duration::from_secs(60 * 60),
            model_override: None,
            mode: spawn.mode,
            caller_spawn_id: None,
            skills: crate::BASE_SKILLS.iter().map(|s| s.to_string()).collect(),
            focus_project: None,
            allowed_tools: None,
            images: Vec::new(),
        };
        tracing::info!(spawn = spawn.id.as_str(), agent = spawn.agent_id.as_str(), "resuming crashed sovereign spawn");
        let result = space_engine::launch(ledger, ids, env, request)?;
        resumed.push(result);
    }
    Ok(resumed)
}

#[cfg(test)]
#[path = "resume_tests.rs"]
mod tests;
