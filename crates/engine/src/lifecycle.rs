// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Termination and the two tick-driven sweeps that keep the `spawns` table
//! honest against reality: `reap` finalizes rows whose process died without
//! anyone noticing, `reconcile` kills processes a leaked `done` row still
//! points at.

use crate::{persistence, EngineError};
use chrono::{DateTime, Utc};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;
use space_core::{IdGen, Spawn};
use space_ledger::Ledger;
use space_store::Store;
use std::time::Duration;

/// Grace period between SIGTERM and SIGKILL.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// How long an `active` spawn may sit with a dead or absent pid before
/// `reap` finalizes it.
pub const REAP_GRACE: chrono::Duration = chrono::Duration::seconds(30);

fn process_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

fn reap_child(pid: i32) {
    let _ = waitpid(Pid::from_raw(pid), Some(WaitPidFlag::WNOHANG));
}

/// Kills the process SIGTERM, waits up to [`TERMINATE_GRACE`], then SIGKILLs
/// if it's still alive. Idempotent: a `done` spawn is returned unchanged.
pub fn terminate<I: IdGen>(ledger: &Ledger<I>, spawn: &Spawn) -> Result<Spawn, EngineError> {
    if !spawn.is_active() {
        return Ok(spawn.clone());
    }

    if let Some(pid) = spawn.pid {
        if process_alive(pid) {
            let _ = kill(Pid::from_raw(pid), Signal::SIGTERM);
            std::thread::sleep(TERMINATE_GRACE);
            if process_alive(pid) {
                let _ = kill(Pid::from_raw(pid), Signal::SIGKILL);
            }
        }
        reap_child(pid);
    }

    persistence::finalize(ledger.store(), &spawn.id, None, Some("terminated"), None)?;
    ledger.spawns().get(spawn.id.as_str()).map_err(EngineError::from)
}

/// Every `active` spawn older than [`REAP_GRACE`] whose pid is null or dead
/// gets finalized as `done, error="reaped"`. The finalize is conditional on
/// still being `active`, so a concurrent legitimate completion always wins.
pub fn reap<I: IdGen>(ledger: &Ledger<I>, now: DateTime<Utc>) -> Result<Vec<Spawn>, EngineError> {
    let mut reaped = Vec::new();
    for spawn in ledger.spawns().fetch_active()? {
        let age = now - spawn.last_active_at.unwrap_or(spawn.created_at);
        if age < REAP_GRACE {
            continue;
        }
        let dead = match spawn.pid {
            None => true,
            Some(pid) => !process_alive(pid),
        };
        if !dead {
            continue;
        }
        if persistence::finalize(ledger.store(), &spawn.id, None, Some("reaped"), None)? {
            reaped.push(ledger.spawns().get(spawn.id.as_str())?);
        }
    }
    Ok(reaped)
}

/// Any `done` row with a leaked non-null pid gets that pid SIGKILLed and the
/// field nulled. Runs each tick alongside `reap`.
pub fn reconcile(store: &Store) -> Result<usize, EngineError> {
    let leaked: Vec<(String, i32)> = store.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT id, pid FROM spawns WHERE status = 'done' AND pid IS NOT NULL")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    })?;

    for (id, pid) in &leaked {
        if process_alive(*pid) {
            let _ = kill(Pid::from_raw(*pid), Signal::SIGKILL);
        }
        persistence::clear_pid(store, &space_core::SpawnId::new(id.clone()))?;
    }
    Ok(leaked.len())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
