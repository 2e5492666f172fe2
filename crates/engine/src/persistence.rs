// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two spawn-table writes that carry real race semantics, kept out of
//! `space-ledger` because they're specific to owning a live OS process
//! rather than to reading/recording domain facts.
//!
//! `get_or_create` relies entirely on `idx_spawns_sovereign_unique`, the
//! partial unique index over `(agent_id) WHERE status='active' AND
//! mode='sovereign'`, to make "insert, or return the existing active
//! sovereign spawn" race-free across threads without a mutex: the `INSERT
//! ... ON CONFLICT ... DO NOTHING` either lands the new row or the
//! conflicting row already won, and either way the follow-up `SELECT`
//! recovers the winner.

use crate::EngineError;
use space_core::{AgentId, IdGen, ProviderName, Spawn, SpawnId, SpawnMode, SpawnStatus};
use space_ledger::Ledger;
use space_store::Store;

const COLUMNS: &str = "id, agent_id, caller_spawn_id, provider, mode, status, pid, session_id, \
    summary, error, trace_hash, resume_count, created_at, last_active_at";

/// Mirrors `space-ledger`'s private row mapper: this module owns the one
/// write path into `spawns` that isn't exposed through the ledger's
/// accessors, so it reads its own writes back the same way rather than
/// reaching into ledger internals.
fn row_to_spawn(row: &rusqlite::Row<'_>) -> rusqlite::Result<Spawn> {
    let provider: String = row.get("provider")?;
    let mode: String = row.get("mode")?;
    let status: String = row.get("status")?;
    Ok(Spawn {
        id: SpawnId::new(row.get::<_, String>("id")?),
        agent_id: AgentId::new(row.get::<_, String>("agent_id")?),
        caller_spawn_id: row.get::<_, Option<String>>("caller_spawn_id")?.map(SpawnId::new),
        provider: match provider.as_str() {
            "codex" => ProviderName::Codex,
            "gemini" => ProviderName::Gemini,
            _ => ProviderName::Claude,
        },
        mode: match mode.as_str() {
            "directed" => SpawnMode::Directed,
            _ => SpawnMode::Sovereign,
        },
        status: match status.as_str() {
            "done" => SpawnStatus::Done,
            _ => SpawnStatus::Active,
        },
        pid: row.get("pid")?,
        session_id: row.get("session_id")?,
        summary: row.get("summary")?,
        error: row.get("error")?,
        trace_hash: row.get("trace_hash")?,
        resume_count: row.get::<_, i64>("resume_count")? as u32,
        created_at: row.get("created_at")?,
        last_active_at: row.get("last_active_at")?,
    })
}

fn provider_column(provider: ProviderName) -> &'static str {
    match provider {
        ProviderName::Claude => "claude",
        ProviderName::Codex => "codex",
        ProviderName::Gemini => "gemini",
    }
}

fn mode_column(mode: SpawnMode) -> &'static str {
    match mode {
        SpawnMode::Sovereign => "sovereign",
        SpawnMode::Directed => "directed",
    }
}

/// Atomically inserts a fresh `active` spawn for `agent_id`, or returns the
/// row that already holds the unique `(agent_id) WHERE active, sovereign`
/// slot. `caller_spawn_id` is only meaningful for directed spawns (a
/// sovereign spawn dispatching a one-off helper); sovereign spawns pass
/// `None`.
pub fn get_or_create<I: IdGen>(
    ledger: &Ledger<I>,
    ids: &I,
    agent_id: &AgentId,
    caller_spawn_id: Option<&SpawnId>,
    provider: ProviderName,
    mode: SpawnMode,
) -> Result<Spawn, EngineError> {
    let store = ledger.store();
    let new_id = ids.next();
    let now = chrono::Utc::now();

    store.with_conn(|conn| {
        conn.execute(
            "INSERT INTO spawns (id, agent_id, caller_spawn_id, provider, mode, status, resume_count, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 'active', 0, ?6) \
             ON CONFLICT (agent_id) WHERE status = 'active' AND mode = 'sovereign' DO NOTHING",
            rusqlite::params![
                new_id,
                agent_id.as_str(),
                caller_spawn_id.map(SpawnId::as_str),
                provider_column(provider),
                mode_column(mode),
                now.to_rfc3339(),
            ],
        )?;
        Ok(())
    })?;

    // Directed spawns never conflict (the partial unique index only covers
    // sovereign mode), so the row we just inserted is always the one to
    // return. Sovereign spawns may have lost the insert to a pre-existing
    // active one; look it up by the invariant the unique index enforces
    // instead of by the id we attempted.
    store
        .with_conn(|conn| match mode {
            SpawnMode::Directed => {
                let sql = format!("SELECT {COLUMNS} FROM spawns WHERE id = ?1");
                conn.query_row(&sql, [&new_id], row_to_spawn)
            }
            SpawnMode::Sovereign => {
                let sql =
                    format!("SELECT {COLUMNS} FROM spawns WHERE agent_id = ?1 AND status = 'active' AND mode = 'sovereign'");
                conn.query_row(&sql, [agent_id.as_str()], row_to_spawn)
            }
        })
        .map_err(|_| EngineError::Toteow(agent_id.as_str().to_string()))
}

/// `UPDATE spawns SET pid = ? WHERE id = ? AND pid IS NULL`. A zero
/// row-count means another launcher already claimed this spawn's pid slot
/// first; the caller must kill the child it just forked and abort.
pub fn set_pid_atomic(store: &Store, spawn_id: &SpawnId, pid: i32) -> Result<bool, EngineError> {
    let rows = store.with_conn(|conn| {
        Ok(conn.execute(
            "UPDATE spawns SET pid = ?1 WHERE id = ?2 AND pid IS NULL",
            rusqlite::params![pid, spawn_id.as_str()],
        )?)
    })?;
    Ok(rows == 1)
}

/// Sets `status='active'`, clears `pid`, and bumps `resume_count` for a
/// relaunch of a previously `done` spawn.
pub fn mark_resumed(store: &Store, spawn_id: &SpawnId) -> Result<(), EngineError> {
    store.with_conn(|conn| {
        conn.execute(
            "UPDATE spawns SET status = 'active', pid = NULL, error = NULL, resume_count = resume_count + 1 WHERE id = ?1",
            rusqlite::params![spawn_id.as_str()],
        )?;
        Ok(())
    })?;
    Ok(())
}

/// Records the vendor session id on its first `context_init` sighting, only
/// if not already set (a resumed spawn keeps the session id it resumed
/// with).
pub fn set_session_id(store: &Store, spawn_id: &SpawnId, session_id: &str) -> Result<(), EngineError> {
    store.with_conn(|conn| {
        conn.execute(
            "UPDATE spawns SET session_id = ?1 WHERE id = ?2 AND session_id IS NULL",
            rusqlite::params![session_id, spawn_id.as_str()],
        )?;
        Ok(())
    })?;
    Ok(())
}

pub fn clear_session_id(store: &Store, spawn_id: &SpawnId) -> Result<(), EngineError> {
    store.with_conn(|conn| {
        conn.execute("UPDATE spawns SET session_id = NULL WHERE id = ?1", rusqlite::params![spawn_id.as_str()])?;
        Ok(())
    })?;
    Ok(())
}

pub fn touch_last_active(store: &Store, spawn_id: &SpawnId, at: chrono::DateTime<chrono::Utc>) -> Result<(), EngineError> {
    store.with_conn(|conn| {
        conn.execute(
            "UPDATE spawns SET last_active_at = ?1 WHERE id = ?2 AND status = 'active'",
            rusqlite::params![at.to_rfc3339(), spawn_id.as_str()],
        )?;
        Ok(())
    })?;
    Ok(())
}

/// Finalizes a spawn as `done`, conditional on it still being `active` — the
/// same race-safety `reap`/normal-exit/`terminate` all need so a concurrent
/// legitimate completion can't be clobbered.
pub fn finalize(
    store: &Store,
    spawn_id: &SpawnId,
    summary: Option<&str>,
    error: Option<&str>,
    trace_hash: Option<&str>,
) -> Result<bool, EngineError> {
    let rows = store.with_conn(|conn| {
        Ok(conn.execute(
            "UPDATE spawns SET status = 'done', pid = NULL, summary = COALESCE(?1, summary), error = ?2, trace_hash = ?3 \
             WHERE id = ?4 AND status = 'active'",
            rusqlite::params![summary, error, trace_hash, spawn_id.as_str()],
        )?)
    })?;
    Ok(rows == 1)
}

/// Nulls a leaked pid on an already-`done` row (`reconcile`'s job).
pub fn clear_pid(store: &Store, spawn_id: &SpawnId) -> Result<(), EngineError> {
    store.with_conn(|conn| {
        conn.execute("UPDATE spawns SET pid = NULL WHERE id = ?1", rusqlite::params![spawn_id.as_str()])?;
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
