// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side spawn queries shared by whatever wants to know what an agent
//! has been doing — the context builder's `me` block, the CLI's `ps`-style
//! listing. The process-lifecycle writes (`get_or_create` against the
//! partial sovereign-uniqueness index, `set_pid_atomic`, status transitions)
//! belong to the spawn engine, which holds the monitor thread and talks to
//! the OS; it writes through the same `spawns` table directly rather than
//! through this module, since those operations carry engine-specific race
//! semantics this module doesn't need to know about.

use crate::rows::spawn_from_row;
use crate::{Ledger, LedgerError};
use rusqlite::OptionalExtension;
use space_core::Spawn;
use space_store::{resolve, Query, SPAWNS};

pub struct Spawns<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

const COLUMNS: &str = "id, agent_id, caller_spawn_id, provider, mode, status, pid, session_id, \
    summary, error, trace_hash, resume_count, created_at, last_active_at";

impl<I: space_core::IdGen> Spawns<'_, I> {
    pub fn get(&self, reference: &str) -> Result<Spawn, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let id = resolve(conn, SPAWNS, reference)?;
            let sql = format!("SELECT {COLUMNS} FROM spawns WHERE id = ?1");
            conn.query_row(&sql, [&id], spawn_from_row).map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    space_store::StoreError::NotFound { table: "spawns".to_string(), reference: reference.to_string() }
                }
                other => space_store::StoreError::Sqlite(other),
            })
        })?)
    }

    /// The last `limit` done spawns for `agent_id`, newest first — backs the
    /// context builder's "last 3 prior summaries" `me` block entry.
    pub fn fetch_recent_done(&self, agent_id: &str, limit: i64) -> Result<Vec<Spawn>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("spawns", COLUMNS)
                .where_clause("agent_id = ?1", agent_id.to_string())
                .raw("status = 'done'")
                .order("created_at DESC")
                .limit(Some(limit))
                .fetch(conn, spawn_from_row)
        })?)
    }

    /// All currently active spawns, used by the scheduler to compute
    /// available slots and by `reap`/`reconcile`.
    pub fn fetch_active(&self) -> Result<Vec<Spawn>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("spawns", COLUMNS).raw("status = 'active'").order("created_at ASC").fetch(conn, spawn_from_row)
        })?)
    }

    /// Active sovereign spawns only — the scheduler's slot-accounting pool
    /// excludes subagent spawns, which don't compete for swarm concurrency.
    pub fn fetch_active_sovereign(&self) -> Result<Vec<Spawn>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("spawns", COLUMNS)
                .raw("status = 'active'")
                .raw("mode = 'sovereign'")
                .order("created_at ASC")
                .fetch(conn, spawn_from_row)
        })?)
    }

    /// Done-but-resumable sovereign spawns that crashed with a recognized
    /// transient error and have not yet been retried — the scheduler's
    /// resume-step candidate pool.
    pub fn fetch_resumable_crashed(&self) -> Result<Vec<Spawn>, LedgerError> {
        let candidates = self.ledger.store.with_conn(|conn| {
            Query::new("spawns", COLUMNS)
                .raw("status = 'done'")
                .raw("mode = 'sovereign'")
                .raw("session_id IS NOT NULL")
                .raw("resume_count < 1")
                .order("last_active_at ASC")
                .fetch(conn, spawn_from_row)
        })?;
        Ok(candidates.into_iter().filter(Spawn::is_recognized_crash).collect())
    }

    /// Spawn counts per agent since `cutoff`, for the `agent_ids` given —
    /// the fairness term's `my_spawns_today`/`max_spawns_today` inputs.
    pub fn count_since(&self, agent_ids: &[String], cutoff: chrono::DateTime<chrono::Utc>) -> Result<std::collections::HashMap<String, i64>, LedgerError> {
        if agent_ids.is_empty() {
            return Ok(std::collections::HashMap::new());
        }
        Ok(self.ledger.store.with_conn(|conn| {
            let placeholders = agent_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let sql = format!(
                "SELECT agent_id, COUNT(*) as cnt FROM spawns WHERE agent_id IN ({placeholders}) AND created_at >= ? GROUP BY agent_id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<&dyn rusqlite::ToSql> = agent_ids.iter().map(|a| a as &dyn rusqlite::ToSql).collect();
            params.push(&cutoff);
            let rows = stmt
                .query_map(params.as_slice(), |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows.into_iter().collect())
        })?)
    }

    /// Most recent `created_at` per agent, for the `agent_ids` given — the
    /// recency-penalty term's `last_spawned_at` input.
    pub fn last_spawned_at(&self, agent_ids: &[String]) -> Result<std::collections::HashMap<String, chrono::DateTime<chrono::Utc>>, LedgerError> {
        if agent_ids.is_empty() {
            return Ok(std::collections::HashMap::new());
        }
        Ok(self.ledger.store.with_conn(|conn| {
            let placeholders = agent_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let sql = format!("SELECT agent_id, MAX(created_at) as last FROM spawns WHERE agent_id IN ({placeholders}) GROUP BY agent_id");
            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::ToSql> = agent_ids.iter().map(|a| a as &dyn rusqlite::ToSql).collect();
            let rows = stmt
                .query_map(params.as_slice(), |row| Ok((row.get::<_, String>(0)?, row.get::<_, chrono::DateTime<chrono::Utc>>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows.into_iter().collect())
        })?)
    }

    /// The agent id of whichever spawn most recently finished, across all
    /// agents — the anti-ping-pong exclusion in the scheduler's pick step.
    pub fn last_finished_agent(&self) -> Result<Option<String>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            conn.query_row(
                "SELECT agent_id FROM spawns WHERE status = 'done' ORDER BY last_active_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(space_store::StoreError::from)
        })?)
    }

    /// Blanks out summaries that only restate "nothing to do" — a swarm
    /// that never accumulates real signal otherwise drowns the `me` block
    /// and status views in noise. Runs as part of the daemon's periodic
    /// housekeeping sweep.
    pub fn clear_inertia_summaries(&self) -> Result<usize, LedgerError> {
        const INERTIA_PATTERNS: &[&str] = &[
            "%correctly idle%",
            "%correctly blocked%",
            "%swarm correctly%",
            "%no productive%",
            "%no actionable%",
            "%waiting state%",
        ];
        Ok(self.ledger.store.transaction(|conn| {
            let clause = INERTIA_PATTERNS.iter().map(|_| "summary LIKE ?").collect::<Vec<_>>().join(" OR ");
            let sql = format!("UPDATE spawns SET summary = NULL WHERE {clause}");
            let params: Vec<&dyn rusqlite::ToSql> = INERTIA_PATTERNS.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
            Ok(conn.execute(&sql, params.as_slice())?)
        })?)
    }
}
