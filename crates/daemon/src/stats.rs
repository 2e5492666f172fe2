// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public stats file: a handful of store-derived counts written to
//! `config.stats_json_path` for external consumption. Deliberately narrow —
//! no git/code-line/findings counters and no absence-metrics here, those
//! read from the deployment's own filesystem and a separate swarm-metrics
//! module that has no counterpart in this crate map.

use crate::DaemonError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use space_core::IdGen;
use space_ledger::Ledger;

#[derive(Debug, Clone, Serialize)]
pub struct PublicStats {
    pub spawns_24h: i64,
    pub spawns_7d: i64,
    pub total_spawns: i64,
    pub decisions: i64,
    pub open_questions: i64,
    pub insights: i64,
    pub agents: i64,
    pub tasks: i64,
    pub replies: i64,
    pub days_active: i64,
    pub updated_at: DateTime<Utc>,
}

/// Gathers the counts from the store, stamping `updated_at` at `now`.
pub fn collect<I: IdGen>(ledger: &Ledger<I>, now: DateTime<Utc>) -> Result<PublicStats, DaemonError> {
    let day_ago = now - chrono::Duration::hours(24);
    let week_ago = now - chrono::Duration::days(7);

    Ok(ledger.store().with_conn(|conn| {
        let count_since = |sql: &str, cutoff: &DateTime<Utc>| -> rusqlite::Result<i64> {
            conn.query_row(sql, [cutoff], |row| row.get(0))
        };
        let count = |sql: &str| -> rusqlite::Result<i64> { conn.query_row(sql, [], |row| row.get(0)) };

        Ok::<_, space_store::StoreError>(PublicStats {
            spawns_24h: count_since("SELECT COUNT(*) FROM spawns WHERE created_at > ?1", &day_ago)?,
            spawns_7d: count_since("SELECT COUNT(*) FROM spawns WHERE created_at > ?1", &week_ago)?,
            total_spawns: count("SELECT COUNT(*) FROM spawns")?,
            decisions: count("SELECT COUNT(*) FROM decisions WHERE deleted_at IS NULL")?,
            open_questions: count("SELECT COUNT(*) FROM insights WHERE open = 1 AND deleted_at IS NULL AND archived_at IS NULL")?,
            insights: count("SELECT COUNT(*) FROM insights WHERE deleted_at IS NULL AND archived_at IS NULL")?,
            agents: count("SELECT COUNT(*) FROM agents WHERE kind = 'ai' AND archived_at IS NULL")?,
            tasks: count("SELECT COUNT(*) FROM tasks WHERE deleted_at IS NULL")?,
            replies: count("SELECT COUNT(*) FROM replies WHERE deleted_at IS NULL")?,
            days_active: count("SELECT COUNT(DISTINCT date(created_at)) FROM spawns")?,
            updated_at: now,
        })
    })?)
}

/// Writes the stats to `path` as indented JSON, creating parent
/// directories as needed. A no-op when `path` is `None`, matching a
/// deployment that hasn't opted into publishing stats.
pub fn write<I: IdGen>(ledger: &Ledger<I>, path: Option<&str>, now: DateTime<Utc>) -> Result<(), DaemonError> {
    let Some(path) = path else { return Ok(()) };
    let stats = collect(ledger, now)?;
    let dest = shellexpand_home(path);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&dest, serde_json::to_string_pretty(&stats)?)?;
    Ok(())
}

fn shellexpand_home(path: &str) -> std::path::PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => std::env::var("HOME").map(|home| std::path::PathBuf::from(home).join(rest)).unwrap_or_else(|_| path.into()),
        None => path.into(),
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
