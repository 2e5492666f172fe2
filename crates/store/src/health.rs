// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FTS5 shadow-table integrity: a corrupt `*_fts` table turns up as
//! `SQLITE_CORRUPT`/`SQLITE_NOTADB` on the next write through its triggers,
//! long after whatever actually damaged it. Checking it directly at startup
//! catches that early instead of waiting for a write to fail.

use crate::error::StoreError;
use rusqlite::Connection;

/// The FTS5 virtual tables this schema maintains via triggers. Kept as the
/// single source of truth for `rebuild_fts`'s membership guard.
pub const FTS_TABLES: &[&str] = &["insights_fts", "decisions_fts", "tasks_fts"];

/// Returns the subset of [`FTS_TABLES`] that fail a basic read probe.
pub fn check_fts_integrity(conn: &Connection) -> Vec<&'static str> {
    FTS_TABLES
        .iter()
        .copied()
        .filter(|table| {
            conn.query_row(&format!("SELECT rowid FROM {table} LIMIT 1"), [], |_| Ok(()))
                .map(|_| false)
                .unwrap_or_else(|err| !matches!(err, rusqlite::Error::QueryReturnedNoRows))
        })
        .collect()
}

/// Rebuilds one FTS5 shadow table's index from its base table via the fts5
/// `'rebuild'` special command. `table` must be one of [`FTS_TABLES`].
pub fn rebuild_fts(conn: &Connection, table: &str) -> Result<bool, StoreError> {
    if !FTS_TABLES.contains(&table) {
        tracing::warn!(table, "refusing to rebuild unknown fts table");
        return Ok(false);
    }
    match conn.execute(&format!("INSERT INTO {table}({table}) VALUES('rebuild')"), []) {
        Ok(_) => {
            tracing::info!(table, "rebuilt fts index");
            Ok(true)
        }
        Err(err) => {
            tracing::warn!(table, %err, "fts rebuild failed");
            Err(err.into())
        }
    }
}

/// Checks every FTS table and rebuilds whichever ones fail, returning the
/// names actually repaired.
pub fn repair_fts_if_needed(conn: &Connection) -> Result<Vec<&'static str>, StoreError> {
    let corrupted = check_fts_integrity(conn);
    let mut repaired = Vec::new();
    for table in corrupted {
        if rebuild_fts(conn, table)? {
            repaired.push(table);
        }
    }
    Ok(repaired)
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
