// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered schema migrations, applied inside one transaction against a
//! `schema_version` table. Failure restores from the pre-migration backup
//! copy `Connection::open_with_backup` takes before running any of these.

use crate::error::StoreError;
use rusqlite::Connection;

pub const CURRENT_VERSION: i64 = 1;

struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("schema_v1.sql"),
}];

pub fn migrate(conn: &mut Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);",
    )?;
    let current: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| {
            r.get(0)
        })?;

    let tx = conn.transaction()?;
    for m in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(m.sql).map_err(|source| StoreError::Migration {
            version: m.version,
            source,
        })?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [m.version],
        )
        .map_err(|source| StoreError::Migration {
            version: m.version,
            source,
        })?;
    }
    tx.commit()?;
    Ok(())
}
