// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Short-id resolution: turn an 8-hex prefix (or an alternate key like an
//! agent's handle) into a full id, raising [`StoreError::AmbiguousReference`]
//! on a non-exact multi-match.

use crate::error::StoreError;
use rusqlite::Connection;

/// Tables the resolver knows how to address, each carrying an optional
/// alternate key column tried before falling back to id-prefix matching.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub alt_key: Option<&'static str>,
}

pub const AGENTS: Table = Table { name: "agents", alt_key: Some("handle") };
pub const PROJECTS: Table = Table { name: "projects", alt_key: Some("name") };
pub const SPAWNS: Table = Table { name: "spawns", alt_key: None };
pub const DECISIONS: Table = Table { name: "decisions", alt_key: None };
pub const INSIGHTS: Table = Table { name: "insights", alt_key: None };
pub const TASKS: Table = Table { name: "tasks", alt_key: None };

/// Resolve `reference` to a full row id within `table`.
///
/// Order: exact id match, then (if the table has one) exact alternate-key
/// match, then an id prefix match. A prefix match is only ambiguous if more
/// than one row matches *and* none of them is an exact id match.
pub fn resolve(conn: &Connection, table: Table, reference: &str) -> Result<String, StoreError> {
    if let Some(id) = exact_id(conn, table, reference)? {
        return Ok(id);
    }

    if let Some(alt_key) = table.alt_key {
        if let Some(id) = exact_alt(conn, table, alt_key, reference)? {
            return Ok(id);
        }
    }

    let pattern = format!("{}%", escape_like(reference));
    let sql = format!(
        "SELECT id FROM {} WHERE id LIKE ?1 ESCAPE '\\' LIMIT 2",
        table.name
    );
    let mut stmt = conn.prepare(&sql)?;
    let matches: Vec<String> = stmt
        .query_map([&pattern], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    match matches.len() {
        0 => Err(StoreError::NotFound {
            table: table.name.to_string(),
            reference: reference.to_string(),
        }),
        1 => Ok(matches.into_iter().next().unwrap_or_default()),
        _ => Err(StoreError::AmbiguousReference {
            table: table.name.to_string(),
            reference: reference.to_string(),
            count: matches.len(),
            samples: matches,
        }),
    }
}

fn exact_id(conn: &Connection, table: Table, reference: &str) -> Result<Option<String>, StoreError> {
    let sql = format!("SELECT id FROM {} WHERE id = ?1", table.name);
    Ok(conn
        .query_row(&sql, [reference], |row| row.get(0))
        .ok())
}

fn exact_alt(
    conn: &Connection,
    table: Table,
    alt_key: &str,
    reference: &str,
) -> Result<Option<String>, StoreError> {
    let sql = format!("SELECT id FROM {} WHERE {} = ?1", table.name, alt_key);
    Ok(conn
        .query_row(&sql, [reference], |row| row.get(0))
        .ok())
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
