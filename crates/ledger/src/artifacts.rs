// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-cutting artifact operations shared by decisions/insights/tasks: soft
//! delete, archive, and per-agent/human inbox read tracking.

use crate::{Ledger, LedgerError};
use rusqlite::OptionalExtension;

pub struct Artifacts<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

impl<I: space_core::IdGen> Artifacts<'_, I> {
    pub(crate) fn soft_delete(&self, table: &str, id: &str) -> Result<(), LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let sql = format!("UPDATE {table} SET deleted_at = ?1 WHERE id = ?2");
            conn.execute(&sql, rusqlite::params![crate::rows::now(), id])?;
            Ok(())
        })?)
    }

    pub(crate) fn archive(&self, table: &str, id: &str) -> Result<(), LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let sql = format!("UPDATE {table} SET archived_at = ?1 WHERE id = ?2");
            conn.execute(&sql, rusqlite::params![crate::rows::now(), id])?;
            Ok(())
        })?)
    }

    /// Marks `(artifact_type, artifact_id)` read by `agent_id`. Upsert: a
    /// repeat call just bumps `read_at`.
    pub fn mark_read(&self, artifact_type: &str, artifact_id: &str, agent_id: &str) -> Result<(), LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO artifact_reads (artifact_type, artifact_id, agent_id, read_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (artifact_type, artifact_id, agent_id)
                 DO UPDATE SET read_at = excluded.read_at",
                rusqlite::params![artifact_type, artifact_id, agent_id, crate::rows::now()],
            )?;
            Ok(())
        })?)
    }

    pub fn is_read(&self, artifact_type: &str, artifact_id: &str, agent_id: &str) -> Result<bool, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM artifact_reads
                 WHERE artifact_type = ?1 AND artifact_id = ?2 AND agent_id = ?3",
                rusqlite::params![artifact_type, artifact_id, agent_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })?)
    }

    /// A human clearing an entire thread, independent of any one agent's
    /// read marks.
    pub fn resolve_for_humans(&self, artifact_type: &str, artifact_id: &str) -> Result<(), LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO human_resolutions (artifact_type, artifact_id, resolved_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (artifact_type, artifact_id) DO UPDATE SET resolved_at = excluded.resolved_at",
                rusqlite::params![artifact_type, artifact_id, crate::rows::now()],
            )?;
            Ok(())
        })?)
    }

    pub fn human_resolved_at(
        &self,
        artifact_type: &str,
        artifact_id: &str,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            conn.query_row(
                "SELECT resolved_at FROM human_resolutions WHERE artifact_type = ?1 AND artifact_id = ?2",
                rusqlite::params![artifact_type, artifact_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(space_store::StoreError::from)
        })?)
    }
}
