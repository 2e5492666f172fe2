// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Citation persistence: extracting `i/<hex>`/`d/<hex>` references out of
//! free text was `space_core::extract_citations`'s job; this module stores
//! the result and answers "what cites this short id" queries.

use crate::rows::citation_target_column;
use crate::{Ledger, LedgerError};
use space_core::CitationTarget;

pub struct Citations<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

impl<I: space_core::IdGen> Citations<'_, I> {
    /// Records every citation `content` carries as having been authored by
    /// `(source_type, source_id)`. Idempotent: re-storing the same content
    /// doesn't create duplicate rows, thanks to `idx_citations_unique`.
    pub fn store(&self, source_type: &str, source_id: &str, content: &str) -> Result<usize, LedgerError> {
        Ok(self.ledger.store.transaction(|conn| self.store_with_conn(conn, source_type, source_id, content))?)
    }

    /// Same as [`Self::store`], but runs against an already-open connection
    /// so the caller can fold the citation writes into its own entity-insert
    /// transaction instead of committing them separately.
    pub fn store_with_conn(
        &self,
        conn: &rusqlite::Connection,
        source_type: &str,
        source_id: &str,
        content: &str,
    ) -> Result<usize, space_store::StoreError> {
        let citations = space_core::extract_citations(content);
        let count = citations.len();
        for citation in &citations {
            conn.execute(
                "INSERT OR IGNORE INTO citations (source_type, source_id, target_type, target_short_id)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    source_type,
                    source_id,
                    citation_target_column(citation.target),
                    citation.short_id,
                ],
            )?;
        }
        Ok(count)
    }

    /// Distinct agent ids that authored a decision or insight cited by
    /// `(source_type, source_id)`'s own citations — used to derive
    /// [`space_core::Provenance`] at insight-creation time.
    pub fn cited_agent_ids(&self, source_type: &str, source_id: &str) -> Result<Vec<String>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT
                    CASE c.target_type
                        WHEN 'insight' THEN (SELECT agent_id FROM insights WHERE id LIKE c.target_short_id || '%')
                        ELSE (SELECT agent_id FROM decisions WHERE id LIKE c.target_short_id || '%')
                    END AS cited_agent
                 FROM citations c
                 WHERE c.source_type = ?1 AND c.source_id = ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![source_type, source_id], |row| row.get::<_, Option<String>>(0))?
                .filter_map(|r| r.transpose())
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?)
    }

    /// Everything that cites `target_short_id` (insight or decision short id).
    pub fn refs_for_target(
        &self,
        target: CitationTarget,
        target_short_id: &str,
    ) -> Result<Vec<(String, String)>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT source_type, source_id FROM citations
                 WHERE target_type = ?1 AND target_short_id = ?2",
            )?;
            let rows = stmt
                .query_map(
                    rusqlite::params![citation_target_column(target), target_short_id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?)
    }
}
