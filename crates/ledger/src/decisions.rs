// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decisions: create, fetch, and the commit/action/reject/uncommit state
//! transitions owned by `space_core::Decision`.

use crate::rows::decision_from_row;
use crate::{Ledger, LedgerError};
use chrono::{DateTime, Duration, Utc};
use rusqlite::OptionalExtension;
use space_core::{Decision, DecisionId, DecisionStatus};
use space_store::{resolve, Query, DECISIONS};

pub struct Decisions<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

const COLUMNS: &str = "id, project_id, agent_id, spawn_id, content, rationale, reversible, \
    outcome, refs, created_at, committed_at, actioned_at, rejected_at, archived_at, deleted_at";

impl<I: space_core::IdGen> Decisions<'_, I> {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &self,
        project_id: &str,
        agent_id: &str,
        spawn_id: Option<&str>,
        content: &str,
        rationale: &str,
        reversible: Option<bool>,
        refs: Vec<String>,
    ) -> Result<Decision, LedgerError> {
        if content.trim().is_empty() {
            return Err(LedgerError::Validation("decision content is empty".to_string()));
        }
        if rationale.trim().is_empty() {
            return Err(LedgerError::Validation("rationale is required".to_string()));
        }
        if let Some(existing) = self.find_duplicate(project_id, content)? {
            return Err(LedgerError::Duplicate { table: "decisions", existing });
        }
        let decision = Decision {
            id: DecisionId::new(self.ledger.ids.next()),
            project_id: project_id.into(),
            agent_id: agent_id.into(),
            spawn_id: spawn_id.map(Into::into),
            content: content.to_string(),
            rationale: rationale.to_string(),
            reversible,
            outcome: None,
            refs,
            created_at: crate::rows::now(),
            committed_at: None,
            actioned_at: None,
            rejected_at: None,
            archived_at: None,
            deleted_at: None,
        };
        let citation_input = format!("{content} {rationale}");
        self.ledger.store.transaction(|conn| {
            conn.execute(
                "INSERT INTO decisions (id, project_id, agent_id, spawn_id, content, rationale,
                    reversible, refs, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    decision.id.as_str(),
                    decision.project_id.as_str(),
                    decision.agent_id.as_str(),
                    decision.spawn_id.as_ref().map(|s| s.as_str()),
                    decision.content,
                    decision.rationale,
                    decision.reversible,
                    crate::rows::json_vec(&decision.refs),
                    decision.created_at,
                ],
            )?;
            self.ledger.citations().store_with_conn(conn, "decision", decision.id.as_str(), &citation_input)?;
            Ok(())
        })?;
        Ok(decision)
    }

    /// Existing decision id with the same `content` in `project_id`, if any —
    /// `schema_v1.sql`'s content index isn't unique, so duplicate rejection
    /// happens here rather than at the database layer.
    fn find_duplicate(&self, project_id: &str, content: &str) -> Result<Option<String>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            conn.query_row(
                "SELECT id FROM decisions WHERE project_id = ?1 AND content = ?2 AND deleted_at IS NULL LIMIT 1",
                rusqlite::params![project_id, content],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(space_store::StoreError::from)
        })?)
    }

    pub fn get(&self, reference: &str) -> Result<Decision, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let id = resolve(conn, DECISIONS, reference)?;
            let sql = format!("SELECT {COLUMNS} FROM decisions WHERE id = ?1");
            conn.query_row(&sql, [&id], decision_from_row).map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => space_store::StoreError::NotFound {
                    table: "decisions".to_string(),
                    reference: reference.to_string(),
                },
                other => space_store::StoreError::Sqlite(other),
            })
        })?)
    }

    pub fn fetch_by_status(
        &self,
        project_id: &str,
        status: Option<DecisionStatus>,
    ) -> Result<Vec<Decision>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let query = Query::new("decisions", COLUMNS)
                .where_clause("project_id = ?1", project_id.to_string())
                .not_deleted();
            let query = match status {
                Some(DecisionStatus::Proposed) => query.raw(
                    "committed_at IS NULL AND rejected_at IS NULL",
                ),
                Some(DecisionStatus::Committed) => query.raw(
                    "committed_at IS NOT NULL AND actioned_at IS NULL AND rejected_at IS NULL",
                ),
                Some(DecisionStatus::Actioned) => query.raw("actioned_at IS NOT NULL"),
                Some(DecisionStatus::Rejected) => query.raw("rejected_at IS NOT NULL"),
                None => query,
            };
            query.order("created_at DESC").fetch(conn, decision_from_row)
        })?)
    }

    /// Most recent decisions authored by `agent_id`, newest first — backs
    /// the context builder's `me` block. Callers derive display status from
    /// `Decision::status()`.
    pub fn fetch_by_agent(&self, agent_id: &str, limit: i64) -> Result<Vec<Decision>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("decisions", COLUMNS)
                .where_clause("agent_id = ?1", agent_id.to_string())
                .not_deleted()
                .order("created_at DESC")
                .limit(Some(limit))
                .fetch(conn, decision_from_row)
        })?)
    }

    /// Committed decisions mentioning `@human` that haven't been actioned or
    /// rejected for at least `hours` — the target of the daemon's decay
    /// sweep, which uncommits them back to proposed.
    pub fn fetch_stale_human_blocked(&self, hours: i64) -> Result<Vec<Decision>, LedgerError> {
        let cutoff = Utc::now() - Duration::hours(hours);
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("decisions", COLUMNS)
                .not_deleted()
                .raw("committed_at IS NOT NULL")
                .raw("actioned_at IS NULL")
                .raw("rejected_at IS NULL")
                .where_clause("committed_at < ?1", cutoff)
                .raw("content LIKE '%@human%'")
                .fetch(conn, decision_from_row)
        })?)
    }

    pub fn commit(&self, reference: &str, at: DateTime<Utc>) -> Result<Decision, LedgerError> {
        self.transition(reference, |d| d.commit(at))
    }

    pub fn action(&self, reference: &str, outcome: Option<String>, at: DateTime<Utc>) -> Result<Decision, LedgerError> {
        self.transition(reference, |d| d.action(outcome.clone(), at))
    }

    pub fn reject(&self, reference: &str, at: DateTime<Utc>) -> Result<Decision, LedgerError> {
        self.transition(reference, |d| d.reject(at))
    }

    pub fn uncommit(&self, reference: &str) -> Result<Decision, LedgerError> {
        self.transition(reference, |d| d.uncommit())
    }

    /// Uncommits every decision `fetch_stale_human_blocked(hours)` turns up,
    /// returning them back to `proposed` so a stalled human handoff doesn't
    /// block an agent forever. Returns the ids actually decayed.
    pub fn decay_human_blocked(&self, hours: i64) -> Result<Vec<DecisionId>, LedgerError> {
        let stale = self.fetch_stale_human_blocked(hours)?;
        let mut decayed = Vec::with_capacity(stale.len());
        for decision in stale {
            self.uncommit(decision.id.as_str())?;
            decayed.push(decision.id);
        }
        Ok(decayed)
    }

    pub fn archive(&self, reference: &str) -> Result<(), LedgerError> {
        let decision = self.get(reference)?;
        self.ledger.artifacts().archive("decisions", decision.id.as_str())
    }

    pub fn delete(&self, reference: &str) -> Result<(), LedgerError> {
        let decision = self.get(reference)?;
        self.ledger.artifacts().soft_delete("decisions", decision.id.as_str())
    }

    fn transition(
        &self,
        reference: &str,
        apply: impl FnOnce(&mut Decision) -> Result<(), space_core::DecisionStateError>,
    ) -> Result<Decision, LedgerError> {
        let mut decision = self.get(reference)?;
        apply(&mut decision).map_err(|e| LedgerError::State(e.to_string()))?;
        self.ledger.store.with_conn(|conn| {
            conn.execute(
                "UPDATE decisions SET committed_at = ?1, actioned_at = ?2, rejected_at = ?3, outcome = ?4
                 WHERE id = ?5",
                rusqlite::params![
                    decision.committed_at,
                    decision.actioned_at,
                    decision.rejected_at,
                    decision.outcome,
                    decision.id.as_str(),
                ],
            )?;
            Ok(())
        })?;
        Ok(decision)
    }
}
