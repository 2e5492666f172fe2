// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent roster: create, fetch, archive, and merge.

use crate::rows::agent_from_row;
use crate::{Ledger, LedgerError};
use space_core::{Agent, AgentId, AgentKind};
use space_store::{resolve, Query, AGENTS};

pub struct Agents<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

const COLUMNS: &str =
    "id, handle, kind, model, identity_name, archived_at, merged_into, created_at";

impl<I: space_core::IdGen> Agents<'_, I> {
    pub fn create(
        &self,
        handle: &str,
        kind: AgentKind,
        model: Option<String>,
        identity_name: Option<String>,
    ) -> Result<Agent, LedgerError> {
        let agent = Agent {
            id: AgentId::new(self.ledger.ids.next()),
            handle: handle.to_string(),
            kind,
            model,
            identity_name,
            archived_at: None,
            merged_into: None,
            created_at: crate::rows::now(),
        };
        self.ledger.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO agents (id, handle, kind, model, identity_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    agent.id.as_str(),
                    agent.handle,
                    kind_str(agent.kind),
                    agent.model,
                    agent.identity_name,
                    agent.created_at,
                ],
            )?;
            Ok(())
        })?;
        Ok(agent)
    }

    /// Ensures the seeded `system` agent exists, creating it if this is a
    /// fresh store — the author of record for daemon-generated insights
    /// (quota-cooldown notices, housekeeping notes) nothing human wrote.
    pub fn ensure_system(&self) -> Result<Agent, LedgerError> {
        match self.get("system") {
            Ok(agent) => Ok(agent),
            Err(LedgerError::Store(space_store::StoreError::NotFound { .. })) => {
                self.create("system", AgentKind::System, None, None)
            }
            Err(other) => Err(other),
        }
    }

    pub fn get(&self, reference: &str) -> Result<Agent, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let id = resolve(conn, AGENTS, reference)?;
            let sql = format!("SELECT {COLUMNS} FROM agents WHERE id = ?1");
            conn.query_row(&sql, [&id], agent_from_row).map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => space_store::StoreError::NotFound {
                    table: "agents".to_string(),
                    reference: reference.to_string(),
                },
                other => space_store::StoreError::Sqlite(other),
            })
        })?)
    }

    pub fn fetch_active(&self) -> Result<Vec<Agent>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("agents", COLUMNS)
                .not_archived()
                .order("handle ASC")
                .fetch(conn, agent_from_row)
        })?)
    }

    pub fn fetch_humans(&self) -> Result<Vec<Agent>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("agents", COLUMNS)
                .where_clause("kind = ?1", "human")
                .not_archived()
                .fetch(conn, agent_from_row)
        })?)
    }

    /// Non-archived AI agents with a model configured — the scheduler's raw
    /// candidate pool before config/provider-availability filtering.
    pub fn fetch_ai(&self) -> Result<Vec<Agent>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("agents", COLUMNS)
                .where_clause("kind = ?1", "ai")
                .not_archived()
                .raw("model IS NOT NULL")
                .order("handle ASC")
                .fetch(conn, agent_from_row)
        })?)
    }

    pub fn archive(&self, reference: &str) -> Result<(), LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let id = resolve(conn, AGENTS, reference)?;
            conn.execute(
                "UPDATE agents SET archived_at = ?1 WHERE id = ?2",
                rusqlite::params![crate::rows::now(), id],
            )?;
            Ok(())
        })?)
    }

    /// Archives `reference` with a pointer into `target`, the merge destination.
    pub fn merge_into(&self, reference: &str, target: &str) -> Result<(), LedgerError> {
        Ok(self.ledger.store.transaction(|conn| {
            let id = resolve(conn, AGENTS, reference)?;
            let target_id = resolve(conn, AGENTS, target)?;
            conn.execute(
                "UPDATE agents SET archived_at = ?1, merged_into = ?2 WHERE id = ?3",
                rusqlite::params![crate::rows::now(), target_id, id],
            )?;
            Ok(())
        })?)
    }
}

pub(crate) fn kind_str(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Human => "human",
        AgentKind::Ai => "ai",
        AgentKind::System => "system",
    }
}
