// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbox: everything addressed to an agent that it hasn't read yet —
//! decisions/insights/tasks/replies that `@mention` its handle, plus tasks
//! assigned to it.
//!
//! The original computes this with one large multi-CTE query per kind of
//! artifact. Here it's composed from the smaller per-table queries the other
//! ledger modules already expose, unioned and sorted in Rust — simpler to
//! read and test, at the cost of one round trip per artifact kind instead of
//! one combined query. Inbox sizes are small (per-agent, unread-only) so this
//! isn't a meaningful cost.

use crate::{Ledger, LedgerError};
use chrono::{DateTime, Utc};
use space_core::Agent;

#[derive(Debug, Clone)]
pub enum InboxArtifact {
    Decision(space_core::Decision),
    Insight(space_core::Insight),
    Task(space_core::Task),
    Reply(space_core::Reply),
}

#[derive(Debug, Clone)]
pub struct InboxItem {
    pub artifact: InboxArtifact,
    pub created_at: DateTime<Utc>,
}

pub struct Inbox<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

impl<I: space_core::IdGen> Inbox<'_, I> {
    /// Everything mentioning `agent.handle` (or `@human` if `agent` is
    /// human) that `agent` hasn't read and no human has cleared, newest
    /// first. Tasks assigned to `agent` are included regardless of mention.
    pub fn fetch(&self, agent: &Agent) -> Result<Vec<InboxItem>, LedgerError> {
        let mut items = Vec::new();
        let needle = format!("@{}", agent.handle);

        for decision in self.mentioning_decisions(&needle, agent)? {
            if self.unread("decision", decision.id.as_str(), agent.id.as_str())? {
                let created_at = decision.created_at;
                items.push(InboxItem { artifact: InboxArtifact::Decision(decision), created_at });
            }
        }
        for insight in self.mentioning_insights(agent)? {
            if self.unread("insight", insight.id.as_str(), agent.id.as_str())? {
                let created_at = insight.created_at;
                items.push(InboxItem { artifact: InboxArtifact::Insight(insight), created_at });
            }
        }
        for task in self.ledger.tasks().fetch_for_agent(agent.id.as_str())? {
            if self.unread("task", task.id.as_str(), agent.id.as_str())? {
                let created_at = task.created_at;
                items.push(InboxItem { artifact: InboxArtifact::Task(task), created_at });
            }
        }
        for reply in self.mentioning_replies(agent)? {
            if self.unread("reply", reply.id.as_str(), agent.id.as_str())? {
                let created_at = reply.created_at;
                items.push(InboxItem { artifact: InboxArtifact::Reply(reply), created_at });
            }
        }

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    fn unread(&self, artifact_type: &str, artifact_id: &str, agent_id: &str) -> Result<bool, LedgerError> {
        if self.ledger.artifacts().human_resolved_at(artifact_type, artifact_id)?.is_some() {
            return Ok(false);
        }
        Ok(!self.ledger.artifacts().is_read(artifact_type, artifact_id, agent_id)?)
    }

    fn mentioning_decisions(&self, needle: &str, agent: &Agent) -> Result<Vec<space_core::Decision>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, project_id, agent_id, spawn_id, content, rationale, reversible, outcome,
                    refs, created_at, committed_at, actioned_at, rejected_at, archived_at, deleted_at
                 FROM decisions
                 WHERE deleted_at IS NULL AND (content LIKE ?1 OR (?2 = 1 AND content LIKE '%@human%'))
                 ORDER BY created_at DESC",
            )?;
            stmt.query_map(
                rusqlite::params![format!("%{needle}%"), agent.is_human() as i64],
                crate::rows::decision_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
        })?)
    }

    fn mentioning_insights(&self, agent: &Agent) -> Result<Vec<space_core::Insight>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, project_id, agent_id, spawn_id, decision_id, domain, content, open,
                    mentions, provenance, counterfactual, created_at, closed_at, archived_at, deleted_at
                 FROM insights
                 WHERE deleted_at IS NULL AND mentions LIKE ?1",
            )?;
            stmt.query_map(
                rusqlite::params![format!("%\"{}\"%", agent.handle)],
                crate::rows::insight_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
        })?)
    }

    fn mentioning_replies(&self, agent: &Agent) -> Result<Vec<space_core::Reply>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, parent_type, parent_id, author_id, spawn_id, project_id, content,
                    mentions, created_at, deleted_at
                 FROM replies
                 WHERE deleted_at IS NULL AND mentions LIKE ?1",
            )?;
            stmt.query_map(
                rusqlite::params![format!("%\"{}\"%", agent.handle)],
                crate::rows::reply_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
        })?)
    }
}
