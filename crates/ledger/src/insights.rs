// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Insights: short citable observations, with provenance derived from the
//! other agents' work a new insight cites.

use crate::rows::insight_from_row;
use crate::{Ledger, LedgerError};
use chrono::{Duration, Utc};
use rusqlite::OptionalExtension;
use space_core::{Agent, Insight, InsightId, Provenance};
use space_store::{resolve, Query, INSIGHTS};

pub struct Insights<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

const COLUMNS: &str = "id, project_id, agent_id, spawn_id, decision_id, domain, content, open, \
    mentions, provenance, counterfactual, created_at, closed_at, archived_at, deleted_at";

impl<I: space_core::IdGen> Insights<'_, I> {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &self,
        project_id: &str,
        agent_id: &str,
        spawn_id: Option<&str>,
        decision_id: Option<&str>,
        domain: &str,
        content: &str,
    ) -> Result<Insight, LedgerError> {
        Insight::validate_content(content).map_err(|e| LedgerError::Validation(e.to_string()))?;
        let mentions = space_core::parse_mentions(content);

        let insight_id = InsightId::new(self.ledger.ids.next());
        let cross_agent_citations = self.resolve_cited_agents(content, agent_id)?;
        let provenance = Provenance::from_other_agent_count(cross_agent_citations.len());

        let insight = Insight {
            id: insight_id,
            project_id: project_id.into(),
            agent_id: agent_id.into(),
            spawn_id: spawn_id.map(Into::into),
            decision_id: decision_id.map(Into::into),
            domain: domain.to_string(),
            content: content.to_string(),
            open: true,
            mentions,
            provenance: Some(provenance),
            counterfactual: None,
            created_at: crate::rows::now(),
            closed_at: None,
            archived_at: None,
            deleted_at: None,
        };
        self.ledger.store.transaction(|conn| {
            conn.execute(
                "INSERT INTO insights (id, project_id, agent_id, spawn_id, decision_id, domain,
                    content, open, mentions, provenance, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9, ?10)",
                rusqlite::params![
                    insight.id.as_str(),
                    insight.project_id.as_str(),
                    insight.agent_id.as_str(),
                    insight.spawn_id.as_ref().map(|s| s.as_str()),
                    insight.decision_id.as_ref().map(|d| d.as_str()),
                    insight.domain,
                    insight.content,
                    crate::rows::json_vec(&insight.mentions),
                    provenance_str(provenance),
                    insight.created_at,
                ],
            )?;
            self.ledger.citations().store_with_conn(conn, "insight", insight.id.as_str(), content)?;
            Ok(())
        })?;
        Ok(insight)
    }

    pub fn get(&self, reference: &str) -> Result<Insight, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let id = resolve(conn, INSIGHTS, reference)?;
            let sql = format!("SELECT {COLUMNS} FROM insights WHERE id = ?1");
            conn.query_row(&sql, [&id], insight_from_row).map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => space_store::StoreError::NotFound {
                    table: "insights".to_string(),
                    reference: reference.to_string(),
                },
                other => space_store::StoreError::Sqlite(other),
            })
        })?)
    }

    pub fn fetch_open(&self, project_id: &str) -> Result<Vec<Insight>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("insights", COLUMNS)
                .where_clause("project_id = ?1", project_id.to_string())
                .not_deleted()
                .raw("open = 1")
                .order("created_at DESC")
                .fetch(conn, insight_from_row)
        })?)
    }

    /// All open insights tagged `domain = 'routine'`, across every project —
    /// standing behaviors that persist across spawns regardless of which
    /// project's context is being built. Used by the context builder's
    /// `routines` block.
    pub fn fetch_routines(&self) -> Result<Vec<Insight>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("insights", COLUMNS)
                .where_clause("domain = ?1", "routine".to_string())
                .not_deleted()
                .raw("open = 1")
                .order("created_at ASC")
                .limit(Some(50))
                .fetch(conn, insight_from_row)
        })?)
    }

    pub fn fetch_by_agent(&self, agent_id: &str, limit: i64) -> Result<Vec<Insight>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("insights", COLUMNS)
                .where_clause("agent_id = ?1", agent_id.to_string())
                .not_deleted()
                .order("created_at DESC")
                .limit(Some(limit))
                .fetch(conn, insight_from_row)
        })?)
    }

    pub fn close(&self, reference: &str, counterfactual: Option<bool>) -> Result<Insight, LedgerError> {
        let mut insight = self.get(reference)?;
        insight.open = false;
        insight.closed_at = Some(crate::rows::now());
        insight.counterfactual = counterfactual;
        self.ledger.store.with_conn(|conn| {
            conn.execute(
                "UPDATE insights SET open = 0, closed_at = ?1, counterfactual = ?2 WHERE id = ?3",
                rusqlite::params![insight.closed_at, insight.counterfactual, insight.id.as_str()],
            )?;
            Ok(())
        })?;
        Ok(insight)
    }

    pub fn archive(&self, reference: &str) -> Result<(), LedgerError> {
        let insight = self.get(reference)?;
        self.ledger.artifacts().archive("insights", insight.id.as_str())
    }

    pub fn delete(&self, reference: &str) -> Result<(), LedgerError> {
        let insight = self.get(reference)?;
        self.ledger.artifacts().soft_delete("insights", insight.id.as_str())
    }

    /// Archives `status`/`status/*` insights older than `older_than_hours`
    /// that no citation ever points at — stale operational chatter nobody
    /// referenced, which would otherwise accumulate in every future context
    /// build. Returns the number archived.
    pub fn prune_stale_status(&self, older_than_hours: i64) -> Result<usize, LedgerError> {
        let cutoff = Utc::now() - Duration::hours(older_than_hours);
        Ok(self.ledger.store.with_conn(|conn| {
            conn.execute(
                "UPDATE insights SET archived_at = ?1
                 WHERE id IN (
                     SELECT i.id FROM insights i
                     WHERE i.deleted_at IS NULL
                       AND i.archived_at IS NULL
                       AND i.created_at < ?2
                       AND (i.domain = 'status' OR i.domain LIKE 'status/%')
                       AND NOT EXISTS (
                           SELECT 1 FROM citations c
                           WHERE c.target_type = 'insight' AND c.target_short_id = substr(i.id, 1, 8)
                       )
                 )",
                rusqlite::params![Utc::now(), cutoff],
            )
            .map_err(space_store::StoreError::from)
        })?)
    }

    /// True if any insight by `agent_id` mentions one of `inbox_handles` and
    /// hasn't been marked read by that agent yet — used to decide whether a
    /// fresh spawn should see the `me` context block's inbox nudge.
    pub fn has_unprocessed_mentions(&self, agent: &Agent) -> Result<bool, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT i.id FROM insights i
                 WHERE i.deleted_at IS NULL
                   AND i.mentions LIKE '%' || ?1 || '%'
                   AND NOT EXISTS (
                       SELECT 1 FROM artifact_reads r
                       WHERE r.artifact_type = 'insight' AND r.artifact_id = i.id AND r.agent_id = ?2
                   )
                 LIMIT 1",
            )?;
            let found = stmt
                .query_row(rusqlite::params![agent.handle, agent.id.as_str()], |row| {
                    row.get::<_, String>(0)
                })
                .optional()?;
            Ok(found.is_some())
        })?)
    }

    /// Handles with at least one open, un-replied-to mention across
    /// insights (optionally scoped to one project) — backs the scheduler's
    /// `inbox_mult` weighting term.
    pub fn agents_with_inbox(&self, project_id: Option<&str>) -> Result<std::collections::HashSet<String>, LedgerError> {
        let candidates = self.ledger.store.with_conn(|conn| {
            let mut q = Query::new("insights", COLUMNS).not_deleted().not_archived().raw("mentions IS NOT NULL");
            if let Some(project_id) = project_id {
                q = q.where_clause("project_id = ?1", project_id.to_string());
            }
            q.fetch(conn, insight_from_row)
        })?;

        let handle_by_id: std::collections::HashMap<String, String> =
            self.ledger.agents().fetch_active()?.into_iter().map(|a| (a.id.as_str().to_string(), a.handle)).collect();

        let mut out = std::collections::HashSet::new();
        for insight in &candidates {
            if insight.mentions.is_empty() {
                continue;
            }
            let replies = self.ledger.replies().fetch_for_parent(space_core::ParentType::Insight, insight.id.as_str())?;
            let replied: std::collections::HashSet<&str> =
                replies.iter().filter_map(|r| handle_by_id.get(r.author_id.as_str()).map(String::as_str)).collect();
            for handle in &insight.mentions {
                if !replied.contains(handle.as_str()) {
                    out.insert(handle.clone());
                }
            }
        }
        Ok(out)
    }

    /// True if any `domain = 'stream'` insight has no reply yet — backs the
    /// scheduler's `stream_mult` weighting term.
    pub fn has_unprocessed_stream(&self) -> Result<bool, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT i.id FROM insights i
                 WHERE i.domain = 'stream' AND i.deleted_at IS NULL AND i.archived_at IS NULL
                   AND NOT EXISTS (
                       SELECT 1 FROM replies r
                       WHERE r.parent_type = 'insight' AND r.parent_id = i.id AND r.deleted_at IS NULL
                   )
                 LIMIT 1",
            )?;
            let found = stmt.query_row([], |row| row.get::<_, String>(0)).optional()?;
            Ok(found.is_some())
        })?)
    }

    /// Agent id of the cited entity's author, other than `author_id`, once
    /// per citation in `content` that resolves to a different agent — the
    /// provenance count is over citations, not distinct agents, so citing
    /// the same other agent twice counts twice. Queries the target tables
    /// directly rather than the citations table, since the citations for
    /// this not-yet-created insight haven't been stored.
    fn resolve_cited_agents(&self, content: &str, author_id: &str) -> Result<Vec<String>, LedgerError> {
        let mut agents = Vec::new();
        for citation in space_core::extract_citations(content) {
            let table = match citation.target {
                space_core::CitationTarget::Insight => "insights",
                space_core::CitationTarget::Decision => "decisions",
            };
            let found: Option<String> = self.ledger.store.with_conn(|conn| {
                let sql =
                    format!("SELECT agent_id FROM {table} WHERE id LIKE ?1 || '%' AND deleted_at IS NULL LIMIT 1");
                conn.query_row(&sql, [&citation.short_id], |row| row.get(0))
                    .optional()
                    .map_err(space_store::StoreError::from)
            })?;
            if let Some(agent) = found {
                if agent != author_id {
                    agents.push(agent);
                }
            }
        }
        Ok(agents)
    }
}

fn provenance_str(p: Provenance) -> &'static str {
    match p {
        Provenance::Solo => "solo",
        Provenance::Collaborative => "collaborative",
        Provenance::Synthesis => "synthesis",
    }
}
