// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replies: threaded comments against a decision, insight, or task.
//! `@human` expands to every active human agent's handle at insert time.

use crate::rows::{parent_type_column, reply_from_row};
use space_core::{ParentType, Reply, ReplyId};

use crate::{Ledger, LedgerError};

pub struct Replies<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

const COLUMNS: &str = "id, parent_type, parent_id, author_id, spawn_id, project_id, content, \
    mentions, created_at, deleted_at";

impl<I: space_core::IdGen> Replies<'_, I> {
    pub fn create(
        &self,
        parent_type: ParentType,
        parent_id: &str,
        author_id: &str,
        spawn_id: Option<&str>,
        project_id: Option<&str>,
        content: &str,
    ) -> Result<Reply, LedgerError> {
        if content.trim().is_empty() {
            return Err(LedgerError::Validation("reply content is empty".to_string()));
        }
        let mentions = self.expand_human_mentions(space_core::parse_mentions(content))?;
        let reply = Reply {
            id: ReplyId::new(self.ledger.ids.next()),
            parent_type,
            parent_id: parent_id.to_string(),
            author_id: author_id.into(),
            spawn_id: spawn_id.map(Into::into),
            project_id: project_id.map(Into::into),
            content: content.to_string(),
            mentions,
            created_at: crate::rows::now(),
            deleted_at: None,
        };
        self.ledger.store.transaction(|conn| {
            conn.execute(
                "INSERT INTO replies (id, parent_type, parent_id, author_id, spawn_id, project_id,
                    content, mentions, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    reply.id.as_str(),
                    parent_type_column(reply.parent_type),
                    reply.parent_id,
                    reply.author_id.as_str(),
                    reply.spawn_id.as_ref().map(|s| s.as_str()),
                    reply.project_id.as_ref().map(|p| p.as_str()),
                    reply.content,
                    crate::rows::json_vec(&reply.mentions),
                    reply.created_at,
                ],
            )?;
            self.ledger.citations().store_with_conn(conn, "reply", reply.id.as_str(), content)?;
            Ok(())
        })?;
        Ok(reply)
    }

    pub fn fetch_for_parent(&self, parent_type: ParentType, parent_id: &str) -> Result<Vec<Reply>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM replies WHERE parent_type = ?1 AND parent_id = ?2
                 AND deleted_at IS NULL ORDER BY created_at ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![parent_type_column(parent_type), parent_id], reply_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?)
    }

    fn expand_human_mentions(&self, mentions: Vec<String>) -> Result<Vec<String>, LedgerError> {
        if !mentions.iter().any(|m| m == "human") {
            return Ok(mentions);
        }
        let humans = self.ledger.agents().fetch_humans()?;
        let mut expanded: Vec<String> =
            mentions.into_iter().filter(|m| m != "human").collect();
        for human in humans {
            if !expanded.contains(&human.handle) {
                expanded.push(human.handle);
            }
        }
        Ok(expanded)
    }
}
