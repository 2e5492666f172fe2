// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Projects: the grouping unit for agents, decisions, insights, and tasks.
//!
//! Customer/GitHub provisioning from the original ledger is out of scope
//! here; a project is a plain roster row the caller names and tags.

use crate::rows::project_from_row;
use crate::{Ledger, LedgerError};
use space_core::{Project, ProjectId, ProjectKind, GLOBAL_PROJECT_NAME};
use space_store::{resolve, Query, PROJECTS};

pub struct Projects<'a, I: space_core::IdGen = space_core::UuidIdGen> {
    pub(crate) ledger: &'a Ledger<I>,
}

const COLUMNS: &str = "id, name, kind, repo_path, tags, archived_at, created_at";

impl<I: space_core::IdGen> Projects<'_, I> {
    /// Ensures the seeded `_global` project exists, creating it if this is a
    /// fresh store.
    pub fn ensure_global(&self) -> Result<Project, LedgerError> {
        match self.get(GLOBAL_PROJECT_NAME) {
            Ok(project) => Ok(project),
            Err(LedgerError::Store(space_store::StoreError::NotFound { .. })) => {
                self.create(GLOBAL_PROJECT_NAME, ProjectKind::Standard, None, vec![])
            }
            Err(other) => Err(other),
        }
    }

    pub fn create(
        &self,
        name: &str,
        kind: ProjectKind,
        repo_path: Option<String>,
        tags: Vec<String>,
    ) -> Result<Project, LedgerError> {
        let project = Project {
            id: ProjectId::new(self.ledger.ids.next()),
            name: name.to_string(),
            kind,
            repo_path,
            tags,
            archived_at: None,
            created_at: crate::rows::now(),
        };
        self.ledger.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects (id, name, kind, repo_path, tags, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    project.id.as_str(),
                    project.name,
                    kind_str(project.kind),
                    project.repo_path,
                    crate::rows::json_vec(&project.tags),
                    project.created_at,
                ],
            )?;
            Ok(())
        })?;
        Ok(project)
    }

    pub fn get(&self, reference: &str) -> Result<Project, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let id = resolve(conn, PROJECTS, reference)?;
            let sql = format!("SELECT {COLUMNS} FROM projects WHERE id = ?1");
            conn.query_row(&sql, [&id], project_from_row).map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => space_store::StoreError::NotFound {
                    table: "projects".to_string(),
                    reference: reference.to_string(),
                },
                other => space_store::StoreError::Sqlite(other),
            })
        })?)
    }

    pub fn fetch_active(&self) -> Result<Vec<Project>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            Query::new("projects", COLUMNS)
                .not_archived()
                .order("name ASC")
                .fetch(conn, project_from_row)
        })?)
    }

    pub fn archive(&self, reference: &str) -> Result<(), LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let id = resolve(conn, PROJECTS, reference)?;
            conn.execute(
                "UPDATE projects SET archived_at = ?1 WHERE id = ?2",
                rusqlite::params![crate::rows::now(), id],
            )?;
            Ok(())
        })?)
    }

    pub fn restore(&self, reference: &str) -> Result<(), LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let id = resolve(conn, PROJECTS, reference)?;
            conn.execute(
                "UPDATE projects SET archived_at = NULL WHERE id = ?1",
                [&id],
            )?;
            Ok(())
        })?)
    }

    /// Most recent activity timestamp across decisions/insights/tasks, one
    /// query per project id, used by the context builder's `projects` block.
    pub fn last_active_at(
        &self,
        project_id: &str,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            conn.query_row(
                "SELECT MAX(ts) FROM (
                    SELECT created_at AS ts FROM decisions WHERE project_id = ?1
                    UNION ALL
                    SELECT created_at AS ts FROM insights WHERE project_id = ?1
                    UNION ALL
                    SELECT created_at AS ts FROM tasks WHERE project_id = ?1
                 )",
                [project_id],
                |row| row.get(0),
            )
            .map_err(space_store::StoreError::from)
        })?)
    }

    /// Open decision/insight/task counts for `project_id`, used by the
    /// context builder's `projects` block.
    pub fn artifact_counts(&self, project_id: &str) -> Result<ArtifactCounts, LedgerError> {
        Ok(self.ledger.store.with_conn(|conn| {
            let decisions: i64 = conn.query_row(
                "SELECT COUNT(*) FROM decisions WHERE project_id = ?1 AND deleted_at IS NULL
                 AND committed_at IS NULL AND rejected_at IS NULL",
                [project_id],
                |row| row.get(0),
            )?;
            let insights: i64 = conn.query_row(
                "SELECT COUNT(*) FROM insights WHERE project_id = ?1 AND deleted_at IS NULL
                 AND open = 1",
                [project_id],
                |row| row.get(0),
            )?;
            let tasks: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE project_id = ?1 AND deleted_at IS NULL
                 AND status IN ('pending', 'active')",
                [project_id],
                |row| row.get(0),
            )?;
            Ok(ArtifactCounts { open_decisions: decisions, open_insights: insights, open_tasks: tasks })
        })?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactCounts {
    pub open_decisions: i64,
    pub open_insights: i64,
    pub open_tasks: i64,
}

fn kind_str(kind: ProjectKind) -> &'static str {
    match kind {
        ProjectKind::Standard => "standard",
        ProjectKind::Proto => "proto",
        ProjectKind::Customer => "customer",
    }
}
