// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row-mapping helpers shared by every primitive module: JSON-column
//! (de)serialization and the `rusqlite::Row -> domain struct` functions.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use space_core::{
    Agent, AgentId, AgentKind, Decision, DecisionId, Insight, InsightId, ParentType, Project,
    ProjectId, ProjectKind, ProviderName, Provenance, Reply, ReplyId, Spawn, SpawnId, SpawnMode,
    SpawnStatus, Task, TaskId,
};

pub fn json_vec(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

pub fn parse_json_vec(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub fn agent_from_row(row: &Row<'_>) -> rusqlite::Result<Agent> {
    let kind: String = row.get("kind")?;
    Ok(Agent {
        id: AgentId::new(row.get::<_, String>("id")?),
        handle: row.get("handle")?,
        kind: match kind.as_str() {
            "human" => AgentKind::Human,
            "system" => AgentKind::System,
            _ => AgentKind::Ai,
        },
        model: row.get("model")?,
        identity_name: row.get("identity_name")?,
        archived_at: row.get("archived_at")?,
        merged_into: row.get::<_, Option<String>>("merged_into")?.map(AgentId::new),
        created_at: row.get("created_at")?,
    })
}

pub fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    let kind: String = row.get("kind")?;
    let tags: String = row.get("tags")?;
    Ok(Project {
        id: ProjectId::new(row.get::<_, String>("id")?),
        name: row.get("name")?,
        kind: match kind.as_str() {
            "proto" => ProjectKind::Proto,
            "customer" => ProjectKind::Customer,
            _ => ProjectKind::Standard,
        },
        repo_path: row.get("repo_path")?,
        tags: parse_json_vec(&tags),
        archived_at: row.get("archived_at")?,
        created_at: row.get("created_at")?,
    })
}

pub fn decision_from_row(row: &Row<'_>) -> rusqlite::Result<Decision> {
    let refs: String = row.get("refs")?;
    Ok(Decision {
        id: DecisionId::new(row.get::<_, String>("id")?),
        project_id: ProjectId::new(row.get::<_, String>("project_id")?),
        agent_id: AgentId::new(row.get::<_, String>("agent_id")?),
        spawn_id: row.get::<_, Option<String>>("spawn_id")?.map(SpawnId::new),
        content: row.get("content")?,
        rationale: row.get("rationale")?,
        reversible: row.get("reversible")?,
        outcome: row.get("outcome")?,
        refs: parse_json_vec(&refs),
        created_at: row.get("created_at")?,
        committed_at: row.get("committed_at")?,
        actioned_at: row.get("actioned_at")?,
        rejected_at: row.get("rejected_at")?,
        archived_at: row.get("archived_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn insight_from_row(row: &Row<'_>) -> rusqlite::Result<Insight> {
    let mentions: String = row.get("mentions")?;
    let provenance: Option<String> = row.get("provenance")?;
    Ok(Insight {
        id: InsightId::new(row.get::<_, String>("id")?),
        project_id: ProjectId::new(row.get::<_, String>("project_id")?),
        agent_id: AgentId::new(row.get::<_, String>("agent_id")?),
        spawn_id: row.get::<_, Option<String>>("spawn_id")?.map(SpawnId::new),
        decision_id: row
            .get::<_, Option<String>>("decision_id")?
            .map(DecisionId::new),
        domain: row.get("domain")?,
        content: row.get("content")?,
        open: row.get::<_, i64>("open")? != 0,
        mentions: parse_json_vec(&mentions),
        provenance: provenance.as_deref().map(|p| match p {
            "collaborative" => Provenance::Collaborative,
            "synthesis" => Provenance::Synthesis,
            _ => Provenance::Solo,
        }),
        counterfactual: row.get("counterfactual")?,
        created_at: row.get("created_at")?,
        closed_at: row.get("closed_at")?,
        archived_at: row.get("archived_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    use space_core::TaskStatus;
    let status: String = row.get("status")?;
    Ok(Task {
        id: TaskId::new(row.get::<_, String>("id")?),
        project_id: ProjectId::new(row.get::<_, String>("project_id")?),
        creator_id: AgentId::new(row.get::<_, String>("creator_id")?),
        assignee_id: row.get::<_, Option<String>>("assignee_id")?.map(AgentId::new),
        decision_id: row
            .get::<_, Option<String>>("decision_id")?
            .map(DecisionId::new),
        spawn_id: row.get::<_, Option<String>>("spawn_id")?.map(SpawnId::new),
        content: row.get("content")?,
        status: match status.as_str() {
            "active" => TaskStatus::Active,
            "done" => TaskStatus::Done,
            "cancelled" => TaskStatus::Cancelled,
            _ => TaskStatus::Pending,
        },
        result: row.get("result")?,
        created_at: row.get("created_at")?,
        closed_at: row.get("closed_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn reply_from_row(row: &Row<'_>) -> rusqlite::Result<Reply> {
    let parent_type: String = row.get("parent_type")?;
    let mentions: String = row.get("mentions")?;
    Ok(Reply {
        id: ReplyId::new(row.get::<_, String>("id")?),
        parent_type: match parent_type.as_str() {
            "decision" => ParentType::Decision,
            "task" => ParentType::Task,
            _ => ParentType::Insight,
        },
        parent_id: row.get("parent_id")?,
        author_id: AgentId::new(row.get::<_, String>("author_id")?),
        spawn_id: row.get::<_, Option<String>>("spawn_id")?.map(SpawnId::new),
        project_id: row.get::<_, Option<String>>("project_id")?.map(ProjectId::new),
        content: row.get("content")?,
        mentions: parse_json_vec(&mentions),
        created_at: row.get("created_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn spawn_from_row(row: &Row<'_>) -> rusqlite::Result<Spawn> {
    let provider: String = row.get("provider")?;
    let mode: String = row.get("mode")?;
    let status: String = row.get("status")?;
    Ok(Spawn {
        id: SpawnId::new(row.get::<_, String>("id")?),
        agent_id: AgentId::new(row.get::<_, String>("agent_id")?),
        caller_spawn_id: row.get::<_, Option<String>>("caller_spawn_id")?.map(SpawnId::new),
        provider: match provider.as_str() {
            "codex" => ProviderName::Codex,
            "gemini" => ProviderName::Gemini,
            _ => ProviderName::Claude,
        },
        mode: match mode.as_str() {
            "directed" => SpawnMode::Directed,
            _ => SpawnMode::Sovereign,
        },
        status: match status.as_str() {
            "done" => SpawnStatus::Done,
            _ => SpawnStatus::Active,
        },
        pid: row.get("pid")?,
        session_id: row.get("session_id")?,
        summary: row.get("summary")?,
        error: row.get("error")?,
        trace_hash: row.get("trace_hash")?,
        resume_count: row.get::<_, i64>("resume_count")? as u32,
        created_at: row.get("created_at")?,
        last_active_at: row.get("last_active_at")?,
    })
}

pub fn parent_type_column(parent_type: ParentType) -> &'static str {
    match parent_type {
        ParentType::Insight => "insight",
        ParentType::Decision => "decision",
        ParentType::Task => "task",
    }
}

pub fn citation_target_column(target: space_core::CitationTarget) -> &'static str {
    match target {
        space_core::CitationTarget::Insight => "insight",
        space_core::CitationTarget::Decision => "decision",
    }
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
