// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `wake` prompt a fresh spawn opens with, and the `resume` wrapper a
//! relaunched one gets instead.
//!
//! `wake` concatenates up to four optional blocks — `projects`, `me`,
//! `routines`, and a caller-supplied `skills` block — each wrapped in its own
//! tag and skipped entirely when it has nothing to say, then appends a
//! trailing `act.` line.

use crate::ContextError;
use chrono::{DateTime, Utc};
use space_core::{Agent, Decision, DecisionStatus, Insight, Spawn};
use space_ledger::Ledger;
use std::path::Path;

/// Everything `wake` needs beyond the agent whose spawn is starting:
/// the project to restrict the `projects` block to when a swarm run is
/// focused on one, and any explicitly-named skills to inject.
#[derive(Debug, Clone, Default)]
pub struct WakeOptions<'a> {
    pub focus_project: Option<&'a str>,
    pub skills_dir: Option<&'a Path>,
    pub skills: Vec<String>,
}

/// Composes the `wake` prompt for `agent`'s new `spawn`.
pub fn wake<I: space_core::IdGen>(
    ledger: &Ledger<I>,
    agent: &Agent,
    spawn: &Spawn,
    options: &WakeOptions<'_>,
) -> Result<String, ContextError> {
    let mut parts = Vec::new();
    parts.push(projects_block(ledger, options.focus_project)?);
    parts.push(me_block(ledger, agent, spawn)?);
    parts.push(routines_block(ledger)?);
    if !options.skills.is_empty() {
        if let Some(skills_dir) = options.skills_dir {
            parts.push(crate::skills::inject(skills_dir, &options.skills)?);
        }
    }

    let blocks = parts.iter().filter(|p| !p.is_empty()).count();
    let mut body = parts.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join("\n\n");
    if !body.is_empty() {
        body.push_str("\n\n");
    }
    body.push_str("act.");
    tracing::debug!(agent = %agent.handle, spawn_id = %spawn.id, blocks, "composed wake prompt");
    Ok(body)
}

/// Wraps a resumed spawn's instruction in a system-reminder, or returns it
/// unchanged if there's no spawn to resume (a fresh identity-preview call).
pub fn resume(instruction: &str, spawn: Option<&Spawn>) -> String {
    if spawn.is_none() {
        return instruction.to_string();
    }
    let context = if instruction.trim().is_empty() || instruction == "0" {
        "continue working on the task"
    } else {
        instruction
    };
    format!("<system-reminder>\nSession resumed.\n</system-reminder>\n\n{context}")
}

fn me_block<I: space_core::IdGen>(ledger: &Ledger<I>, agent: &Agent, spawn: &Spawn) -> Result<String, ContextError> {
    let mut sections = Vec::new();

    let summaries = recent_summaries(ledger, agent, spawn)?;
    if !summaries.is_empty() {
        sections.push(format!("[spawns]\n{}", summaries.join("\n")));
    }

    let my_insights = ledger.insights().fetch_by_agent(agent.id.as_str(), 5)?;
    if !my_insights.is_empty() {
        let lines = my_insights
            .iter()
            .map(|i| format!("  i/{} [{}] {}", i.id.short(8), i.domain, flatten_truncate(&i.content, 70)))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("[insights]\n{lines}"));
    }

    let my_decisions = ledger.decisions().fetch_by_agent(agent.id.as_str(), 5)?;
    if !my_decisions.is_empty() {
        let lines = my_decisions
            .iter()
            .map(|d| format!("  d/{} [{}] {}", d.id.short(8), decision_status_label(d), flatten_truncate(&d.content, 70)))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("[decisions]\n{lines}"));
    }

    if sections.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("<me>\n{}\n</me>", sections.join("\n\n")))
}

fn decision_status_label(d: &Decision) -> &'static str {
    match d.status() {
        DecisionStatus::Proposed => "proposed",
        DecisionStatus::Committed => "committed",
        DecisionStatus::Actioned => "actioned",
        DecisionStatus::Rejected => "rejected",
    }
}

fn recent_summaries<I: space_core::IdGen>(
    ledger: &Ledger<I>,
    agent: &Agent,
    current_spawn: &Spawn,
) -> Result<Vec<String>, ContextError> {
    let prior = ledger.spawns().fetch_recent_done(agent.id.as_str(), 3)?;
    Ok(prior
        .iter()
        .filter(|s| s.id != current_spawn.id)
        .filter_map(|s| s.summary.as_deref().map(|summary| format_summary(s, summary)))
        .collect())
}

fn format_summary(spawn: &Spawn, summary: &str) -> String {
    let ts = ago_str(spawn.last_active_at.unwrap_or(spawn.created_at));
    format!("s/{} ({ts}): {summary}", spawn.id.short(8))
}

fn ago_str(timestamp: DateTime<Utc>) -> String {
    let hours = (Utc::now() - timestamp).num_hours();
    if hours < 1 {
        "<1h ago".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{}d ago", hours / 24)
    }
}

fn projects_block<I: space_core::IdGen>(ledger: &Ledger<I>, focus_project: Option<&str>) -> Result<String, ContextError> {
    let mut projects = ledger.projects().fetch_active()?;
    if let Some(name) = focus_project {
        projects.retain(|p| p.name == name);
    }
    if projects.is_empty() {
        return Ok(String::new());
    }

    let mut rows = Vec::new();
    for project in &projects {
        let last_active = ledger.projects().last_active_at(project.id.as_str())?;
        let counts = ledger.projects().artifact_counts(project.id.as_str())?;
        rows.push((project, last_active, counts.open_decisions + counts.open_insights + counts.open_tasks));
    }
    rows.sort_by(|a, b| {
        let key_a = a.1.unwrap_or(a.0.created_at);
        let key_b = b.1.unwrap_or(b.0.created_at);
        key_b.cmp(&key_a).then_with(|| a.0.name.cmp(&b.0.name))
    });

    let lines = rows
        .into_iter()
        .map(|(project, last_active, count)| {
            let activity = last_active.map(ago_str).unwrap_or_else(|| "·".to_string());
            let tags = if project.tags.is_empty() { String::new() } else { format!("  [{}]", project.tags.join(",")) };
            let path = project.repo_path.as_deref().map(|p| format!("  {p}")).unwrap_or_default();
            format!("{:<15} {:>4} {:>3}{tags}{path}", project.name, count, activity)
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!("<projects>\n{lines}\n</projects>"))
}

fn routines_block<I: space_core::IdGen>(ledger: &Ledger<I>) -> Result<String, ContextError> {
    let routines = ledger.insights().fetch_routines()?;
    if routines.is_empty() {
        return Ok(String::new());
    }
    let lines = routines.iter().map(|r: &Insight| format!("- {}", r.content)).collect::<Vec<_>>().join("\n");
    Ok(format!("<routines>\n{lines}\n</routines>"))
}

/// Collapses newlines and truncates to `max` characters with an ellipsis,
/// the teacher's own char-counting truncate pattern generalized to text
/// that might span lines.
fn flatten_truncate(s: &str, max: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let truncated: String = flat.chars().take(max).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
