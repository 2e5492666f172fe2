// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Codex CLI adapter: `codex exec --json ... resume <session_id> -`.

use crate::adapter::{tail_jsonl, BuiltCommand, LaunchRequest, ProviderAdapter, RawEvent, ToolUseMap, Usage};
use crate::ProviderError;
use space_core::{CanonicalEvent, ProviderName, Role};
use std::path::Path;

pub struct CodexAdapter;

impl ProviderAdapter for CodexAdapter {
    fn name(&self) -> ProviderName {
        ProviderName::Codex
    }

    fn normalize_event(&self, raw: &RawEvent, agent_handle: &str, tool_map: &mut ToolUseMap) -> Vec<CanonicalEvent> {
        let _ = agent_handle;
        let event_type = raw.get("type").and_then(|t| t.as_str()).unwrap_or("");
        let item = raw.get("item").cloned().unwrap_or_default();
        let item_type = item.get("type").and_then(|t| t.as_str()).unwrap_or("");

        match (event_type, item_type) {
            ("item.started", "command_execution") => {
                let item_id = item.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let command = item.get("command").and_then(|v| v.as_str()).unwrap_or_default();
                tool_map.insert(item_id.clone(), "Bash".to_string());

                let normalized_command = command
                    .strip_prefix("/bin/zsh -lc '")
                    .and_then(|rest| rest.strip_suffix('\''))
                    .unwrap_or(command);

                vec![CanonicalEvent::ToolCall {
                    tool_use_id: item_id,
                    tool_name: "Bash".to_string(),
                    input: serde_json::json!({"command": normalized_command}),
                }]
            }
            ("item.completed", "command_execution") => {
                let item_id = item.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let output = item.get("aggregated_output").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let exit_code = item.get("exit_code").and_then(|v| v.as_i64()).unwrap_or(0);
                vec![CanonicalEvent::ToolResult {
                    tool_use_id: item_id,
                    tool_name: Some("Bash".to_string()),
                    is_error: exit_code != 0,
                    output,
                }]
            }
            ("item.completed", "reasoning") | ("item.completed", "agent_message") => {
                match item.get("text").and_then(|v| v.as_str()) {
                    Some(text) if !text.is_empty() => {
                        vec![CanonicalEvent::Text { role: Role::Assistant, content: text.to_string() }]
                    }
                    _ => Vec::new(),
                }
            }
            ("item.completed", "file_change") => {
                let changes = item.get("changes").and_then(|c| c.as_array()).cloned().unwrap_or_default();
                if changes.is_empty() {
                    return Vec::new();
                }
                let summary = changes
                    .iter()
                    .map(|c| {
                        let kind = c.get("kind").and_then(|v| v.as_str()).unwrap_or("update");
                        let path = c.get("path").and_then(|v| v.as_str()).unwrap_or("");
                        let name = path.rsplit('/').next().unwrap_or(path);
                        format!("{kind} {name}")
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![CanonicalEvent::ToolResult {
                    tool_use_id: item.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                    tool_name: None,
                    is_error: false,
                    output: summary,
                }]
            }
            ("turn.completed", _) => {
                let Some(usage) = raw.get("usage") else { return Vec::new() };
                vec![CanonicalEvent::Usage {
                    input_tokens: u64_field(usage, "input_tokens"),
                    output_tokens: u64_field(usage, "output_tokens"),
                    cache_read_tokens: u64_field(usage, "cached_input_tokens"),
                }]
            }
            ("thread.started", _) => {
                let thread_id = raw.get("thread_id").and_then(|v| v.as_str()).unwrap_or_default();
                if thread_id.is_empty() {
                    Vec::new()
                } else {
                    vec![CanonicalEvent::ContextInit { session_id: thread_id.to_string(), resumed: false }]
                }
            }
            _ => Vec::new(),
        }
    }

    fn build_command(&self, req: &LaunchRequest) -> Result<BuiltCommand, ProviderError> {
        let mut argv = vec![
            "codex".to_string(),
            "exec".to_string(),
            "--json".to_string(),
            "--dangerously-bypass-approvals-and-sandbox".to_string(),
            "--skip-git-repo-check".to_string(),
            "--model".to_string(),
            req.model.clone(),
            "--cd".to_string(),
            req.cwd.clone().unwrap_or_else(|| req.root_dir.clone()),
        ];

        if let Some(session_id) = &req.session_id {
            argv.push("resume".to_string());
            argv.push(session_id.clone());
            argv.push("-".to_string());
        } else {
            argv.push("-".to_string());
        }

        Ok(BuiltCommand { argv, stdin: req.context.clone() })
    }

    fn parse_usage(&self, trace_path: &Path) -> Result<Usage, ProviderError> {
        let mut model = "unknown".to_string();
        let mut usage: Option<serde_json::Value> = None;

        for event in tail_jsonl(trace_path, 20)? {
            if model == "unknown" {
                if let Some(m) = event.get("model").and_then(|m| m.as_str()) {
                    model = m.to_string();
                }
            }
            if usage.is_none() && event.get("type").and_then(|t| t.as_str()) == Some("turn.completed") {
                if let Some(u) = event.get("usage") {
                    usage = Some(u.clone());
                }
            }
            if usage.is_some() && model != "unknown" {
                break;
            }
        }

        let usage = usage.unwrap_or_default();
        Ok(Usage {
            input_tokens: u64_field(&usage, "input_tokens"),
            output_tokens: u64_field(&usage, "output_tokens"),
            cache_read_tokens: u64_field(&usage, "cached_input_tokens"),
            cache_creation_tokens: 0,
            model,
        })
    }

    fn input_tokens_from_event(&self, raw: &RawEvent) -> Option<u64> {
        if raw.get("type").and_then(|t| t.as_str()) != Some("turn.completed") {
            return None;
        }
        let usage = raw.get("usage")?;
        Some(u64_field(usage, "input_tokens"))
    }
}

fn u64_field(value: &serde_json::Value, key: &str) -> u64 {
    value.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
}

#[cfg(test)]
#[path = "codex_tests.rs"]
mod tests;
