// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude Code adapter: `claude --print --output-format stream-json`.

use crate::adapter::{stringify_content, tail_jsonl, BuiltCommand, LaunchRequest, ProviderAdapter, RawEvent, ToolUseMap, Usage};
use crate::tools;
use crate::ProviderError;
use space_core::{CanonicalEvent, ProviderName, Role};
use std::path::Path;

pub struct ClaudeAdapter;

impl ProviderAdapter for ClaudeAdapter {
    fn name(&self) -> ProviderName {
        ProviderName::Claude
    }

    fn normalize_event(&self, raw: &RawEvent, agent_handle: &str, tool_map: &mut ToolUseMap) -> Vec<CanonicalEvent> {
        let _ = agent_handle;
        match raw.get("type").and_then(|t| t.as_str()) {
            Some("assistant") => normalize_assistant(raw, tool_map),
            Some("user") => normalize_user(raw, tool_map).into_iter().collect(),
            Some("system") if raw.get("subtype").and_then(|s| s.as_str()) == Some("init") => {
                normalize_init(raw).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    fn build_command(&self, req: &LaunchRequest) -> Result<BuiltCommand, ProviderError> {
        let mut argv = vec![
            "claude".to_string(),
            "--print".to_string(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
            "--dangerously-skip-permissions".to_string(),
        ];

        let disallowed = tools::disallowed_for(ProviderName::Claude, req.allowed_tools.as_deref());
        if !disallowed.is_empty() {
            argv.push("--disallowedTools".to_string());
            argv.push(disallowed.join(","));
        }

        argv.push("--model".to_string());
        argv.push(req.model.clone());

        if let Some(cwd) = &req.cwd {
            argv.push("--add-dir".to_string());
            argv.push(cwd.clone());
        }
        if let Some(session_id) = &req.session_id {
            argv.push("--resume".to_string());
            argv.push(session_id.clone());
        }

        if !req.images.is_empty() {
            argv.push("--input-format".to_string());
            argv.push("stream-json".to_string());
            let mut content: Vec<serde_json::Value> = req
                .images
                .iter()
                .map(|path| serde_json::json!({"type": "image", "path": path}))
                .collect();
            if let Some(context) = &req.context {
                content.push(serde_json::json!({"type": "text", "text": context}));
            }
            let message = serde_json::json!({
                "type": "user",
                "message": {"role": "user", "content": content},
            });
            return Ok(BuiltCommand { argv, stdin: Some(message.to_string()) });
        }

        Ok(BuiltCommand { argv, stdin: req.context.clone() })
    }

    fn parse_usage(&self, trace_path: &Path) -> Result<Usage, ProviderError> {
        let mut model = "unknown".to_string();
        let mut last_usage: Option<serde_json::Value> = None;

        for event in tail_jsonl(trace_path, 20)? {
            let msg = event.get("message").cloned().unwrap_or_default();
            if model == "unknown" {
                if let Some(m) = msg.get("model").and_then(|m| m.as_str()) {
                    model = m.to_string();
                }
            }
            if last_usage.is_none() {
                if let Some(usage) = msg.get("usage") {
                    last_usage = Some(usage.clone());
                }
            }
            if last_usage.is_some() && model != "unknown" {
                break;
            }
        }

        let usage = last_usage.unwrap_or_default();
        let input_tokens = u64_field(&usage, "input_tokens");
        let cache_read = u64_field(&usage, "cache_read_input_tokens");
        let cache_creation = u64_field(&usage, "cache_creation_input_tokens");

        Ok(Usage {
            input_tokens: input_tokens + cache_read + cache_creation,
            output_tokens: u64_field(&usage, "output_tokens"),
            cache_read_tokens: cache_read,
            cache_creation_tokens: cache_creation,
            model,
        })
    }

    fn input_tokens_from_event(&self, raw: &RawEvent) -> Option<u64> {
        let usage = raw.get("message")?.get("usage")?;
        Some(u64_field(usage, "input_tokens") + u64_field(usage, "cache_read_input_tokens") + u64_field(usage, "cache_creation_input_tokens"))
    }
}

fn u64_field(value: &serde_json::Value, key: &str) -> u64 {
    value.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
}

fn normalize_assistant(raw: &RawEvent, tool_map: &mut ToolUseMap) -> Vec<CanonicalEvent> {
    let msg = raw.get("message").cloned().unwrap_or_default();
    let Some(blocks) = msg.get("content").and_then(|c| c.as_array()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    if let Some(usage) = msg.get("usage") {
        if usage.get("input_tokens").and_then(|v| v.as_u64()).unwrap_or(0) > 0 {
            out.push(CanonicalEvent::Usage {
                input_tokens: u64_field(usage, "input_tokens") + u64_field(usage, "cache_read_input_tokens") + u64_field(usage, "cache_creation_input_tokens"),
                output_tokens: u64_field(usage, "output_tokens"),
                cache_read_tokens: u64_field(usage, "cache_read_input_tokens"),
            });
        }
    }

    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                    if !text.is_empty() {
                        out.push(CanonicalEvent::Text { role: Role::Assistant, content: text.to_string() });
                        return out;
                    }
                }
            }
            Some("tool_use") => {
                let tool_use_id = block.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let tool_name = block.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                if !tool_use_id.is_empty() && !tool_name.is_empty() {
                    tool_map.insert(tool_use_id.clone(), tool_name.clone());
                }
                out.push(CanonicalEvent::ToolCall {
                    tool_use_id,
                    tool_name,
                    input: block.get("input").cloned().unwrap_or_default(),
                });
                return out;
            }
            _ => {}
        }
    }
    out
}

/// Claude Code announces the session id exactly once, in a `system/init`
/// line preceding any assistant output.
fn normalize_init(raw: &RawEvent) -> Option<CanonicalEvent> {
    let session_id = raw.get("session_id").and_then(|v| v.as_str())?;
    if session_id.is_empty() {
        return None;
    }
    Some(CanonicalEvent::ContextInit { session_id: session_id.to_string(), resumed: false })
}

fn normalize_user(raw: &RawEvent, tool_map: &ToolUseMap) -> Option<CanonicalEvent> {
    let content = raw.get("message")?.get("content")?.as_array()?;
    let item = content.iter().find(|c| c.get("type").and_then(|t| t.as_str()) == Some("tool_result"))?;

    let tool_use_id = item.get("tool_use_id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let tool_name = tool_map.get(&tool_use_id).cloned();

    let raw_content = item.get("content").cloned().unwrap_or_default();
    let mut output = stringify_content(&raw_content);
    if tool_name.as_deref() == Some("Read") {
        let line_count = output.matches('\n').count();
        if line_count > 0 {
            output = format!("({line_count} lines)");
        }
    }

    Some(CanonicalEvent::ToolResult {
        tool_use_id,
        tool_name,
        is_error: item.get("is_error").and_then(|v| v.as_bool()).unwrap_or(false),
        output,
    })
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
