// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gemini CLI adapter: `gemini --output-format stream-json`.
//!
//! Usage reporting falls back to a character-count estimate when the
//! vendor hasn't yet emitted a `result` event with real stats — the only
//! provider among the three that needs this, since `gemini exec` only
//! reports token counts at the very end of a turn.

use crate::adapter::{tail_jsonl, BuiltCommand, LaunchRequest, ProviderAdapter, RawEvent, ToolUseMap, Usage};
use crate::tools;
use crate::ProviderError;
use space_core::{CanonicalEvent, ProviderName, Role};
use std::path::Path;

pub struct GeminiAdapter;

const SYSTEM_OVERHEAD: u64 = 10_000;
const PER_TURN_OVERHEAD: u64 = 2_000;
const CHARS_PER_TOKEN: u64 = 4;

impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> ProviderName {
        ProviderName::Gemini
    }

    fn normalize_event(&self, raw: &RawEvent, agent_handle: &str, tool_map: &mut ToolUseMap) -> Vec<CanonicalEvent> {
        let _ = agent_handle;
        match raw.get("type").and_then(|t| t.as_str()) {
            Some("message") => {
                let role = raw.get("role").and_then(|r| r.as_str());
                let content = raw.get("content").and_then(|c| c.as_str()).unwrap_or_default();
                if role == Some("assistant") && !content.is_empty() {
                    vec![CanonicalEvent::Text { role: Role::Assistant, content: content.to_string() }]
                } else {
                    Vec::new()
                }
            }
            Some("tool_use") => {
                let tool_id = raw.get("tool_id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let tool_name = raw.get("tool_name").and_then(|v| v.as_str()).unwrap_or_default();
                let normalized = tools::normalize_tool_name(ProviderName::Gemini, tool_name);
                if !tool_id.is_empty() && !normalized.is_empty() {
                    tool_map.insert(tool_id.clone(), normalized.clone());
                }
                vec![CanonicalEvent::ToolCall {
                    tool_use_id: tool_id,
                    tool_name: normalized,
                    input: raw.get("parameters").cloned().unwrap_or_default(),
                }]
            }
            Some("tool_result") => {
                let tool_id = raw.get("tool_id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let status = raw.get("status").and_then(|v| v.as_str()).unwrap_or_default();
                let mut output = raw.get("output").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                if output.is_empty() {
                    if let Some(error) = raw.get("error") {
                        output = error.to_string();
                    }
                }
                vec![CanonicalEvent::ToolResult {
                    tool_use_id: tool_id,
                    tool_name: None,
                    is_error: status == "error",
                    output,
                }]
            }
            Some("result") => {
                let Some(stats) = raw.get("stats") else { return Vec::new() };
                vec![CanonicalEvent::Usage {
                    input_tokens: u64_field(stats, "input_tokens"),
                    output_tokens: u64_field(stats, "output_tokens"),
                    cache_read_tokens: 0,
                }]
            }
            Some("session_started") => {
                let session_id = raw.get("session_id").and_then(|v| v.as_str()).unwrap_or_default();
                if session_id.is_empty() {
                    Vec::new()
                } else {
                    vec![CanonicalEvent::ContextInit { session_id: session_id.to_string(), resumed: false }]
                }
            }
            _ => Vec::new(),
        }
    }

    fn build_command(&self, req: &LaunchRequest) -> Result<BuiltCommand, ProviderError> {
        let mut argv = vec!["gemini".to_string(), "--output-format".to_string(), "stream-json".to_string()];

        let allowed = tools::allowed_for(ProviderName::Gemini, req.allowed_tools.as_deref());
        argv.push("--allowed-tools".to_string());
        argv.push(allowed.join(","));

        argv.push("--model".to_string());
        argv.push(req.model.clone());
        argv.push("--include-directories".to_string());
        argv.push(req.cwd.clone().unwrap_or_else(|| req.root_dir.clone()));

        if let Some(session_id) = &req.session_id {
            argv.push("--resume".to_string());
            argv.push(session_id.clone());
        }
        if let Some(context) = &req.context {
            argv.push(context.clone());
        }

        Ok(BuiltCommand { argv, stdin: None })
    }

    fn parse_usage(&self, trace_path: &Path) -> Result<Usage, ProviderError> {
        let mut model = "unknown".to_string();
        let mut stats: Option<serde_json::Value> = None;

        for event in tail_jsonl(trace_path, 20)? {
            if model == "unknown" {
                if let Some(m) = event.get("model").and_then(|m| m.as_str()) {
                    model = m.to_string();
                }
            }
            if stats.is_none() && event.get("type").and_then(|t| t.as_str()) == Some("result") {
                if let Some(s) = event.get("stats") {
                    stats = Some(s.clone());
                }
            }
            if stats.is_some() && model != "unknown" {
                break;
            }
        }

        if let Some(stats) = stats {
            return Ok(Usage {
                input_tokens: u64_field(&stats, "input_tokens"),
                output_tokens: u64_field(&stats, "output_tokens"),
                cache_read_tokens: 0,
                cache_creation_tokens: 0,
                model,
            });
        }

        let (input_est, output_est, est_model) = estimate_tokens(trace_path)?;
        if input_est > SYSTEM_OVERHEAD {
            return Ok(Usage {
                input_tokens: input_est,
                output_tokens: output_est,
                cache_read_tokens: 0,
                cache_creation_tokens: 0,
                model: if model == "unknown" { est_model } else { model },
            });
        }

        Ok(Usage { model, ..Default::default() })
    }

    fn input_tokens_from_event(&self, raw: &RawEvent) -> Option<u64> {
        if raw.get("type").and_then(|t| t.as_str()) == Some("result") {
            let stats = raw.get("stats")?;
            for key in ["input_tokens", "input", "prompt_tokens", "promptTokenCount", "inputTokenCount"] {
                if let Some(v) = stats.get(key).and_then(|v| v.as_u64()) {
                    return Some(v);
                }
            }
            let total = u64_field(stats, "total_tokens");
            let output = u64_field(stats, "output_tokens");
            if total > 0 {
                return Some(total.saturating_sub(output));
            }
        }

        let usage = raw.get("message").and_then(|m| m.get("usage").or_else(|| m.get("usage_metadata")))?;
        for key in ["input_tokens", "prompt_tokens", "promptTokenCount", "inputTokenCount", "total_input_tokens"] {
            if let Some(v) = usage.get(key).and_then(|v| v.as_u64()) {
                return Some(v);
            }
        }
        None
    }
}

fn u64_field(value: &serde_json::Value, key: &str) -> u64 {
    value.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
}

/// Character-count estimate over the entire trace, used for an
/// in-progress Gemini turn that hasn't reported real stats yet.
fn estimate_tokens(trace_path: &Path) -> Result<(u64, u64, String), ProviderError> {
    let data = std::fs::read_to_string(trace_path)?;
    let mut content_chars: u64 = 0;
    let mut output_chars: u64 = 0;
    let mut turns: u64 = 0;
    let mut model = "unknown".to_string();

    for line in data.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Ok(event) = serde_json::from_str::<serde_json::Value>(trimmed) else { continue };

        if model == "unknown" {
            if let Some(m) = event.get("model").and_then(|m| m.as_str()) {
                model = m.to_string();
            }
        }

        match event.get("type").and_then(|t| t.as_str()) {
            Some("message") if event.get("role").and_then(|r| r.as_str()) == Some("assistant") => {
                turns += 1;
                if let Some(c) = event.get("content").and_then(|c| c.as_str()) {
                    content_chars += c.len() as u64;
                    output_chars += c.len() as u64;
                }
            }
            Some("tool_result") => {
                if let Some(c) = event.get("output").and_then(|c| c.as_str()) {
                    content_chars += c.len() as u64;
                }
            }
            Some("tool_use") => {
                content_chars += event.get("parameters").map(|p| p.to_string().len() as u64).unwrap_or(0);
            }
            _ => {}
        }
    }

    let input_est = content_chars / CHARS_PER_TOKEN + SYSTEM_OVERHEAD + turns * PER_TURN_OVERHEAD;
    let output_est = output_chars / CHARS_PER_TOKEN;
    Ok((input_est, output_est, model))
}

#[cfg(test)]
#[path = "gemini_tests.rs"]
mod tests;
