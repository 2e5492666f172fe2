// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-vendor adapter trait every `ClaudeAdapter`/`CodexAdapter`/
//! `GeminiAdapter` implements. Pure functions over bytes and structs: no
//! process spawning, no I/O beyond reading the finished trace file for
//! `parse_usage`.

use crate::tools::Capability;
use crate::ProviderError;
use space_core::{CanonicalEvent, ProviderName};
use std::collections::HashMap;
use std::path::Path;

/// One raw line of vendor JSONL, already parsed as a JSON value.
pub type RawEvent = serde_json::Value;

/// Carries `tool_use_id -> tool_name` across a trace's lifetime so a later
/// `tool_result` line can be attributed to the call that produced it.
pub type ToolUseMap = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub model: String,
    pub session_id: Option<String>,
    pub context: Option<String>,
    pub root_dir: String,
    pub cwd: Option<String>,
    pub allowed_tools: Option<Vec<Capability>>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltCommand {
    pub argv: Vec<String>,
    pub stdin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
    pub model: String,
}

pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> ProviderName;

    fn normalize_event(
        &self,
        raw: &RawEvent,
        agent_handle: &str,
        tool_map: &mut ToolUseMap,
    ) -> Vec<CanonicalEvent>;

    fn build_command(&self, req: &LaunchRequest) -> Result<BuiltCommand, ProviderError>;

    fn parse_usage(&self, trace_path: &Path) -> Result<Usage, ProviderError>;

    fn input_tokens_from_event(&self, raw: &RawEvent) -> Option<u64>;

    fn capability_tools(&self, caps: &[Capability]) -> Vec<String> {
        crate::tools::allowed_for(self.name(), Some(caps))
    }

    fn always_disallowed_tools(&self) -> Vec<String> {
        crate::tools::disallowed_for(self.name(), None)
    }
}

/// Read JSONL lines from the tail of a file, most recent first, skipping
/// blank and undecodable lines — mirrors the vendor adapters' tail-based
/// usage parsing, which only needs the last turn's numbers.
pub(crate) fn tail_jsonl(path: &Path, max_lines: usize) -> std::io::Result<Vec<RawEvent>> {
    const TAIL_CHUNK_SIZE: u64 = 8192;

    let data = std::fs::read(path)?;
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let chunk_size = TAIL_CHUNK_SIZE.min(data.len() as u64) as usize;
    let start = data.len() - chunk_size;
    let text = String::from_utf8_lossy(&data[start..]);

    let mut lines: Vec<&str> = text.split('\n').collect();
    if start > 0 && !lines.is_empty() {
        lines.remove(0);
    }

    let mut out = Vec::new();
    for line in lines.into_iter().rev() {
        if out.len() >= max_lines {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<RawEvent>(trimmed) {
            out.push(value);
        }
    }
    Ok(out)
}

/// Render tool-result content the way the vendors do: a plain string as-is,
/// anything else as its JSON text (image blocks collapse to a placeholder).
pub(crate) fn stringify_content(content: &serde_json::Value) -> String {
    if let Some(s) = content.as_str() {
        return s.to_string();
    }
    if let Some(arr) = content.as_array() {
        if arr.iter().any(|c| c.get("type").and_then(|t| t.as_str()) == Some("image")) {
            return "[Image content]".to_string();
        }
    }
    content.to_string()
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
