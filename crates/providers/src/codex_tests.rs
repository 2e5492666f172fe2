// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn normalizes_command_execution_started_and_strips_zsh_wrapper() {
    let adapter = CodexAdapter;
    let mut tool_map = ToolUseMap::new();
    let raw = json!({
        "type": "item.started",
        "item": {"id": "c1", "type": "command_execution", "command": "/bin/zsh -lc 'ls -la'"},
    });
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    match &events[0] {
        CanonicalEvent::ToolCall { tool_name, input, .. } => {
            assert_eq!(tool_name, "Bash");
            assert_eq!(input["command"], "ls -la");
        }
        other => panic!("expected ToolCall, got {other:?}"),
    }
    assert_eq!(tool_map.get("c1"), Some(&"Bash".to_string()));
}

#[test]
fn normalizes_command_execution_completed_with_nonzero_exit_as_error() {
    let adapter = CodexAdapter;
    let mut tool_map = ToolUseMap::new();
    let raw = json!({
        "type": "item.completed",
        "item": {"id": "c1", "type": "command_execution", "aggregated_output": "boom", "exit_code": 1},
    });
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    match &events[0] {
        CanonicalEvent::ToolResult { is_error, output, .. } => {
            assert!(is_error);
            assert_eq!(output, "boom");
        }
        other => panic!("expected ToolResult, got {other:?}"),
    }
}

#[test]
fn normalizes_agent_message_as_text() {
    let adapter = CodexAdapter;
    let mut tool_map = ToolUseMap::new();
    let raw = json!({"type": "item.completed", "item": {"type": "agent_message", "text": "done"}});
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    assert_eq!(events, vec![CanonicalEvent::Text { role: Role::Assistant, content: "done".to_string() }]);
}

#[test]
fn normalizes_turn_completed_usage() {
    let adapter = CodexAdapter;
    let mut tool_map = ToolUseMap::new();
    let raw = json!({"type": "turn.completed", "usage": {"input_tokens": 10, "output_tokens": 3, "cached_input_tokens": 2}});
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    assert_eq!(events, vec![CanonicalEvent::Usage { input_tokens: 10, output_tokens: 3, cache_read_tokens: 2 }]);
}

#[test]
fn normalizes_thread_started_into_context_init() {
    let adapter = CodexAdapter;
    let mut tool_map = ToolUseMap::new();
    let raw = json!({"type": "thread.started", "thread_id": "thread-7"});
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    assert_eq!(events, vec![CanonicalEvent::ContextInit { session_id: "thread-7".to_string(), resumed: false }]);
}

#[test]
fn build_command_resumes_session() {
    let adapter = CodexAdapter;
    let req = LaunchRequest {
        model: "gpt-5.2-codex".to_string(),
        session_id: Some("sess-1".to_string()),
        context: Some("go".to_string()),
        root_dir: "/root".to_string(),
        cwd: Some("/root/proj".to_string()),
        allowed_tools: None,
        images: Vec::new(),
    };
    let built = adapter.build_command(&req).unwrap();
    assert!(built.argv.windows(2).any(|w| w == ["resume", "sess-1"]));
    assert_eq!(built.stdin.as_deref(), Some("go"));
}

#[test]
fn input_tokens_from_event_only_counts_turn_completed() {
    let adapter = CodexAdapter;
    let other = json!({"type": "item.started"});
    assert_eq!(adapter.input_tokens_from_event(&other), None);

    let turn = json!({"type": "turn.completed", "usage": {"input_tokens": 7}});
    assert_eq!(adapter.input_tokens_from_event(&turn), Some(7));
}
