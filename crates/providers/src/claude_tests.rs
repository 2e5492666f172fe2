// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn normalizes_assistant_text_block() {
    let adapter = ClaudeAdapter;
    let mut tool_map = ToolUseMap::new();
    let raw = json!({
        "type": "assistant",
        "message": {"content": [{"type": "text", "text": "hello"}]},
    });
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    assert_eq!(events, vec![CanonicalEvent::Text { role: Role::Assistant, content: "hello".to_string() }]);
}

#[test]
fn normalizes_system_init_into_context_init() {
    let adapter = ClaudeAdapter;
    let mut tool_map = ToolUseMap::new();
    let raw = json!({"type": "system", "subtype": "init", "session_id": "sess-42"});
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    assert_eq!(events, vec![CanonicalEvent::ContextInit { session_id: "sess-42".to_string(), resumed: false }]);
}

#[test]
fn ignores_system_events_of_other_subtypes() {
    let adapter = ClaudeAdapter;
    let mut tool_map = ToolUseMap::new();
    let raw = json!({"type": "system", "subtype": "other", "session_id": "sess-42"});
    assert!(adapter.normalize_event(&raw, "orin", &mut tool_map).is_empty());
}

#[test]
fn normalizes_tool_use_and_records_tool_map() {
    let adapter = ClaudeAdapter;
    let mut tool_map = ToolUseMap::new();
    let raw = json!({
        "type": "assistant",
        "message": {"content": [{"type": "tool_use", "id": "t1", "name": "Bash", "input": {"command": "ls"}}]},
    });
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], CanonicalEvent::ToolCall { tool_use_id, tool_name, .. } if tool_use_id == "t1" && tool_name == "Bash"));
    assert_eq!(tool_map.get("t1"), Some(&"Bash".to_string()));
}

#[test]
fn normalizes_tool_result_using_prior_tool_map_entry() {
    let adapter = ClaudeAdapter;
    let mut tool_map = ToolUseMap::new();
    tool_map.insert("t1".to_string(), "Bash".to_string());
    let raw = json!({
        "type": "user",
        "message": {"content": [{"type": "tool_result", "tool_use_id": "t1", "content": "done", "is_error": false}]},
    });
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    assert_eq!(events.len(), 1);
    match &events[0] {
        CanonicalEvent::ToolResult { tool_name, output, is_error, .. } => {
            assert_eq!(tool_name.as_deref(), Some("Bash"));
            assert_eq!(output, "done");
            assert!(!is_error);
        }
        other => panic!("expected ToolResult, got {other:?}"),
    }
}

#[test]
fn read_tool_result_collapses_to_line_count() {
    let adapter = ClaudeAdapter;
    let mut tool_map = ToolUseMap::new();
    tool_map.insert("t1".to_string(), "Read".to_string());
    let raw = json!({
        "type": "user",
        "message": {"content": [{"type": "tool_result", "tool_use_id": "t1", "content": "a\nb\nc", "is_error": false}]},
    });
    let events = adapter.normalize_event(&raw, "orin", &mut tool_map);
    match &events[0] {
        CanonicalEvent::ToolResult { output, .. } => assert_eq!(output, "(2 lines)"),
        other => panic!("expected ToolResult, got {other:?}"),
    }
}

#[test]
fn build_command_includes_model_and_resume() {
    let adapter = ClaudeAdapter;
    let req = LaunchRequest {
        model: "claude-sonnet-4-5".to_string(),
        session_id: Some("sess-1".to_string()),
        context: Some("do the thing".to_string()),
        root_dir: "/root".to_string(),
        cwd: Some("/root/proj".to_string()),
        allowed_tools: None,
        images: Vec::new(),
    };
    let built = adapter.build_command(&req).unwrap();
    assert!(built.argv.contains(&"--resume".to_string()));
    assert!(built.argv.contains(&"sess-1".to_string()));
    assert!(built.argv.contains(&"--add-dir".to_string()));
    assert_eq!(built.stdin.as_deref(), Some("do the thing"));
}

#[test]
fn build_command_with_images_emits_stream_json_stdin() {
    let adapter = ClaudeAdapter;
    let req = LaunchRequest {
        model: "claude-sonnet-4-5".to_string(),
        session_id: None,
        context: Some("look at this".to_string()),
        root_dir: "/root".to_string(),
        cwd: None,
        allowed_tools: None,
        images: vec!["shot.png".to_string()],
    };
    let built = adapter.build_command(&req).unwrap();
    assert!(built.argv.contains(&"--input-format".to_string()));
    let stdin = built.stdin.unwrap();
    assert!(stdin.contains("\"type\":\"user\""));
    assert!(stdin.contains("look at this"));
}

#[test]
fn parse_usage_reads_tail_of_trace_file() {
    let adapter = ClaudeAdapter;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    std::fs::write(
        &path,
        concat!(
            r#"{"type":"assistant","message":{"model":"claude-sonnet-4-5","usage":{"input_tokens":10,"output_tokens":5,"cache_read_input_tokens":2,"cache_creation_input_tokens":1}}}"#,
            "\n"
        ),
    )
    .unwrap();

    let usage = adapter.parse_usage(&path).unwrap();
    assert_eq!(usage.input_tokens, 13);
    assert_eq!(usage.output_tokens, 5);
    assert_eq!(usage.cache_read_tokens, 2);
    assert_eq!(usage.model, "claude-sonnet-4-5");
}

#[test]
fn input_tokens_from_event_sums_usage_fields() {
    let adapter = ClaudeAdapter;
    let raw = json!({"message": {"usage": {"input_tokens": 4, "cache_read_input_tokens": 1, "cache_creation_input_tokens": 1}}});
    assert_eq!(adapter.input_tokens_from_event(&raw), Some(6));
}
