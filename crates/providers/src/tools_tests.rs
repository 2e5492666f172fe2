// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn disallowed_for_none_is_just_always_disallowed() {
    let deny = disallowed_for(ProviderName::Claude, None);
    assert_eq!(deny, vec!["NotebookEdit", "NotebookRead", "Task", "TodoWrite"]);
}

#[test]
fn disallowed_for_shell_only_excludes_everything_else() {
    let deny = disallowed_for(ProviderName::Claude, Some(&[Capability::Shell]));
    assert!(deny.contains(&"Write".to_string()));
    assert!(!deny.contains(&"Bash".to_string()));
}

#[test]
fn codex_has_no_always_disallowed_tools() {
    assert!(disallowed_for(ProviderName::Codex, None).is_empty());
}

#[test]
fn allowed_for_none_is_every_capability() {
    let allowed = allowed_for(ProviderName::Gemini, None);
    assert!(allowed.contains(&"run_shell_command".to_string()));
    assert!(allowed.contains(&"google_web_search".to_string()));
}

#[test]
fn normalize_tool_name_maps_gemini_shell_to_claude_bash() {
    assert_eq!(normalize_tool_name(ProviderName::Gemini, "run_shell_command"), "Bash");
}

#[test]
fn normalize_tool_name_passes_through_unknown_names() {
    assert_eq!(normalize_tool_name(ProviderName::Gemini, "mystery_tool"), "mystery_tool");
}

#[test]
fn claude_normalize_is_identity() {
    assert_eq!(normalize_tool_name(ProviderName::Claude, "Bash"), "Bash");
}
