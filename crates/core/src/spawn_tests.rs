// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;

fn spawn(mode: SpawnMode, status: SpawnStatus) -> Spawn {
    Spawn {
        id: SpawnId::new("s-1"),
        agent_id: AgentId::new("a-1"),
        caller_spawn_id: None,
        provider: ProviderName::Claude,
        mode,
        status,
        pid: None,
        session_id: None,
        summary: None,
        error: None,
        trace_hash: None,
        resume_count: 0,
        created_at: Utc::now(),
        last_active_at: None,
    }
}

#[test]
fn sovereign_active_flags() {
    let s = spawn(SpawnMode::Sovereign, SpawnStatus::Active);
    assert!(s.is_active());
    assert!(s.is_sovereign());
}

#[test]
fn directed_done_flags() {
    let s = spawn(SpawnMode::Directed, SpawnStatus::Done);
    assert!(!s.is_active());
    assert!(!s.is_sovereign());
}

#[test]
fn resumable_requires_done_and_nonempty_session() {
    let mut s = spawn(SpawnMode::Sovereign, SpawnStatus::Done);
    assert!(!s.is_resumable());
    s.session_id = Some(String::new());
    assert!(!s.is_resumable());
    s.session_id = Some("sess-1".into());
    assert!(s.is_resumable());

    s.status = SpawnStatus::Active;
    assert!(!s.is_resumable());
}

#[test]
fn recognized_crash_matches_table_prefixes() {
    let mut s = spawn(SpawnMode::Sovereign, SpawnStatus::Done);
    s.error = Some("reaped".into());
    assert!(s.is_recognized_crash());
    s.error = Some("quota exhausted (resets 2h)".into());
    assert!(!s.is_recognized_crash());
}

#[test]
fn terminal_state_requires_summary_or_error() {
    let mut s = spawn(SpawnMode::Sovereign, SpawnStatus::Done);
    assert!(!s.has_valid_terminal_state());
    s.summary = Some("did the thing".into());
    assert!(s.has_valid_terminal_state());
    s.summary = None;
    s.error = Some("timeout".into());
    assert!(s.has_valid_terminal_state());
}

#[test]
fn provider_display() {
    assert_eq!(ProviderName::Codex.to_string(), "codex");
}
