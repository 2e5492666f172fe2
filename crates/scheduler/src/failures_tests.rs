// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use space_core::AgentId;

#[test]
fn a_fresh_failure_is_recently_failed() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateFile::new(dir.path().join("state.yaml"));
    let agent = AgentId::new("agent-1");
    let now = chrono::Utc::now();

    record_agent_failure(&state, &agent, "boom", now).unwrap();
    let failed = recently_failed_agents(&state, now).unwrap();
    assert!(failed.contains(&agent));
}

#[test]
fn a_failure_past_the_backoff_window_is_not_recently_failed() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateFile::new(dir.path().join("state.yaml"));
    let agent = AgentId::new("agent-1");
    let recorded_at = chrono::Utc::now() - chrono::Duration::seconds(FAILURE_BACKOFF_SECONDS + 1);

    record_agent_failure(&state, &agent, "boom", recorded_at).unwrap();
    let failed = recently_failed_agents(&state, chrono::Utc::now()).unwrap();
    assert!(!failed.contains(&agent));
}

#[test]
fn clearing_a_failure_removes_it() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateFile::new(dir.path().join("state.yaml"));
    let agent = AgentId::new("agent-1");
    let now = chrono::Utc::now();

    record_agent_failure(&state, &agent, "boom", now).unwrap();
    clear_agent_failure(&state, &agent).unwrap();
    let failed = recently_failed_agents(&state, now).unwrap();
    assert!(!failed.contains(&agent));
}
