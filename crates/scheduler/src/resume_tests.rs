// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use space_core::{AgentKind, ProviderName, SequentialIdGen, SpawnStatus};
use space_engine::persistence;
use space_pubsub::Registry;
use space_router::Router;
use space_store::Store;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;

static PATH_LOCK: Mutex<()> = Mutex::new(());

fn ledger() -> Ledger<SequentialIdGen> {
    Ledger::new(Store::open_in_memory().unwrap(), SequentialIdGen::new("spawn"))
}

fn router(dir: &std::path::Path) -> Router {
    Router::new(dir.join("router_state.json"), 10.0, HashMap::new())
}

fn fake_claude_path(dir: &std::path::Path, trace: &str) -> String {
    let script = dir.join("claude");
    std::fs::write(&script, format!("#!/bin/sh\ncat <<'EOF'\n{trace}\nEOF\n")).unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();
    format!("{}:{}", dir.display(), std::env::var("PATH").unwrap_or_default())
}

#[test]
fn a_crashed_resumable_spawn_is_relaunched_and_resume_count_bumps() {
    let _guard = PATH_LOCK.lock();
    let ledger = ledger();
    let ids = SequentialIdGen::new("spawn");
    let agent = ledger.agents().create("atlas", AgentKind::Ai, Some("claude-sonnet-4-5".to_string()), None).unwrap();

    let spawn = persistence::get_or_create(&ledger, &ids, &agent.id, None, ProviderName::Claude, space_core::SpawnMode::Sovereign).unwrap();
    persistence::set_session_id(ledger.store(), &spawn.id, "sess-prior").unwrap();
    persistence::finalize(ledger.store(), &spawn.id, None, Some("reaped: vendor exited"), None).unwrap();

    let state_dir = tempfile::tempdir().unwrap();
    let bin_dir = tempfile::tempdir().unwrap();
    let trace = "{\"type\":\"system\",\"subtype\":\"init\",\"session_id\":\"sess-prior\"}\n\
                 {\"type\":\"assistant\",\"message\":{\"content\":[{\"type\":\"text\",\"text\":\"back\"}]}}";
    let saved_path = std::env::var("PATH").unwrap_or_default();
    std::env::set_var("PATH", fake_claude_path(bin_dir.path(), trace));

    let bus = Registry::default();
    let r = router(state_dir.path());
    let env = LaunchEnv {
        state_root: state_dir.path(),
        identities_root: &state_dir.path().join("identities"),
        skills_dir: None,
        bus: &bus,
        router: &r,
    };

    let resumed = resume_step(&ledger, &ids, &env, 3, &[]);
    std::env::set_var("PATH", saved_path);
    let resumed = resumed.unwrap();

    assert_eq!(resumed.len(), 1);
    assert_eq!(resumed[0].status, SpawnStatus::Done);
    let reloaded = ledger.spawns().get(spawn.id.as_str()).unwrap();
    assert_eq!(reloaded.resume_count, 1);
}

#[test]
fn zero_slots_resumes_nothing() {
    let ledger = ledger();
    let ids = SequentialIdGen::new("spawn");
    let state_dir = tempfile::tempdir().unwrap();
    let bus = Registry::default();
    let r = router(state_dir.path());
    let env = LaunchEnv {
        state_root: state_dir.path(),
        identities_root: &state_dir.path().join("identities"),
        skills_dir: None,
        bus: &bus,
        router: &r,
    };

    let resumed = resume_step(&ledger, &ids, &env, 0, &[]).unwrap();
    assert!(resumed.is_empty());
}

#[test]
fn an_agent_already_active_is_not_resumed_again() {
    let ledger = ledger();
    let ids = SequentialIdGen::new("spawn");
    let agent = ledger.agents().create("atlas", AgentKind::Ai, Some("claude-sonnet-4-5".to_string()), None).unwrap();

    let crashed = persistence::get_or_create(&ledger, &ids, &agent.id, None, ProviderName::Claude, space_core::SpawnMode::Sovereign).unwrap();
    persistence::set_session_id(ledger.store(), &crashed.id, "sess-a").unwrap();
    persistence::finalize(ledger.store(), &crashed.id, None, Some("reaped: vendor exited"), None).unwrap();

    let active = persistence::get_or_create(&ledger, &ids, &agent.id, None, ProviderName::Claude, space_core::SpawnMode::Directed).unwrap();
    let active = ledger.spawns().get(active.id.as_str()).unwrap();

    let state_dir = tempfile::tempdir().unwrap();
    let bus = Registry::default();
    let r = router(state_dir.path());
    let env = LaunchEnv {
        state_root: state_dir.path(),
        identities_root: &state_dir.path().join("identities"),
        skills_dir: None,
        bus: &bus,
        router: &r,
    };

    let resumed = resume_step(&ledger, &ids, &env, 3, &[active]).unwrap();
    assert!(resumed.is_empty());
}
