// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::persistence;
use parking_lot::Mutex;
use space_core::{AgentKind, SequentialIdGen, SpawnMode, SpawnStatus};
use space_pubsub::Registry;
use space_router::Router;
use space_store::Store;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;

/// `Command::new("claude")` resolves through `PATH`, which these tests
/// mutate process-wide — serialize them against each other and against any
/// other test in this binary that forks a program by bare name.
static PATH_LOCK: Mutex<()> = Mutex::new(());

fn ledger() -> Ledger<SequentialIdGen> {
    Ledger::new(Store::open_in_memory().unwrap(), SequentialIdGen::new("spawn"))
}

fn seed_agent(ledger: &Ledger<SequentialIdGen>) -> Agent {
    ledger.agents().create("atlas", AgentKind::Ai, Some("claude-sonnet-4-5".to_string()), None).unwrap()
}

fn router(dir: &std::path::Path) -> Router {
    Router::new(dir.join("router_state.json"), 10.0, HashMap::new())
}

/// Writes a stand-in `claude` executable into a fresh directory and returns
/// it prepended onto the real `PATH`, so `Command::new("claude")` resolves
/// to a script that emits a canned trace instead of the real vendor CLI.
fn fake_claude_path(dir: &std::path::Path, trace: &str) -> String {
    let script = dir.join("claude");
    std::fs::write(&script, format!("#!/bin/sh\ncat <<'EOF'\n{trace}\nEOF\n")).unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();
    format!("{}:{}", dir.display(), std::env::var("PATH").unwrap_or_default())
}

fn base_request(agent_id: AgentId) -> LaunchRequest {
    LaunchRequest {
        agent_id,
        instruction: None,
        spawn: None,
        cwd: None,
        timeout: Duration::from_secs(5),
        model_override: None,
        mode: SpawnMode::Sovereign,
        caller_spawn_id: None,
        skills: Vec::new(),
        focus_project: None,
        allowed_tools: None,
        images: Vec::new(),
    }
}

#[test]
fn fresh_launch_forks_the_vendor_cli_and_completes() {
    let _guard = PATH_LOCK.lock();
    let ledger = ledger();
    let ids = SequentialIdGen::new("spawn");
    let agent = seed_agent(&ledger);

    let state_dir = tempfile::tempdir().unwrap();
    let bin_dir = tempfile::tempdir().unwrap();
    let trace = "{\"type\":\"system\",\"subtype\":\"init\",\"session_id\":\"sess-xyz\"}\n\
                 {\"type\":\"assistant\",\"message\":{\"content\":[{\"type\":\"text\",\"text\":\"done\"}]}}";
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

    let result = launch(&ledger, &ids, &env, base_request(agent.id.clone()));
    std::env::set_var("PATH", saved_path);

    let spawn = result.unwrap();
    assert_eq!(spawn.status, SpawnStatus::Done);
    assert_eq!(spawn.session_id.as_deref(), Some("sess-xyz"));
    assert_eq!(spawn.summary.as_deref(), Some("done"));
}

#[test]
fn relaunching_an_active_spawn_with_a_live_pid_is_rejected() {
    let ledger = ledger();
    let ids = SequentialIdGen::new("spawn");
    let agent = seed_agent(&ledger);
    let spawn = persistence::get_or_create(&ledger, &ids, &agent.id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();

    let child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id() as i32;
    assert!(persistence::set_pid_atomic(ledger.store(), &spawn.id, pid).unwrap());
    let spawn = ledger.spawns().get(spawn.id.as_str()).unwrap();

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

    let mut req = base_request(agent.id.clone());
    req.spawn = Some(spawn);
    let err = launch(&ledger, &ids, &env, req).unwrap_err();
    assert!(matches!(err, EngineError::AlreadyActive(_)));

    let _ = kill(Pid::from_raw(pid), Signal::SIGKILL);
}

#[test]
fn done_spawn_without_a_session_id_cannot_be_resumed() {
    let ledger = ledger();
    let ids = SequentialIdGen::new("spawn");
    let agent = seed_agent(&ledger);
    let spawn = persistence::get_or_create(&ledger, &ids, &agent.id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();
    persistence::finalize(ledger.store(), &spawn.id, Some("did nothing"), None, None).unwrap();
    let spawn = ledger.spawns().get(spawn.id.as_str()).unwrap();
    assert!(spawn.session_id.is_none());

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

    let mut req = base_request(agent.id.clone());
    req.spawn = Some(spawn);
    let err = launch(&ledger, &ids, &env, req).unwrap_err();
    assert!(matches!(err, EngineError::NotResumable(_)));
}

#[test]
fn cooldown_blocks_the_launch_before_forking_anything() {
    let ledger = ledger();
    let ids = SequentialIdGen::new("spawn");
    let agent = seed_agent(&ledger);

    let state_dir = tempfile::tempdir().unwrap();
    let bus = Registry::default();
    let r = router(state_dir.path());
    r.block_provider_for(ProviderName::Claude, 60);
    let env = LaunchEnv {
        state_root: state_dir.path(),
        identities_root: &state_dir.path().join("identities"),
        skills_dir: None,
        bus: &bus,
        router: &r,
    };

    let err = launch(&ledger, &ids, &env, base_request(agent.id.clone())).unwrap_err();
    assert!(matches!(err, EngineError::ProviderCooldown(..)));
}
