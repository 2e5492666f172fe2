// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use space_core::{AgentKind, SequentialIdGen};
use space_store::Store;

fn ledger() -> Ledger<SequentialIdGen> {
    Ledger::new(Store::open_in_memory().unwrap(), SequentialIdGen::new("spawn"))
}

fn seed_agent(ledger: &Ledger<SequentialIdGen>, handle: &str) -> AgentId {
    ledger
        .agents()
        .create(handle, AgentKind::Ai, Some("sonnet".to_string()), None)
        .unwrap()
        .id
}

#[test]
fn get_or_create_inserts_a_fresh_sovereign_spawn() {
    let ledger = ledger();
    let agent_id = seed_agent(&ledger, "atlas");

    let spawn = get_or_create(&ledger, &SequentialIdGen::new("spawn"), &agent_id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();

    assert_eq!(spawn.agent_id, agent_id);
    assert!(spawn.is_active());
    assert!(spawn.is_sovereign());
}

#[test]
fn get_or_create_returns_existing_active_sovereign_spawn_on_conflict() {
    let ledger = ledger();
    let agent_id = seed_agent(&ledger, "atlas");
    let ids = SequentialIdGen::new("spawn");

    let first = get_or_create(&ledger, &ids, &agent_id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();
    let second = get_or_create(&ledger, &ids, &agent_id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();

    assert_eq!(first.id, second.id);
}

#[test]
fn get_or_create_allows_directed_spawns_alongside_an_active_sovereign_one() {
    let ledger = ledger();
    let agent_id = seed_agent(&ledger, "atlas");
    let ids = SequentialIdGen::new("spawn");

    let sovereign = get_or_create(&ledger, &ids, &agent_id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();
    let directed =
        get_or_create(&ledger, &ids, &agent_id, Some(&sovereign.id), ProviderName::Claude, SpawnMode::Directed).unwrap();

    assert_ne!(sovereign.id, directed.id);
    assert!(directed.is_active());
    assert!(!directed.is_sovereign());
}

#[test]
fn set_pid_atomic_claims_an_unset_pid_once() {
    let ledger = ledger();
    let agent_id = seed_agent(&ledger, "atlas");
    let ids = SequentialIdGen::new("spawn");
    let spawn = get_or_create(&ledger, &ids, &agent_id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();

    assert!(set_pid_atomic(ledger.store(), &spawn.id, 4242).unwrap());
    assert!(!set_pid_atomic(ledger.store(), &spawn.id, 5353).unwrap());

    let reloaded = ledger.spawns().get(spawn.id.as_str()).unwrap();
    assert_eq!(reloaded.pid, Some(4242));
}

#[test]
fn finalize_only_succeeds_while_still_active() {
    let ledger = ledger();
    let agent_id = seed_agent(&ledger, "atlas");
    let ids = SequentialIdGen::new("spawn");
    let spawn = get_or_create(&ledger, &ids, &agent_id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();

    assert!(finalize(ledger.store(), &spawn.id, Some("did a thing"), None, Some("deadbeef")).unwrap());
    assert!(!finalize(ledger.store(), &spawn.id, Some("again"), None, None).unwrap());

    let reloaded = ledger.spawns().get(spawn.id.as_str()).unwrap();
    assert!(!reloaded.is_active());
    assert_eq!(reloaded.summary.as_deref(), Some("did a thing"));
}

#[test]
fn set_session_id_does_not_overwrite_an_existing_one() {
    let ledger = ledger();
    let agent_id = seed_agent(&ledger, "atlas");
    let ids = SequentialIdGen::new("spawn");
    let spawn = get_or_create(&ledger, &ids, &agent_id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();

    set_session_id(ledger.store(), &spawn.id, "sess-1").unwrap();
    set_session_id(ledger.store(), &spawn.id, "sess-2").unwrap();

    let reloaded = ledger.spawns().get(spawn.id.as_str()).unwrap();
    assert_eq!(reloaded.session_id.as_deref(), Some("sess-1"));
}
