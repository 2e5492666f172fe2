// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use space_core::{AgentKind, ProviderName, SequentialIdGen, SpawnMode};
use space_engine::persistence;
use space_store::Store;

fn ledger() -> Ledger<SequentialIdGen> {
    Ledger::new(Store::open_in_memory().unwrap(), SequentialIdGen::new("spawn"))
}

#[test]
fn collect_counts_agents_and_spawns() {
    let ledger = ledger();
    let ids = SequentialIdGen::new("spawn");
    let agent = ledger.agents().create("atlas", AgentKind::Ai, Some("claude-sonnet-4-5".to_string()), None).unwrap();
    persistence::get_or_create(&ledger, &ids, &agent.id, None, ProviderName::Claude, SpawnMode::Sovereign).unwrap();

    let now = Utc::now();
    let stats = collect(&ledger, now).unwrap();
    assert_eq!(stats.agents, 1);
    assert_eq!(stats.total_spawns, 1);
    assert_eq!(stats.spawns_24h, 1);
    assert_eq!(stats.updated_at, now);
}

#[test]
fn write_is_a_no_op_without_a_configured_path() {
    let ledger = ledger();
    write(&ledger, None, Utc::now()).unwrap();
}

#[test]
fn write_creates_parent_dirs_and_writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested").join("stats.json");
    let ledger = ledger();
    write(&ledger, Some(dest.to_str().unwrap()), Utc::now()).unwrap();

    let contents = std::fs::read_to_string(&dest).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["total_spawns"], 0);
}

#[test]
fn shellexpand_home_resolves_tilde_prefix() {
    let home = std::env::var("HOME").unwrap();
    let expanded = shellexpand_home("~/stats.json");
    assert_eq!(expanded, std::path::PathBuf::from(home).join("stats.json"));
}
