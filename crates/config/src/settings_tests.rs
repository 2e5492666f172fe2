// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_file_loads_as_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));
    let config = store.load().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.swarm.concurrency, 1);
    assert_eq!(config.swarm.capacity_threshold, 10.0);
}

#[test]
fn save_then_load_round_trips_and_hits_the_mtime_cache() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.yaml"));

    let mut config = Config::default();
    config.swarm.enabled = true;
    config.swarm.concurrency = 3;
    config.swarm.weights = Some(HashMap::from([("atlas".to_string(), 2.0)]));
    store.save(&config).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded, config);

    // second load with no intervening write should hit the cache and return
    // the same value without touching disk again.
    let loaded_again = store.load().unwrap();
    assert_eq!(loaded_again, config);
}

#[test]
fn partial_yaml_fills_remaining_fields_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "swarm:\n  enabled: true\n").unwrap();

    let store = ConfigStore::new(path);
    let config = store.load().unwrap();
    assert!(config.swarm.enabled);
    assert_eq!(config.swarm.concurrency, 1);
    assert_eq!(config.email.from_addr, "hello@spaceos.sh");
}
