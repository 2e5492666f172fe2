// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn get_on_missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateFile::new(dir.path().join("state.yaml"));
    assert_eq!(state.get("agent_failures").unwrap(), None);
}

#[test]
fn set_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateFile::new(dir.path().join("state.yaml"));
    state.set("last_skip", json!("2026-07-27T00:00:00Z")).unwrap();
    assert_eq!(state.get("last_skip").unwrap(), Some(json!("2026-07-27T00:00:00Z")));
}

#[test]
fn delete_removes_key_without_touching_others() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateFile::new(dir.path().join("state.yaml"));
    state.set("a", json!(1)).unwrap();
    state.set("b", json!(2)).unwrap();
    state.delete("a").unwrap();
    assert_eq!(state.get("a").unwrap(), None);
    assert_eq!(state.get("b").unwrap(), Some(json!(2)));
}

#[test]
fn clear_removes_the_backing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.yaml");
    let state = StateFile::new(&path);
    state.set("a", json!(1)).unwrap();
    assert!(path.exists());
    state.clear().unwrap();
    assert!(!path.exists());
    assert_eq!(state.get("a").unwrap(), None);
}

#[test]
fn corrupt_file_is_treated_as_empty_rather_than_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.yaml");
    std::fs::write(&path, "not: [valid, yaml: broken").unwrap();
    let state = StateFile::new(&path);
    assert_eq!(state.get("anything").unwrap(), None);
}
