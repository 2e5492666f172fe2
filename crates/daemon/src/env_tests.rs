// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn state_root_honors_space_dot_space_override() {
    let _guard = ENV_LOCK.lock();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("SPACE_DOT_SPACE", dir.path());
    let resolved = state_root().unwrap();
    std::env::remove_var("SPACE_DOT_SPACE");
    assert_eq!(resolved, dir.path());
}

#[test]
fn state_root_falls_back_to_home_dot_space() {
    let _guard = ENV_LOCK.lock();
    std::env::remove_var("SPACE_DOT_SPACE");
    let home = std::env::var("HOME").unwrap();
    let resolved = state_root().unwrap();
    assert_eq!(resolved, std::path::PathBuf::from(home).join(".space"));
}

#[test]
fn paths_under_derive_every_file_from_one_root() {
    let root = std::path::PathBuf::from("/tmp/fake-space-root");
    let paths = Paths::under(root.clone());
    assert_eq!(paths.db_path, root.join("space.db"));
    assert_eq!(paths.config_path, root.join("config.yaml"));
    assert_eq!(paths.lock_path, root.join("daemon.lock"));
    assert_eq!(paths.pid_path, root.join("daemon.pid"));
    assert_eq!(paths.identities_root, root.join("agents"));
    assert_ne!(paths.lock_path, paths.pid_path);
}

#[test]
fn ensure_dirs_creates_state_identities_and_log_parent() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::under(dir.path().join("nested").join("space"));
    paths.ensure_dirs().unwrap();
    assert!(paths.state_root.is_dir());
    assert!(paths.identities_root.is_dir());
    assert!(paths.log_path.parent().unwrap().is_dir());
}

#[test]
fn tick_ms_parses_override_and_defaults_to_none() {
    let _guard = ENV_LOCK.lock();
    std::env::remove_var("SPACE_TICK_MS");
    assert_eq!(tick_ms(), None);
    std::env::set_var("SPACE_TICK_MS", "50");
    assert_eq!(tick_ms(), Some(Duration::from_millis(50)));
    std::env::remove_var("SPACE_TICK_MS");
}
