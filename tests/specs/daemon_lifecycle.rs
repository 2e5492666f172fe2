//! Daemon lifecycle specs: start/stop/status/restart through the `space`
//! CLI against a scratch state root.

use crate::prelude::cli;
use std::time::{Duration, Instant};

fn wait_until(mut pred: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn status_reports_stopped_before_any_start() {
    let dir = tempfile::tempdir().unwrap();
    let (ok, stdout, _) = cli(dir.path()).args(&["daemon", "status"]).output();
    assert!(ok);
    assert_eq!(stdout.trim(), "stopped");
}

#[test]
fn start_then_status_reports_running_then_stop_reports_stopped() {
    let dir = tempfile::tempdir().unwrap();

    let (ok, stdout, _) = cli(dir.path()).args(&["daemon", "start"]).output();
    assert!(ok);
    assert!(stdout.trim().starts_with("started"), "unexpected: {stdout}");

    let pid_path = dir.path().join("daemon.pid");
    assert!(wait_until(|| pid_path.exists(), Duration::from_secs(2)), "pid file never appeared");

    let (ok, stdout, _) = cli(dir.path()).args(&["daemon", "status"]).output();
    assert!(ok);
    assert!(stdout.trim().starts_with("running"), "unexpected: {stdout}");

    let (ok, stdout, _) = cli(dir.path()).args(&["daemon", "stop"]).output();
    assert!(ok);
    assert_eq!(stdout.trim(), "stopped");

    let (ok, stdout, _) = cli(dir.path()).args(&["daemon", "status"]).output();
    assert!(ok);
    assert_eq!(stdout.trim(), "stopped");
}

#[test]
fn start_is_idempotent_when_already_running() {
    let dir = tempfile::tempdir().unwrap();

    cli(dir.path()).args(&["daemon", "start"]).output();
    let pid_path = dir.path().join("daemon.pid");
    wait_until(|| pid_path.exists(), Duration::from_secs(2));

    let (ok, stdout, _) = cli(dir.path()).args(&["daemon", "start"]).output();
    assert!(ok);
    assert!(stdout.trim().starts_with("already running"), "unexpected: {stdout}");

    cli(dir.path()).args(&["daemon", "stop"]).output();
}

#[test]
fn status_json_flag_emits_structured_output() {
    let dir = tempfile::tempdir().unwrap();
    let (ok, stdout, _) = cli(dir.path()).args(&["daemon", "status", "--json"]).output();
    assert!(ok);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(parsed["running"], serde_json::json!(false));
}
