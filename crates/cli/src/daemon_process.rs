// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starting, stopping, and polling the `spaced` supervisor process.

use crate::error::CliError;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const DEFAULT_EXIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Starts `spaced` detached, inheriting neither stdio nor the caller's
/// controlling terminal dependence — the supervisor does its own log setup.
pub fn start_daemon_background() -> Result<std::process::Child, CliError> {
    let path = find_daemon_binary()?;
    Command::new(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CliError::DaemonStartFailed(e.to_string()))
}

/// SIGTERM then poll for exit, escalating to SIGKILL once the timeout
/// elapses. Returns `true` if a running daemon was found and signaled.
pub fn stop_daemon(pid_path: &std::path::Path) -> Result<bool, CliError> {
    let Some(pid) = read_pid(pid_path) else { return Ok(false) };
    if !process_exists(pid) {
        return Ok(false);
    }

    kill_signal("-15", pid);
    let timeout = crate::env::timeout_exit_ms().unwrap_or(DEFAULT_EXIT_TIMEOUT);
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return Ok(true);
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    if process_exists(pid) {
        kill_signal("-9", pid);
    }
    Ok(true)
}

pub fn read_pid(pid_path: &std::path::Path) -> Option<u32> {
    std::fs::read_to_string(pid_path).ok()?.trim().parse().ok()
}

fn kill_signal(signal: &str, pid: u32) -> bool {
    Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn process_exists(pid: u32) -> bool {
    kill_signal("-0", pid)
}

/// `SPACE_DAEMON_BINARY` override, then a sibling of the current
/// executable, then a debug-build heuristic via `CARGO_MANIFEST_DIR`,
/// falling back to a bare `spaced` resolved through `$PATH`.
fn find_daemon_binary() -> Result<PathBuf, CliError> {
    if let Some(path) = crate::env::daemon_binary() {
        return Ok(PathBuf::from(path));
    }

    let current_exe = std::env::current_exe().ok();
    if let Some(ref exe) = current_exe {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("spaced");
            if sibling.exists() {
                return Ok(sibling);
            }
        }
    }

    let is_debug_build = current_exe.as_ref().and_then(|p| p.to_str()).map(|s| s.contains("target/debug")).unwrap_or(false);
    if is_debug_build {
        if let Some(manifest_dir) = crate::env::cargo_manifest_dir() {
            let dev_path = PathBuf::from(manifest_dir).parent().and_then(|p| p.parent()).map(|p| p.join("target/debug/spaced"));
            if let Some(path) = dev_path {
                if path.exists() {
                    return Ok(path);
                }
            }
        }
    }

    Ok(PathBuf::from("spaced"))
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
