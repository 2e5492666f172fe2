// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::time::Duration;

/// Override for locating the `spaced` binary, otherwise resolved from
/// the current executable's directory or a debug-build heuristic.
pub fn daemon_binary() -> Option<String> {
    std::env::var("SPACE_DAEMON_BINARY").ok()
}

pub fn cargo_manifest_dir() -> Option<String> {
    std::env::var("CARGO_MANIFEST_DIR").ok()
}

/// How long `space daemon stop`/`restart` waits for the supervisor to exit
/// before sending SIGKILL.
pub fn timeout_exit_ms() -> Option<Duration> {
    std::env::var("SPACE_TIMEOUT_EXIT_MS").ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}
