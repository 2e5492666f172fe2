// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access and on-disk layout for the
//! daemon crate. Every path the supervisor or worker touches is resolved
//! from one root, `SPACE_DOT_SPACE`, so tests can point a whole daemon at a
//! tempdir with a single override.

use std::path::PathBuf;
use std::time::Duration;

use crate::DaemonError;

/// Resolve the state root: `SPACE_DOT_SPACE` > `~/.space`.
pub fn state_root() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("SPACE_DOT_SPACE") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").map_err(|_| DaemonError::NoStateRoot)?;
    Ok(PathBuf::from(home).join(".space"))
}

/// Tick interval override, mostly for tests that don't want to wait 2s per
/// tick.
pub fn tick_ms() -> Option<Duration> {
    std::env::var("SPACE_TICK_MS").ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Every path the daemon reads or writes, resolved once at startup against
/// one `state_root`.
#[derive(Debug, Clone)]
pub struct Paths {
    pub state_root: PathBuf,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    pub state_yaml_path: PathBuf,
    pub router_state_path: PathBuf,
    pub lock_path: PathBuf,
    pub pid_path: PathBuf,
    pub log_path: PathBuf,
    pub identities_root: PathBuf,
}

impl Paths {
    pub fn resolve() -> Result<Self, DaemonError> {
        Ok(Self::under(state_root()?))
    }

    pub fn under(state_root: PathBuf) -> Self {
        Self {
            db_path: state_root.join("space.db"),
            config_path: state_root.join("config.yaml"),
            state_yaml_path: state_root.join("state.yaml"),
            router_state_path: state_root.join("router_state.json"),
            lock_path: state_root.join("daemon.lock"),
            pid_path: state_root.join("daemon.pid"),
            log_path: state_root.join("logs").join("daemon.log"),
            identities_root: state_root.join("agents"),
            state_root,
        }
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.state_root)?;
        std::fs::create_dir_all(&self.identities_root)?;
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
