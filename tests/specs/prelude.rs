//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

/// Returns the path to a binary, falling back to resolving relative to the
/// test binary itself when `CARGO_MANIFEST_DIR` is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn space_binary() -> PathBuf {
    binary_path("space")
}

pub fn spaced_binary() -> PathBuf {
    binary_path("spaced")
}

/// A `space` invocation scoped to its own state root so concurrent tests
/// never see each other's daemon.
pub struct CliBuilder {
    args: Vec<String>,
    state_root: PathBuf,
}

pub fn cli(state_root: impl Into<PathBuf>) -> CliBuilder {
    CliBuilder { args: Vec::new(), state_root: state_root.into() }
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(space_binary());
        cmd.args(&self.args);
        cmd.env("SPACE_DOT_SPACE", &self.state_root);
        cmd.env("SPACE_DAEMON_BINARY", spaced_binary());
        cmd
    }

    pub fn output(self) -> (bool, String, String) {
        let output = self.command().output().expect("command should run");
        (output.status.success(), String::from_utf8_lossy(&output.stdout).into_owned(), String::from_utf8_lossy(&output.stderr).into_owned())
    }
}
