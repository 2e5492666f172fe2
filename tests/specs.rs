//! Behavioral specifications for the `space` CLI and `spaced` daemon.
//!
//! Black-box: invoke the built binaries and assert on stdout/exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/daemon_lifecycle.rs"]
mod daemon_lifecycle;
