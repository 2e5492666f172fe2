// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("daemon error: {0}")]
    Daemon(#[from] space_daemon::DaemonError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),
}
