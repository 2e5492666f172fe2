// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("could not determine state root")]
    NoStateRoot,

    #[error("another daemon already holds the lock")]
    AlreadyRunning,

    #[error("config error: {0}")]
    Config(#[from] space_config::ConfigError),

    #[error("store error: {0}")]
    Store(#[from] space_store::StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] space_ledger::LedgerError),

    #[error("engine error: {0}")]
    Engine(#[from] space_engine::EngineError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] space_scheduler::SchedulerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
