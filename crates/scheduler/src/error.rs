// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Ledger(#[from] space_ledger::LedgerError),
    #[error(transparent)]
    Config(#[from] space_config::ConfigError),
    #[error(transparent)]
    Provider(#[from] space_providers::ProviderError),
    #[error(transparent)]
    Engine(#[from] space_engine::EngineError),
}
