// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use space_core::{Classified, Kind};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Ledger(#[from] space_ledger::LedgerError),

    #[error(transparent)]
    Store(#[from] space_store::StoreError),

    #[error(transparent)]
    Provider(#[from] space_providers::ProviderError),

    #[error(transparent)]
    Trace(#[from] space_trace::TraceError),

    #[error(transparent)]
    Context(#[from] space_context::ContextError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("signal error: {0}")]
    Signal(#[from] nix::Error),

    #[error("spawn {0} is already active with a live pid, refusing to relaunch")]
    AlreadyActive(String),

    #[error("spawn {0} is done with no session id, cannot be resumed")]
    NotResumable(String),

    #[error("provider {0} is in cooldown until {1}")]
    ProviderCooldown(String, chrono::DateTime<chrono::Utc>),

    /// TOCTOU race: the row `get_or_create` just inserted (or the existing
    /// active-sovereign row it should have returned instead) was gone by the
    /// time the follow-up `SELECT` ran. Should be unreachable under the
    /// partial unique index; surfaced rather than silently retried.
    #[error("TOCTOU race: spawn disappeared for agent {0}")]
    Toteow(String),

    /// `set_pid_atomic` found the row's `pid` already set — another launcher
    /// in this process beat us to it.
    #[error("lost the pid-assignment race for spawn {0}")]
    PidRace(String),
}

impl Classified for EngineError {
    fn kind(&self) -> Kind {
        match self {
            EngineError::Ledger(e) => e.kind(),
            EngineError::Store(e) => e.kind(),
            EngineError::Provider(_) | EngineError::Io(_) | EngineError::Signal(_) | EngineError::Trace(_) => Kind::State,
            EngineError::Context(e) => e.kind(),
            EngineError::AlreadyActive(_) | EngineError::NotResumable(_) => Kind::Conflict,
            EngineError::ProviderCooldown(..) => Kind::Conflict,
            EngineError::Toteow(_) | EngineError::PidRace(_) => Kind::Conflict,
        }
    }
}
