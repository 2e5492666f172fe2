// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use space_core::Kind;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] space_store::StoreError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("duplicate {table} content, existing id {existing}")]
    Duplicate { table: &'static str, existing: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid state transition: {0}")]
    State(String),
}

impl space_core::Classified for LedgerError {
    fn kind(&self) -> Kind {
        match self {
            LedgerError::Store(e) => e.kind(),
            LedgerError::Validation(_) => Kind::Validation,
            LedgerError::Duplicate { .. } | LedgerError::Conflict(_) => Kind::Conflict,
            LedgerError::State(_) => Kind::State,
        }
    }
}
