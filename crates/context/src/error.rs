// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use space_core::{Classified, Kind};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("ledger lookup failed while building context: {0}")]
    Ledger(#[from] space_ledger::LedgerError),
    #[error("invalid skill name: {0}")]
    InvalidSkillName(String),
    #[error("unknown skill: {0}")]
    UnknownSkill(String),
    #[error("failed to read skill {name}: {source}")]
    SkillRead { name: String, source: std::io::Error },
}

impl Classified for ContextError {
    fn kind(&self) -> Kind {
        match self {
            ContextError::Ledger(e) => e.kind(),
            ContextError::InvalidSkillName(_) => Kind::Validation,
            ContextError::UnknownSkill(_) => Kind::NotFound,
            ContextError::SkillRead { .. } => Kind::State,
        }
    }
}
