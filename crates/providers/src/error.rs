// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use space_core::{Classified, Kind};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("usage data unavailable in {path}")]
    UsageUnavailable { path: String },
}

impl Classified for ProviderError {
    fn kind(&self) -> Kind {
        match self {
            ProviderError::UnknownModel(_) => Kind::Validation,
            ProviderError::Io(_) | ProviderError::UsageUnavailable { .. } => Kind::State,
        }
    }
}
