// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use space_core::{Classified, Kind};

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Classified for RouterError {
    fn kind(&self) -> Kind {
        Kind::State
    }
}
