// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use space_core::{Classified, Kind};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{table} row '{reference}' not found")]
    NotFound { table: String, reference: String },

    #[error("'{reference}' matches {count} rows in {table}: {samples:?}")]
    AmbiguousReference {
        table: String,
        reference: String,
        count: usize,
        samples: Vec<String>,
    },

    #[error("migration to schema version {version} failed: {source}")]
    Migration {
        version: i64,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid query: {0}")]
    Query(String),
}

impl Classified for StoreError {
    fn kind(&self) -> Kind {
        match self {
            StoreError::NotFound { .. } => Kind::NotFound,
            StoreError::AmbiguousReference { .. } => Kind::AmbiguousReference,
            StoreError::Query(_) => Kind::Validation,
            StoreError::Sqlite(_) | StoreError::Io(_) | StoreError::Migration { .. } => {
                Kind::State
            }
        }
    }
}
