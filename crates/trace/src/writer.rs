// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL writer for a spawn's trace file.

use crate::error::TraceError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct Writer {
    path: PathBuf,
}

impl Writer {
    /// Open (creating parent directories and the file as needed) for append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TraceError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single already-serialized JSON line (no embedded newline).
    pub fn append_line(&self, json_line: &str) -> Result<(), TraceError> {
        let mut f = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(f, "{json_line}")?;
        Ok(())
    }

    /// Serialize and append a canonical event.
    pub fn append_event(&self, event: &space_core::CanonicalEvent) -> Result<(), TraceError> {
        let line = serde_json::to_string(event)?;
        self.append_line(&line)
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
