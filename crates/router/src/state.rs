// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable cooldown/notification state, written atomically (tmp file +
//! rename) so a crash mid-write never corrupts it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    /// provider name -> unix epoch seconds the cooldown expires.
    #[serde(default)]
    pub cooldowns: HashMap<String, i64>,
    /// providers whose active cooldown has already been notified about.
    #[serde(default)]
    pub notified: HashSet<String>,
}

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Missing or corrupt state files are treated as empty rather than an
    /// error — a fresh daemon start has no cooldown history to recover.
    pub fn load(&self) -> PersistedState {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding corrupt router state");
                PersistedState::default()
            }),
            Err(_) => PersistedState::default(),
        }
    }

    pub fn save(&self, state: &PersistedState) {
        if let Err(e) = self.try_save(state) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist router state");
        }
    }

    fn try_save(&self, state: &PersistedState) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(state).map_err(std::io::Error::other)?;
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)
    }
}

pub(crate) fn provider_to_key(provider: space_core::ProviderName) -> String {
    provider.to_string()
}

pub(crate) fn key_to_provider(key: &str) -> Option<space_core::ProviderName> {
    match key {
        "claude" => Some(space_core::ProviderName::Claude),
        "codex" => Some(space_core::ProviderName::Codex),
        "gemini" => Some(space_core::ProviderName::Gemini),
        _ => None,
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
