// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `state.yaml`: ephemeral runtime state (agent-failure backoff, the
//! last-skip timestamp, batch descriptors) read-modify-written under an
//! exclusive `flock` so the scheduler and any concurrent CLI invocation
//! never race each other.

use fs2::FileExt;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::ConfigError;

pub struct StateFile {
    path: PathBuf,
    lock_path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        self.with_lock(|data| Ok(data.get(key).cloned()))
    }

    pub fn set(&self, key: &str, value: Value) -> Result<(), ConfigError> {
        self.with_lock_mut(|data| {
            data.insert(key.to_string(), value);
            Ok(())
        })
    }

    pub fn delete(&self, key: &str) -> Result<(), ConfigError> {
        self.with_lock_mut(|data| {
            data.remove(key);
            Ok(())
        })
    }

    pub fn clear(&self) -> Result<(), ConfigError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn with_lock<T>(&self, f: impl FnOnce(&HashMap<String, Value>) -> Result<T, ConfigError>) -> Result<T, ConfigError> {
        let _guard = self.lock()?;
        let data = self.load_locked()?;
        f(&data)
    }

    fn with_lock_mut(&self, f: impl FnOnce(&mut HashMap<String, Value>) -> Result<(), ConfigError>) -> Result<(), ConfigError> {
        let _guard = self.lock()?;
        let mut data = self.load_locked()?;
        f(&mut data)?;
        self.save_locked(&data)
    }

    fn lock(&self) -> Result<std::fs::File, ConfigError> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new().create(true).write(true).open(&self.lock_path)?;
        file.lock_exclusive().map_err(ConfigError::Io)?;
        Ok(file)
    }

    /// Missing or corrupt state is treated as empty: a fresh daemon has no
    /// runtime state to recover and a stale write mid-crash should not wedge
    /// every subsequent read.
    fn load_locked(&self) -> Result<HashMap<String, Value>, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_yaml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding corrupt state file");
                HashMap::new()
            })),
            Err(_) => Ok(HashMap::new()),
        }
    }

    fn save_locked(&self, data: &HashMap<String, Value>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(data)?;
        std::fs::write(&self.path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
