// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `config.yaml`: swarm scheduling knobs, backup cadence, outbound email,
//! and a couple of daemon-wide paths. Loaded once per mtime and cached —
//! every scheduler tick calls [`Config::load`] and most ticks hit the cache.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SwarmConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub enabled_at: Option<String>,
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
    #[serde(default)]
    pub agents: Option<Vec<String>>,
    #[serde(default)]
    pub providers: Option<Vec<String>>,
    #[serde(default)]
    pub weights: Option<HashMap<String, f64>>,
    #[serde(default = "default_capacity_threshold")]
    pub capacity_threshold: f64,
    #[serde(default)]
    pub project: Option<String>,
}

fn default_concurrency() -> u32 {
    1
}

fn default_capacity_threshold() -> f64 {
    10.0
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            limit: None,
            enabled_at: None,
            concurrency: default_concurrency(),
            agents: None,
            providers: None,
            weights: None,
            capacity_threshold: default_capacity_threshold(),
            project: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupConfig {
    #[serde(default = "default_spawns_per_backup")]
    pub spawns_per_backup: u32,
}

fn default_spawns_per_backup() -> u32 {
    5
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self { spawns_per_backup: default_spawns_per_backup() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_from_addr")]
    pub from_addr: String,
}

fn default_from_addr() -> String {
    "hello@spaceos.sh".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self { api_key: None, from_addr: default_from_addr() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub swarm: SwarmConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub default_identity: Option<String>,
    #[serde(default)]
    pub stats_json_path: Option<String>,
}

struct Cached {
    mtime: SystemTime,
    config: Config,
}

/// Loads and caches `config.yaml` from a fixed path, invalidating on file
/// mtime so concurrent scheduler ticks within the same second share one
/// parse.
pub struct ConfigStore {
    path: PathBuf,
    cache: Mutex<Option<Cached>>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), cache: Mutex::new(None) }
    }

    /// Missing file is a default config, not an error — a fresh deployment
    /// has not written one yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mtime = match std::fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(_) => return Ok(Config::default()),
        };

        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref() {
            if cached.mtime == mtime {
                return Ok(cached.config.clone());
            }
        }

        let text = std::fs::read_to_string(&self.path)?;
        let config: Config = serde_yaml::from_str(&text)?;
        *cache = Some(Cached { mtime, config: config.clone() });
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(config)?;
        std::fs::write(&self.path, yaml)?;
        let mtime = std::fs::metadata(&self.path)?.modified()?;
        *self.cache.lock() = Some(Cached { mtime, config: config.clone() });
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
