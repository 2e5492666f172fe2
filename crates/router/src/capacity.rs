// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capacity probes: a provider's own usage-quota self-report. The daemon
//! decides which probes back which providers; this crate ships a
//! network-free default (`NullCapacityProbe`, always available) plus
//! `CodexLimitsProbe`, which reads `~/.codex/sessions/*.jsonl` directly and
//! needs no credentials.
//!
//! Claude's real probe reads OAuth usage via a keychain token and an HTTPS
//! call; that I/O is a daemon-level adapter injected through this trait
//! rather than something this crate performs itself.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct UsageBucket {
    pub name: String,
    pub used_pct: f64,
    pub remaining_pct: f64,
    pub resets_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderLimits {
    pub buckets: Vec<UsageBucket>,
    pub error: Option<String>,
}

pub trait CapacityProbe: Send + Sync {
    fn check(&self) -> ProviderLimits;
}

/// Always reports available. Used for Gemini (no quota API in the original)
/// and as the safe fallback for any provider without a real probe wired in.
pub struct NullCapacityProbe;

impl CapacityProbe for NullCapacityProbe {
    fn check(&self) -> ProviderLimits {
        ProviderLimits::default()
    }
}

/// Reads the newest `~/.codex/sessions/**/*.jsonl`'s last `token_count`
/// event for `rate_limits.{primary,secondary}`.
pub struct CodexLimitsProbe {
    sessions_root: PathBuf,
}

impl CodexLimitsProbe {
    pub fn new(sessions_root: impl Into<PathBuf>) -> Self {
        Self { sessions_root: sessions_root.into() }
    }

    pub fn default_location() -> Self {
        let root = dirs_sessions_root();
        Self { sessions_root: root }
    }
}

fn dirs_sessions_root() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".codex")
        .join("sessions")
}

impl CapacityProbe for CodexLimitsProbe {
    fn check(&self) -> ProviderLimits {
        match newest_rate_limits(&self.sessions_root) {
            Some(rate_limits) => ProviderLimits { buckets: rate_limits_to_buckets(&rate_limits), error: None },
            None => ProviderLimits { buckets: Vec::new(), error: Some("no live session limits found".to_string()) },
        }
    }
}

fn newest_jsonl(root: &Path) -> Option<PathBuf> {
    let mut latest: Option<(PathBuf, std::time::SystemTime)> = None;
    for entry in walk_jsonl(root) {
        let Ok(meta) = entry.metadata() else { continue };
        let Ok(mtime) = meta.modified() else { continue };
        let is_newer = match &latest {
            Some((_, m)) => mtime > *m,
            None => true,
        };
        if is_newer {
            latest = Some((entry, mtime));
        }
    }
    latest.map(|(path, _)| path)
}

fn walk_jsonl(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let Ok(entries) = std::fs::read_dir(root) else { return out };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            out.extend(walk_jsonl(&path));
        } else if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
            out.push(path);
        }
    }
    out
}

fn newest_rate_limits(sessions_root: &Path) -> Option<serde_json::Value> {
    let latest = newest_jsonl(sessions_root)?;
    let contents = std::fs::read_to_string(&latest).ok()?;

    for line in contents.lines().rev() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Ok(event) = serde_json::from_str::<serde_json::Value>(trimmed) else { continue };
        let payload = event.get("payload").unwrap_or(&event);
        if payload.get("type").and_then(|t| t.as_str()) != Some("token_count") {
            continue;
        }
        if let Some(rate_limits) = payload.get("rate_limits") {
            if !rate_limits.is_null() {
                return Some(rate_limits.clone());
            }
        }
    }
    None
}

fn rate_limits_to_buckets(rate_limits: &serde_json::Value) -> Vec<UsageBucket> {
    let mut out = Vec::new();
    for (key, label) in [("primary", "5h"), ("secondary", "7d")] {
        let Some(window) = rate_limits.get(key) else { continue };
        let used_pct = window.get("used_percent").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let resets_at = window
            .get("resets_at")
            .and_then(|v| v.as_i64())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
        out.push(UsageBucket { name: label.to_string(), used_pct, remaining_pct: 100.0 - used_pct, resets_at });
    }
    out
}

#[cfg(test)]
#[path = "capacity_tests.rs"]
mod tests;
