// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooldowns, capacity probes, and the one-shot notification gate that
//! together decide whether a provider can take a new spawn right now.

use crate::capacity::{CapacityProbe, NullCapacityProbe};
use crate::state::{key_to_provider, provider_to_key, PersistedState, StateFile};
use chrono::Utc;
use parking_lot::Mutex;
use regex::Regex;
use space_core::{Agent, ProviderName};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

const CAPACITY_CACHE_TTL: Duration = Duration::from_secs(60);

#[allow(clippy::expect_used)]
static QUOTA_RESET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)quota exhausted\s*\(resets\s*(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?\.?\)")
        .expect("constant regex pattern is valid")
});

struct CachedCapacity {
    available: bool,
    checked_at: Instant,
}

pub struct Router {
    state_file: StateFile,
    state: Mutex<PersistedState>,
    capacity_cache: Mutex<HashMap<ProviderName, CachedCapacity>>,
    probes: HashMap<ProviderName, Box<dyn CapacityProbe>>,
    capacity_threshold: f64,
}

impl Router {
    /// `probes` maps provider to the probe that backs its capacity checks;
    /// a provider absent from the map always reports available.
    pub fn new(state_path: impl Into<PathBuf>, capacity_threshold: f64, probes: HashMap<ProviderName, Box<dyn CapacityProbe>>) -> Self {
        let state_file = StateFile::new(state_path);
        let state = state_file.load();
        Self {
            state_file,
            state: Mutex::new(state),
            capacity_cache: Mutex::new(HashMap::new()),
            probes,
            capacity_threshold,
        }
    }

    fn persist(&self, state: &PersistedState) {
        self.state_file.save(state);
    }

    fn purge_expired(&self) {
        let now = Utc::now().timestamp();
        let mut state = self.state.lock();
        let before_len = state.cooldowns.len();
        let expired: Vec<String> = state.cooldowns.iter().filter(|(_, &exp)| exp <= now).map(|(k, _)| k.clone()).collect();
        state.cooldowns.retain(|_, &mut exp| exp > now);
        if state.cooldowns.len() != before_len {
            for provider in &expired {
                state.notified.remove(provider);
            }
            self.persist(&state);
        }
    }

    pub fn provider_blocked(&self, provider: ProviderName) -> bool {
        self.purge_expired();
        let state = self.state.lock();
        state.cooldowns.get(&provider_to_key(provider)).is_some()
    }

    pub fn provider_blocked_until(&self, provider: ProviderName) -> Option<chrono::DateTime<Utc>> {
        self.purge_expired();
        let state = self.state.lock();
        state
            .cooldowns
            .get(&provider_to_key(provider))
            .and_then(|&secs| chrono::DateTime::<Utc>::from_timestamp(secs, 0))
    }

    /// Persist a cooldown for `provider` until `now + seconds` and invalidate
    /// its capacity cache entry.
    pub fn block_provider_for(&self, provider: ProviderName, seconds: i64) -> chrono::DateTime<Utc> {
        let until = Utc::now() + chrono::Duration::seconds(seconds.max(1));
        {
            let mut state = self.state.lock();
            state.cooldowns.insert(provider_to_key(provider), until.timestamp());
            self.persist(&state);
        }
        self.capacity_cache.lock().remove(&provider);
        until
    }

    /// Parse a `"quota exhausted (resets 1h30m)"`-style error and block the
    /// provider for the parsed duration. Returns `None` if the error doesn't
    /// match that shape.
    pub fn record_provider_error(&self, provider: ProviderName, error: &str) -> Option<chrono::DateTime<Utc>> {
        if let Some(caps) = QUOTA_RESET_RE.captures(error) {
            let hours: i64 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            let minutes: i64 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            let seconds: i64 = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            let total = hours * 3600 + minutes * 60 + seconds;
            if total > 0 {
                return Some(self.block_provider_for(provider, total));
            }
            return None;
        }
        if error.to_lowercase().contains("quota") {
            self.clear_cache();
        }
        None
    }

    pub fn clear_cache(&self) {
        self.capacity_cache.lock().clear();
    }

    fn has_capacity(&self, provider: ProviderName) -> bool {
        if self.provider_blocked(provider) {
            return false;
        }

        if let Some(cached) = self.capacity_cache.lock().get(&provider) {
            if cached.checked_at.elapsed() < CAPACITY_CACHE_TTL {
                return cached.available;
            }
        }

        let available = self.check_provider(provider);
        self.capacity_cache.lock().insert(provider, CachedCapacity { available, checked_at: Instant::now() });
        available
    }

    fn check_provider(&self, provider: ProviderName) -> bool {
        let Some(probe) = self.probes.get(&provider) else { return true };
        let limits = probe.check();
        if limits.error.is_some() || limits.buckets.is_empty() {
            return true;
        }
        limits.buckets.iter().all(|b| b.remaining_pct >= self.capacity_threshold)
    }

    pub fn provider_available(&self, provider: ProviderName) -> bool {
        self.has_capacity(provider)
    }

    /// Resolve an agent's model to itself if its provider currently has
    /// capacity, `None` if the agent should be skipped this tick.
    pub fn resolve(&self, agent: &Agent) -> Option<String> {
        let model = agent.model.as_ref()?;
        let provider = space_providers::models::map(model).ok()?;
        if self.has_capacity(provider) {
            Some(model.clone())
        } else {
            tracing::warn!(provider = %provider, agent = %agent.handle, "provider at capacity, skipping");
            None
        }
    }

    pub fn needs_notification(&self, provider: ProviderName) -> bool {
        let state = self.state.lock();
        !state.notified.contains(&provider_to_key(provider))
    }

    pub fn mark_notified(&self, provider: ProviderName) {
        let mut state = self.state.lock();
        state.notified.insert(provider_to_key(provider));
        self.persist(&state);
    }

    /// Providers with an active cooldown right now, for diagnostics.
    pub fn blocked_providers(&self) -> Vec<ProviderName> {
        self.purge_expired();
        let state = self.state.lock();
        state.cooldowns.keys().filter_map(|k| key_to_provider(k)).collect()
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
