// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties together the path layout, the tailer, and a per-spawn pub/sub topic:
//! the one thing the spawn engine's monitor loop depends on from this crate.

use crate::{hash, path, tail::Tail, writer::Writer, TraceError};
use space_core::{CanonicalEvent, ProviderName, SpawnId};
use space_pubsub::{Registry, Subscription};
use std::path::PathBuf;
use tracing::debug;

pub struct TraceStore {
    state_root: PathBuf,
    registry: Registry<CanonicalEvent>,
}

impl TraceStore {
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
            registry: Registry::default(),
        }
    }

    pub fn writer_for(&self, provider: ProviderName, spawn_id: &SpawnId) -> Result<Writer, TraceError> {
        Writer::open(path::trace_path(&self.state_root, provider, spawn_id))
    }

    pub fn tail_for(&self, provider: ProviderName, spawn_id: &SpawnId) -> Tail {
        Tail::new(path::resolve_trace_path(&self.state_root, provider, spawn_id))
    }

    /// Read whatever's new since `tail`'s held offset, decode each complete
    /// line as a [`CanonicalEvent`], and publish it on the spawn's topic.
    /// Lines that fail to decode are skipped (logged at debug, not an error).
    pub fn poll(&self, tail: &mut Tail, spawn_id: &SpawnId) -> Result<Vec<CanonicalEvent>, TraceError> {
        let raw = tail.read_new_lines()?;
        let mut events = Vec::with_capacity(raw.len());
        for line in raw {
            match serde_json::from_str::<CanonicalEvent>(&line) {
                Ok(event) => {
                    self.registry.publish(spawn_id.as_str(), event.clone());
                    events.push(event);
                }
                Err(err) => debug!(%err, spawn_id = %spawn_id, "skipping undecodable trace line"),
            }
        }
        Ok(events)
    }

    pub fn subscribe(&self, spawn_id: &SpawnId) -> Subscription<CanonicalEvent> {
        self.registry.subscribe(spawn_id.as_str())
    }

    /// Detach every subscriber of a finished spawn's trace topic.
    pub fn clear(&self, spawn_id: &SpawnId) {
        self.registry.clear(spawn_id.as_str());
    }

    /// Recompute the SHA-256 hash chain over the full trace file from byte
    /// zero — called once, after the spawn's process has exited.
    pub fn finalize_hash(&self, provider: ProviderName, spawn_id: &SpawnId) -> Result<String, TraceError> {
        let path = path::resolve_trace_path(&self.state_root, provider, spawn_id);
        let mut tail = Tail::new(path);
        let mut all_lines = Vec::new();
        loop {
            let batch = tail.read_new_lines()?;
            if batch.is_empty() {
                break;
            }
            all_lines.extend(batch);
        }
        Ok(hash::chain(&all_lines))
    }

    pub fn verify(&self, provider: ProviderName, spawn_id: &SpawnId, expected: &str) -> Result<bool, TraceError> {
        Ok(self.finalize_hash(provider, spawn_id)?.eq_ignore_ascii_case(expected))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
