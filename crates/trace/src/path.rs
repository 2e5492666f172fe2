// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trace file path layout under the state root.

use space_core::{ProviderName, SpawnId};
use std::path::{Path, PathBuf};

/// `<state_root>/spawns/<provider>/<spawn_id>.jsonl`
pub fn trace_path(state_root: &Path, provider: ProviderName, spawn_id: &SpawnId) -> PathBuf {
    state_root
        .join("spawns")
        .join(provider.to_string())
        .join(format!("{}.jsonl", spawn_id.as_str()))
}

/// The stderr sibling of a trace file.
pub fn stderr_path(state_root: &Path, provider: ProviderName, spawn_id: &SpawnId) -> PathBuf {
    state_root
        .join("spawns")
        .join(provider.to_string())
        .join(format!("{}.stderr", spawn_id.as_str()))
}

/// Pre-provider-segmentation path, checked as a fallback for traces written
/// before spawns were segmented by provider directory.
pub fn legacy_trace_path(state_root: &Path, spawn_id: &SpawnId) -> PathBuf {
    state_root.join("spawns").join(format!("{}.jsonl", spawn_id.as_str()))
}

/// Resolve the trace file for a spawn, preferring the provider-segmented path
/// and falling back to the legacy unqualified one if that's what's on disk.
pub fn resolve_trace_path(state_root: &Path, provider: ProviderName, spawn_id: &SpawnId) -> PathBuf {
    let segmented = trace_path(state_root, provider, spawn_id);
    if segmented.exists() {
        return segmented;
    }
    let legacy = legacy_trace_path(state_root, spawn_id);
    if legacy.exists() {
        return legacy;
    }
    segmented
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
