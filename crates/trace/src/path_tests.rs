// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use space_core::SpawnId;
use std::path::Path;

#[test]
fn trace_path_is_segmented_by_provider() {
    let id = SpawnId::new("s-1");
    let p = trace_path(Path::new("/state"), ProviderName::Claude, &id);
    assert_eq!(p, Path::new("/state/spawns/claude/s-1.jsonl"));
}

#[test]
fn stderr_path_sits_beside_trace() {
    let id = SpawnId::new("s-1");
    let p = stderr_path(Path::new("/state"), ProviderName::Codex, &id);
    assert_eq!(p, Path::new("/state/spawns/codex/s-1.stderr"));
}

#[test]
fn resolve_falls_back_to_segmented_path_when_neither_exists() {
    let id = SpawnId::new("s-1");
    let p = resolve_trace_path(Path::new("/state"), ProviderName::Gemini, &id);
    assert_eq!(p, Path::new("/state/spawns/gemini/s-1.jsonl"));
}
