// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One monitor thread per live spawn. The vendor CLI owns the trace file —
//! its stdout is redirected straight into it at launch — so this thread's
//! only job is to tail what's new, normalize it through the spawn's
//! provider adapter, persist the bits the ledger cares about, and fan the
//! rest out over pub/sub. Runs on a plain OS thread rather than the async
//! runtime: the concurrency model for the core is one thread per spawn, not
//! a reactor.

use crate::{lifecycle, persistence, stderr_patterns, EngineError};
use nix::sys::signal::kill;
use nix::unistd::Pid;
use space_core::{CanonicalEvent, IdGen, ProviderName, Role, Spawn, SpawnId};
use space_ledger::Ledger;
use space_providers::ToolUseMap;
use space_pubsub::Registry;
use space_trace::{hash, Tail};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct WatchParams {
    pub trace_path: PathBuf,
    pub stderr_path: PathBuf,
    pub pid: i32,
    pub timeout: Duration,
}

fn process_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

/// Blocks the calling thread until `spawn`'s process exits, times out, or
/// goes missing. Intended to run on a dedicated `std::thread::spawn` per
/// launch.
pub fn run<I: IdGen>(
    ledger: &Ledger<I>,
    bus: &Registry<CanonicalEvent>,
    spawn_id: &SpawnId,
    provider: ProviderName,
    params: WatchParams,
) -> Result<Spawn, EngineError> {
    let adapter = space_providers::adapter_for(provider);
    let mut tail = Tail::new(params.trace_path.clone());
    let mut tool_map = ToolUseMap::new();
    let started = Instant::now();
    let topic = spawn_id.as_str().to_string();
    let mut has_work = false;
    let mut all_lines = Vec::new();
    let mut last_assistant_text: Option<String> = None;

    loop {
        for line in tail.read_new_lines()? {
            all_lines.push(line.clone());
            let Ok(raw) = serde_json::from_str::<serde_json::Value>(&line) else { continue };
            for event in adapter.normalize_event(&raw, spawn_id.as_str(), &mut tool_map) {
                if event.is_work_event() {
                    has_work = true;
                }
                if let CanonicalEvent::Text { role: Role::Assistant, content } = &event {
                    last_assistant_text = Some(content.clone());
                }
                handle_event(ledger, spawn_id, &event)?;
                bus.publish(&topic, event);
            }
        }

        if started.elapsed() >= params.timeout {
            lifecycle::terminate(ledger, &ledger.spawns().get(spawn_id.as_str())?)?;
            persistence::finalize(ledger.store(), spawn_id, None, Some("timeout"), None)?;
            return finish(ledger, bus, spawn_id, &topic, &all_lines, last_assistant_text);
        }

        if !process_alive(params.pid) {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    // Final drain in case the process exited between the last tail and the
    // liveness check.
    for line in tail.read_new_lines()? {
        all_lines.push(line.clone());
        let Ok(raw) = serde_json::from_str::<serde_json::Value>(&line) else { continue };
        for event in adapter.normalize_event(&raw, spawn_id.as_str(), &mut tool_map) {
            if event.is_work_event() {
                has_work = true;
            }
            if let CanonicalEvent::Text { role: Role::Assistant, content } = &event {
                last_assistant_text = Some(content.clone());
            }
            handle_event(ledger, spawn_id, &event)?;
            bus.publish(&topic, event);
        }
    }

    let stderr = std::fs::read_to_string(&params.stderr_path).unwrap_or_default();
    let error = exit_error(&stderr, has_work);
    if let Some(token) = &error {
        if stderr_patterns::clears_session(token) {
            persistence::clear_session_id(ledger.store(), spawn_id)?;
        }
    }
    persistence::finalize(ledger.store(), spawn_id, None, error.as_deref(), None)?;
    finish(ledger, bus, spawn_id, &topic, &all_lines, last_assistant_text)
}

/// A spawn that produced real work (a tool call, a tool result, an
/// assistant message) before a non-quota failure counts as a successful
/// completion with no recorded error, matching an agent that did its job
/// and then lost its connection on the way out.
fn exit_error(stderr: &str, has_work: bool) -> Option<String> {
    if stderr.trim().is_empty() {
        return None;
    }
    let token = stderr_patterns::classify(stderr);
    if has_work && !token.starts_with("quota exhausted") {
        return None;
    }
    Some(token)
}

fn handle_event<I: IdGen>(ledger: &Ledger<I>, spawn_id: &SpawnId, event: &CanonicalEvent) -> Result<(), EngineError> {
    match event {
        CanonicalEvent::ContextInit { session_id, .. } if !session_id.is_empty() => {
            persistence::set_session_id(ledger.store(), spawn_id, session_id)?;
        }
        CanonicalEvent::Text { role: Role::Assistant, .. } | CanonicalEvent::ToolCall { .. } | CanonicalEvent::ToolResult { .. } => {
            persistence::touch_last_active(ledger.store(), spawn_id, chrono::Utc::now())?;
        }
        _ => {}
    }
    Ok(())
}

fn finish<I: IdGen>(
    ledger: &Ledger<I>,
    bus: &Registry<CanonicalEvent>,
    spawn_id: &SpawnId,
    topic: &str,
    lines: &[String],
    last_assistant_text: Option<String>,
) -> Result<Spawn, EngineError> {
    let chain = hash::chain(lines);
    ledger.store().with_conn(|conn| {
        conn.execute("UPDATE spawns SET trace_hash = ?1 WHERE id = ?2", rusqlite::params![chain, spawn_id.as_str()])?;
        Ok(())
    })?;

    let spawn = ledger.spawns().get(spawn_id.as_str())?;
    if spawn.summary.is_none() {
        if let Some(text) = last_assistant_text {
            ledger.store().with_conn(|conn| {
                conn.execute("UPDATE spawns SET summary = ?1 WHERE id = ?2", rusqlite::params![text, spawn_id.as_str()])?;
                Ok(())
            })?;
        }
    }

    // A spawn that exits clean with no assistant text to autofill from (pure
    // tool work, nothing said) would otherwise land `done` with neither a
    // summary nor an error. Every terminal spawn carries one or the other.
    let spawn = ledger.spawns().get(spawn_id.as_str())?;
    if spawn.summary.is_none() && spawn.error.is_none() {
        ledger.store().with_conn(|conn| {
            conn.execute(
                "UPDATE spawns SET error = 'no summary' WHERE id = ?1",
                rusqlite::params![spawn_id.as_str()],
            )?;
            Ok(())
        })?;
    }

    bus.clear(topic);
    ledger.spawns().get(spawn_id.as_str()).map_err(EngineError::from)
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
