// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Housekeeping: the slow sweep that runs once every [`INTERVAL`] ticks
//! rather than every tick — pruning stale chatter, clearing inertia
//! summaries, publishing stats, and decaying stuck human handoffs.

use crate::DaemonError;
use chrono::{DateTime, Utc};
use space_core::IdGen;
use space_ledger::Ledger;

/// How often housekeeping runs, regardless of the tick interval.
pub const INTERVAL: chrono::Duration = chrono::Duration::seconds(60);

/// `status`/`status/*` insights older than this with no citation get
/// archived.
const STALE_STATUS_HOURS: i64 = 72;

/// Committed `@human`-blocked decisions idle this long get uncommitted.
const HUMAN_BLOCKED_HOURS: i64 = 48;

/// Tracks the last time housekeeping ran so `run_if_due` can throttle it
/// independently of the tick interval.
pub struct Schedule {
    last_run: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self { last_run: None }
    }

    pub fn due(&self, now: DateTime<Utc>) -> bool {
        match self.last_run {
            Some(last) => now - last >= INTERVAL,
            None => true,
        }
    }

    /// Runs the sweep if due, recording `now` as the new watermark either
    /// way so a failed sweep doesn't retry every subsequent tick.
    pub fn run_if_due<I: IdGen>(&mut self, ledger: &Ledger<I>, stats_json_path: Option<&str>, now: DateTime<Utc>) -> Result<Option<Report>, DaemonError> {
        if !self.due(now) {
            return Ok(None);
        }
        self.last_run = Some(now);
        run(ledger, stats_json_path, now).map(Some)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub archived_status_insights: usize,
    pub cleared_inertia_summaries: usize,
    pub decayed_human_blocked: usize,
}

fn run<I: IdGen>(ledger: &Ledger<I>, stats_json_path: Option<&str>, now: DateTime<Utc>) -> Result<Report, DaemonError> {
    let archived_status_insights = ledger.insights().prune_stale_status(STALE_STATUS_HOURS)?;
    let cleared_inertia_summaries = ledger.spawns().clear_inertia_summaries()?;
    crate::stats::write(ledger, stats_json_path, now)?;
    let decayed = ledger.decisions().decay_human_blocked(HUMAN_BLOCKED_HOURS)?;
    if !decayed.is_empty() {
        tracing::warn!(count = decayed.len(), decisions = ?decayed, "decayed stale human-blocked decisions");
    }
    Ok(Report { archived_status_insights, cleared_inertia_summaries, decayed_human_blocked: decayed.len() })
}

#[cfg(test)]
#[path = "housekeeping_tests.rs"]
mod tests;
