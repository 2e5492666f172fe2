// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use space_core::SequentialIdGen;
use space_store::Store;

fn ledger() -> Ledger<SequentialIdGen> {
    Ledger::new(Store::open_in_memory().unwrap(), SequentialIdGen::new("spawn"))
}

#[test]
fn schedule_is_due_on_first_check_and_not_immediately_after() {
    let mut schedule = Schedule::new();
    let now = Utc::now();
    assert!(schedule.due(now));

    let ledger = ledger();
    let report = schedule.run_if_due(&ledger, None, now).unwrap();
    assert!(report.is_some());
    assert!(!schedule.due(now + chrono::Duration::seconds(1)));
}

#[test]
fn schedule_runs_again_once_interval_elapses() {
    let mut schedule = Schedule::new();
    let ledger = ledger();
    let t0 = Utc::now();
    schedule.run_if_due(&ledger, None, t0).unwrap();

    let t1 = t0 + INTERVAL + chrono::Duration::seconds(1);
    let report = schedule.run_if_due(&ledger, None, t1).unwrap();
    assert!(report.is_some());
}

#[test]
fn run_writes_stats_when_a_path_is_configured() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("stats.json");
    let ledger = ledger();
    let report = run(&ledger, Some(dest.to_str().unwrap()), Utc::now()).unwrap();
    assert_eq!(report.decayed_human_blocked, 0);
    assert!(dest.exists());
}
