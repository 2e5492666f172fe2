// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn open_in_memory_runs_migrations() {
    let store = Store::open_in_memory().unwrap();
    let count: i64 = store
        .with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM agents", [], |r| r.get(0))?)
        })
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn nested_transaction_commits_together() {
    let store = Store::open_in_memory().unwrap();
    store
        .transaction(|conn| {
            conn.execute(
                "INSERT INTO projects (id, name, created_at) VALUES ('p1', 'proj', '2026-01-01')",
                [],
            )?;
            store.transaction(|conn| {
                conn.execute(
                    "INSERT INTO projects (id, name, created_at) VALUES ('p2', 'proj2', '2026-01-01')",
                    [],
                )?;
                Ok(())
            })?;
            Ok::<_, StoreError>(())
        })
        .unwrap();

    let count: i64 = store
        .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM projects", [], |r| r.get(0))?))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn inner_failure_rolls_back_only_the_savepoint() {
    let store = Store::open_in_memory().unwrap();
    let outcome = store.transaction(|conn| {
        conn.execute(
            "INSERT INTO projects (id, name, created_at) VALUES ('p1', 'proj', '2026-01-01')",
            [],
        )?;
        let inner: Result<(), StoreError> = store.transaction(|conn| {
            conn.execute(
                "INSERT INTO projects (id, name, created_at) VALUES ('p2', 'proj2', '2026-01-01')",
                [],
            )?;
            Err(StoreError::Query("deliberate failure".into()))
        });
        assert!(inner.is_err());
        Ok::<_, StoreError>(())
    });
    assert!(outcome.is_ok());

    let count: i64 = store
        .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM projects", [], |r| r.get(0))?))
        .unwrap();
    assert_eq!(count, 1);
}
