// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle: WAL mode, busy-timeout, opportunistic checkpointing,
//! and transaction/savepoint nesting over a single shared connection.
//!
//! The connection is held behind a [`ReentrantMutex`] rather than a plain
//! `Mutex`: a `transaction` called from inside another `transaction` on the
//! same thread (the common case — a ledger write that also touches
//! citations) must reuse the already-held connection instead of deadlocking,
//! while a genuinely concurrent caller on another thread still blocks.

use crate::error::StoreError;
use crate::migrations;
use parking_lot::ReentrantMutex;
use rusqlite::Connection;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

const CONTENTION_WARN: Duration = Duration::from_millis(100);
const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(60);

pub struct Store {
    path: PathBuf,
    conn: ReentrantMutex<RefCell<Connection>>,
    last_checkpoint: parking_lot::Mutex<Instant>,
    savepoint_depth: AtomicU64,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut conn = Connection::open(&path)?;
        configure(&mut conn)?;
        migrations::migrate(&mut conn)?;
        Ok(Self {
            path,
            conn: ReentrantMutex::new(RefCell::new(conn)),
            last_checkpoint: parking_lot::Mutex::new(Instant::now()),
            savepoint_depth: AtomicU64::new(0),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let mut conn = Connection::open_in_memory()?;
        // WAL is meaningless for :memory: databases; skip configure's pragmas
        // that require a file, but still run migrations.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&mut conn)?;
        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: ReentrantMutex::new(RefCell::new(conn)),
            last_checkpoint: parking_lot::Mutex::new(Instant::now()),
            savepoint_depth: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with exclusive access to the connection, warning if acquiring
    /// that access took longer than [`CONTENTION_WARN`].
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let start = Instant::now();
        let guard = self.conn.lock();
        let waited = start.elapsed();
        if waited > CONTENTION_WARN {
            warn!(waited_ms = waited.as_millis() as u64, "store connection contention");
        }
        f(&guard.borrow())
    }

    /// Run `f` inside a transaction. Nests via `SAVEPOINT` when called while
    /// already inside an outer `transaction` call on this store (same thread).
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let start = Instant::now();
        let guard = self.conn.lock();
        let waited = start.elapsed();
        if waited > CONTENTION_WARN {
            warn!(waited_ms = waited.as_millis() as u64, "store connection contention");
        }
        let conn = guard.borrow();

        let depth = self.savepoint_depth.fetch_add(1, Ordering::SeqCst);
        let savepoint = format!("sp_{depth}");

        if depth == 0 {
            conn.execute_batch("BEGIN IMMEDIATE")?;
        } else {
            conn.execute_batch(&format!("SAVEPOINT {savepoint}"))?;
        }

        let result = f(&conn);
        self.savepoint_depth.fetch_sub(1, Ordering::SeqCst);

        match &result {
            Ok(_) if depth == 0 => conn.execute_batch("COMMIT")?,
            Ok(_) => conn.execute_batch(&format!("RELEASE {savepoint}"))?,
            Err(_) if depth == 0 => {
                let _ = conn.execute_batch("ROLLBACK");
            }
            Err(_) => {
                let _ = conn.execute_batch(&format!("ROLLBACK TO {savepoint}"));
            }
        }

        if depth == 0 {
            self.maybe_checkpoint(&conn);
        }
        result
    }

    /// Rebuilds one FTS5 shadow table. See [`crate::health::rebuild_fts`].
    pub fn rebuild_fts(&self, table: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| crate::health::rebuild_fts(conn, table))
    }

    /// Checks and repairs every FTS5 shadow table, returning the names
    /// actually rebuilt. Meant to run once at process startup.
    pub fn repair_fts_if_needed(&self) -> Result<Vec<&'static str>, StoreError> {
        self.with_conn(crate::health::repair_fts_if_needed)
    }

    fn maybe_checkpoint(&self, conn: &Connection) {
        let mut last = self.last_checkpoint.lock();
        if last.elapsed() < CHECKPOINT_INTERVAL {
            return;
        }
        if let Err(err) = conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE)") {
            warn!(%err, "opportunistic wal checkpoint failed");
        }
        *last = Instant::now();
    }
}

fn configure(conn: &mut Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
