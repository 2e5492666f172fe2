// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! space-store: the embedded relational store underneath the ledger. Owns
//! connection lifecycle, schema migrations, short-id resolution, and a small
//! query builder; knows nothing about domain semantics.

pub mod connection;
pub mod error;
pub mod health;
pub mod migrations;
pub mod query;
pub mod resolve;

pub use connection::Store;
pub use error::StoreError;
pub use health::FTS_TABLES;
pub use query::Query;
pub use resolve::{resolve, Table, AGENTS, DECISIONS, INSIGHTS, PROJECTS, SPAWNS, TASKS};
