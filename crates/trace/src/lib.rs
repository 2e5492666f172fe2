// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! space-trace: the append-only JSONL trace file per spawn, the incremental
//! tailer the monitor thread polls, the SHA-256 hash chain computed at
//! finalization, and the fan-out into [`space_pubsub`].

pub mod error;
pub mod hash;
pub mod path;
pub mod store;
pub mod tail;
pub mod writer;

pub use error::TraceError;
pub use path::{legacy_trace_path, resolve_trace_path, stderr_path, trace_path};
pub use store::TraceStore;
pub use tail::Tail;
pub use writer::Writer;
