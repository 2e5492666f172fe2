// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Provider cooldowns, capacity probing, and model-to-provider routing.
//!
//! A [`Router`] tracks which providers are in a failure cooldown, caches
//! their self-reported usage quota for a short TTL, and decides whether a
//! given agent's model can be dispatched right now. None of this performs
//! network I/O itself — [`CapacityProbe`] implementations own that, and the
//! daemon wires in the provider-specific ones.

mod capacity;
mod error;
mod router;
mod state;

pub use capacity::{CapacityProbe, CodexLimitsProbe, NullCapacityProbe, ProviderLimits, UsageBucket};
pub use error::RouterError;
pub use router::Router;
