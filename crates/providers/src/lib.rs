// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! space-providers: per-vendor adapters that normalize raw Claude/Codex/
//! Gemini event streams into [`space_core::CanonicalEvent`], build the
//! vendor launch command, and read back token usage from a finished trace.

mod adapter;
mod claude;
mod codex;
mod error;
mod gemini;
pub mod models;
pub mod tools;

pub use adapter::{BuiltCommand, LaunchRequest, ProviderAdapter, RawEvent, ToolUseMap, Usage};
pub use claude::ClaudeAdapter;
pub use codex::CodexAdapter;
pub use error::ProviderError;
pub use gemini::GeminiAdapter;

use space_core::ProviderName;

/// Look up the adapter for a provider. Adapters are zero-sized and stateless,
/// so this is a cheap dispatch rather than a registry with lifetime.
pub fn adapter_for(provider: ProviderName) -> Box<dyn ProviderAdapter> {
    match provider {
        ProviderName::Claude => Box::new(ClaudeAdapter),
        ProviderName::Codex => Box::new(CodexAdapter),
        ProviderName::Gemini => Box::new(GeminiAdapter),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
