// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SHA-256 hash chain over a trace file's lines, computed once a spawn
//! finalizes and stored as `Spawn::trace_hash`. Lets `verify` detect
//! tampering or truncation of a trace file after the fact.

use sha2::{Digest, Sha256};

const GENESIS: [u8; 32] = [0u8; 32];

/// `h_0 = 0^256`, `h_i = SHA256(h_{i-1} || ":" || line_i)`.
pub fn chain(lines: &[String]) -> String {
    let mut h = GENESIS;
    for line in lines {
        let mut hasher = Sha256::new();
        hasher.update(h);
        hasher.update(b":");
        hasher.update(line.as_bytes());
        h = hasher.finalize().into();
    }
    hex(&h)
}

/// Recompute the chain over `lines` and compare against a previously
/// recorded `expected` hex digest.
pub fn verify(lines: &[String], expected: &str) -> bool {
    chain(lines).eq_ignore_ascii_case(expected)
}

fn hex(bytes: &[u8; 32]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
