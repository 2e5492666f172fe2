// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a vendor CLI's stderr output (plus its exit status) into the
//! canonical error token stored on a `done` spawn. First pattern to match
//! wins; nothing matching falls back to the last non-empty line.

use regex::Regex;
use std::sync::OnceLock;

const MAX_FALLBACK_LEN: usize = 120;

struct Pattern {
    re: fn() -> &'static Regex,
    canonical: fn(&regex::Captures<'_>) -> String,
}

fn model_not_found_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"(?i)ModelNotFoundError:").expect("constant regex is valid"))
}

fn quota_exhausted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"(?i)quota exhausted.*reset after (\S+)").expect("constant regex is valid"))
}

fn rate_limit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"(?i)rate.?limit").expect("constant regex is valid"))
}

fn session_not_found_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"(?i)No conversation found").expect("constant regex is valid"))
}

fn auth_failed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"(?i)401|403.*forbidden|AuthenticationError").expect("constant regex is valid"))
}

fn overloaded_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"(?i)overloaded|529|503.*unavailable").expect("constant regex is valid"))
}

fn patterns() -> &'static [Pattern] {
    static PATTERNS: OnceLock<Vec<Pattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Pattern { re: model_not_found_re, canonical: |_| "model not found".to_string() },
            Pattern { re: quota_exhausted_re, canonical: |c| format!("quota exhausted (resets {})", &c[1]) },
            Pattern { re: rate_limit_re, canonical: |_| "rate limited".to_string() },
            Pattern { re: session_not_found_re, canonical: |_| "session not found".to_string() },
            Pattern { re: auth_failed_re, canonical: |_| "auth failed".to_string() },
            Pattern { re: overloaded_re, canonical: |_| "provider overloaded".to_string() },
        ]
    })
}

/// Whether the derived token means the stored session id should be cleared
/// (the vendor CLI no longer recognizes it).
pub fn clears_session(canonical: &str) -> bool {
    canonical == "session not found"
}

/// First-match-wins classification of `stderr` into a canonical error token.
/// Falls back to the last non-empty line, truncated to 120 characters.
pub fn classify(stderr: &str) -> String {
    for pattern in patterns() {
        if let Some(caps) = (pattern.re)().captures(stderr) {
            return (pattern.canonical)(&caps);
        }
    }
    let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if last_line.chars().count() <= MAX_FALLBACK_LEN {
        last_line.to_string()
    } else {
        last_line.chars().take(MAX_FALLBACK_LEN).collect()
    }
}

#[cfg(test)]
#[path = "stderr_patterns_tests.rs"]
mod tests;
