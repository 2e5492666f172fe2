// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Citation extraction: `i/<8hex>` and `d/<8hex>` references embedded in
//! free-text content (insights, decisions, replies).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationTarget {
    Insight,
    Decision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub target: CitationTarget,
    /// 8-hex-char short id as it appeared in the text (not yet resolved).
    pub short_id: String,
}

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"\b(i|d)/([a-f0-9]{8})\b").expect("citation regex is a compile-time constant")
    })
}

/// Extract every `i/<8hex>`/`d/<8hex>` citation from `content`, in order of
/// appearance, without deduplicating.
pub fn extract_citations(content: &str) -> Vec<Citation> {
    pattern()
        .captures_iter(content)
        .map(|cap| {
            let target = if &cap[1] == "i" {
                CitationTarget::Insight
            } else {
                CitationTarget::Decision
            };
            Citation {
                target,
                short_id: cap[2].to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "citation_tests.rs"]
mod tests;
