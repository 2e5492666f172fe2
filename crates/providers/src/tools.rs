// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vendor-agnostic tool capabilities and their per-provider tool names.

use space_core::ProviderName;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Shell,
    Write,
    Edit,
    Read,
    Ls,
    Glob,
    Grep,
    Fetch,
    Search,
}

impl Capability {
    pub const ALL: &'static [Capability] = &[
        Capability::Shell,
        Capability::Write,
        Capability::Edit,
        Capability::Read,
        Capability::Ls,
        Capability::Glob,
        Capability::Grep,
        Capability::Fetch,
        Capability::Search,
    ];
}

fn tool_names(provider: ProviderName, cap: Capability) -> &'static [&'static str] {
    use Capability::*;
    use ProviderName::*;
    match (provider, cap) {
        (Claude, Shell) => &["Bash"],
        (Claude, Write) => &["Write"],
        (Claude, Edit) => &["Edit", "MultiEdit"],
        (Claude, Read) => &["Read"],
        (Claude, Ls) => &["LS"],
        (Claude, Glob) => &["Glob"],
        (Claude, Grep) => &["Grep"],
        (Claude, Fetch) => &["WebFetch"],
        (Claude, Search) => &["WebSearch"],

        (Gemini, Shell) => &["run_shell_command"],
        (Gemini, Write) => &["write_file"],
        (Gemini, Edit) => &["replace"],
        (Gemini, Read) => &["read_file"],
        (Gemini, Ls) => &["list_directory"],
        (Gemini, Glob) => &["glob"],
        (Gemini, Grep) => &["search_file_content"],
        (Gemini, Fetch) => &["web_fetch"],
        (Gemini, Search) => &["google_web_search"],

        (Codex, Shell) => &["Bash"],
        (Codex, _) => &[],
    }
}

fn always_disallowed(provider: ProviderName) -> &'static [&'static str] {
    match provider {
        ProviderName::Claude => &["NotebookRead", "NotebookEdit", "Task", "TodoWrite"],
        ProviderName::Codex | ProviderName::Gemini => &[],
    }
}

/// All tool names a provider exposes across every capability.
pub fn all_tools(provider: ProviderName) -> BTreeSet<&'static str> {
    Capability::ALL
        .iter()
        .flat_map(|cap| tool_names(provider, *cap))
        .copied()
        .collect()
}

/// Tool names to pass as the vendor's deny-list: the provider's
/// always-disallowed set, plus (if `allowed` is given) every tool not
/// reachable through one of the allowed capabilities.
pub fn disallowed_for(provider: ProviderName, allowed: Option<&[Capability]>) -> Vec<String> {
    let mut deny: BTreeSet<&str> = always_disallowed(provider).iter().copied().collect();

    if let Some(allowed) = allowed {
        let granted: BTreeSet<&str> = allowed
            .iter()
            .flat_map(|cap| tool_names(provider, *cap))
            .copied()
            .collect();
        deny.extend(all_tools(provider).difference(&granted));
    }

    deny.into_iter().map(str::to_string).collect()
}

/// Tool names to pass as the vendor's allow-list.
pub fn allowed_for(provider: ProviderName, allowed: Option<&[Capability]>) -> Vec<String> {
    let caps = allowed.unwrap_or(Capability::ALL);
    caps.iter()
        .flat_map(|cap| tool_names(provider, *cap))
        .copied()
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Map a tool name from `provider`'s vocabulary to the matching Claude tool
/// name, used so trace consumers can reason about tool calls uniformly.
pub fn normalize_tool_name(provider: ProviderName, tool_name: &str) -> String {
    if provider == ProviderName::Claude {
        return tool_name.to_string();
    }
    for cap in Capability::ALL {
        if tool_names(provider, *cap).contains(&tool_name) {
            if let Some(canonical) = tool_names(ProviderName::Claude, *cap).first() {
                return canonical.to_string();
            }
        }
    }
    tool_name.to_string()
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
