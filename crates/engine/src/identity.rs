// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent identity directory maintenance: the `.gitconfig` a spawn's
//! vendor CLI picks up for commit authorship, and the provider-specific
//! prompt file (`CLAUDE.md`/`AGENTS.md`/`GEMINI.md`) carrying the context
//! text built for this launch. Stale prompt files for the *other* providers
//! are removed so switching an agent's model doesn't leave two vendors
//! reading conflicting instructions out of the same directory.

use crate::EngineError;
use space_core::{Agent, ProviderName};
use std::path::{Path, PathBuf};

/// The filename each provider's CLI reads its system prompt from.
fn prompt_filename(provider: ProviderName) -> &'static str {
    match provider {
        ProviderName::Claude => "CLAUDE.md",
        ProviderName::Codex => "AGENTS.md",
        ProviderName::Gemini => "GEMINI.md",
    }
}

fn all_prompt_filenames() -> [&'static str; 3] {
    ["CLAUDE.md", "AGENTS.md", "GEMINI.md"]
}

/// `<identities_root>/<agent.handle>/`
pub fn identity_dir(identities_root: &Path, agent: &Agent) -> PathBuf {
    identities_root.join(&agent.handle)
}

/// Writes `.gitconfig` and the active provider's prompt file under the
/// agent's identity directory, deleting stale prompt files left by a
/// previous provider. Returns the directory written to.
pub fn inject(identities_root: &Path, agent: &Agent, provider: ProviderName, context: &str) -> Result<PathBuf, EngineError> {
    let dir = identity_dir(identities_root, agent);
    std::fs::create_dir_all(&dir)?;

    std::fs::write(
        dir.join(".gitconfig"),
        format!("[user]\n\tname = {handle}\n\temail = {handle}@space.local\n", handle = agent.handle),
    )?;

    let active = prompt_filename(provider);
    for stale in all_prompt_filenames() {
        if stale != active {
            let path = dir.join(stale);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    std::fs::write(dir.join(active), context)?;
    Ok(dir)
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
