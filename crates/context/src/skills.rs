// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Skill injection: composing pre-existing `.md` skill files into a single
//! `<skills>` context block, caller-supplied by name.
//!
//! Authoring or installing skill files is someone else's concern — this
//! module only reads and concatenates what's already on disk.

use crate::ContextError;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static FRONTMATTER: OnceLock<regex::Regex> = OnceLock::new();

fn frontmatter_re() -> &'static regex::Regex {
    FRONTMATTER.get_or_init(|| {
        #[allow(clippy::expect_used)]
        regex::Regex::new(r"(?s)^---\s*\n.*?\n---\s*\n").expect("frontmatter regex is a compile-time constant")
    })
}

fn skill_path(skills_dir: &Path, name: &str) -> Result<PathBuf, ContextError> {
    if name.is_empty() || name.starts_with('/') || name.contains("..") {
        return Err(ContextError::InvalidSkillName(name.to_string()));
    }
    Ok(skills_dir.join(format!("{name}.md")))
}

/// Names of every `.md` skill file under `skills_dir`, sorted.
pub fn list_skills(skills_dir: &Path) -> std::io::Result<Vec<String>> {
    if !skills_dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(skills_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("md") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Loads a single skill's content by name, stripping any leading frontmatter.
pub fn load(skills_dir: &Path, name: &str) -> Result<String, ContextError> {
    let path = skill_path(skills_dir, name)?;
    if !path.exists() {
        return Err(ContextError::UnknownSkill(name.to_string()));
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|source| ContextError::SkillRead { name: name.to_string(), source })?;
    let content = content.trim();
    let stripped = frontmatter_re().replace(content, "");
    Ok(stripped.trim().to_string())
}

/// Composes `names` into one `<skills>` block by loading each from
/// `skills_dir`. Empty `names` composes to an empty string so `wake` can
/// skip the block entirely.
pub fn inject(skills_dir: &Path, names: &[String]) -> Result<String, ContextError> {
    if names.is_empty() {
        return Ok(String::new());
    }
    let blocks = names.iter().map(|n| load(skills_dir, n)).collect::<Result<Vec<_>, _>>()?;
    Ok(format!("<skills>\n{}\n</skills>", blocks.join("\n\n---\n\n")))
}

#[cfg(test)]
#[path = "skills_tests.rs"]
mod tests;
