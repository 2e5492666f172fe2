// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model catalog, alias resolution, and provider routing by model name.

use crate::ProviderError;
use space_core::ProviderName;

pub struct ModelInfo {
    pub id: &'static str,
    pub provider: ProviderName,
    pub context_limit: u64,
}

const MODELS: &[ModelInfo] = &[
    ModelInfo { id: "claude-haiku-4-5", provider: ProviderName::Claude, context_limit: 200_000 },
    ModelInfo { id: "claude-sonnet-4-5", provider: ProviderName::Claude, context_limit: 200_000 },
    ModelInfo { id: "claude-opus-4-5", provider: ProviderName::Claude, context_limit: 200_000 },
    ModelInfo { id: "claude-opus-4-6", provider: ProviderName::Claude, context_limit: 1_000_000 },
    ModelInfo { id: "gpt-5.1", provider: ProviderName::Codex, context_limit: 272_000 },
    ModelInfo { id: "gpt-5.1-codex", provider: ProviderName::Codex, context_limit: 272_000 },
    ModelInfo { id: "gpt-5.1-codex-mini", provider: ProviderName::Codex, context_limit: 272_000 },
    ModelInfo { id: "gpt-5.1-codex-max", provider: ProviderName::Codex, context_limit: 272_000 },
    ModelInfo { id: "gpt-5.2", provider: ProviderName::Codex, context_limit: 400_000 },
    ModelInfo { id: "gpt-5.2-codex", provider: ProviderName::Codex, context_limit: 400_000 },
    ModelInfo { id: "gpt-5.3-codex", provider: ProviderName::Codex, context_limit: 400_000 },
    ModelInfo { id: "gemini-2-5-flash-lite", provider: ProviderName::Gemini, context_limit: 1_000_000 },
    ModelInfo { id: "gemini-2-5-flash", provider: ProviderName::Gemini, context_limit: 1_000_000 },
    ModelInfo { id: "gemini-2-5-pro", provider: ProviderName::Gemini, context_limit: 1_000_000 },
    ModelInfo { id: "gemini-3-flash-preview", provider: ProviderName::Gemini, context_limit: 1_000_000 },
    ModelInfo { id: "gemini-3-pro-preview", provider: ProviderName::Gemini, context_limit: 1_000_000 },
];

const ALIASES: &[(&str, &str)] = &[
    ("haiku", "claude-haiku-4-5"),
    ("sonnet", "claude-sonnet-4-5"),
    ("opus", "claude-opus-4-6"),
    ("flash", "gemini-3-flash-preview"),
    ("pro", "gemini-3-pro-preview"),
    ("codex", "gpt-5.3-codex"),
    ("gpt", "gpt-5.2"),
];

const DEFAULT_CONTEXT_LIMIT: u64 = 200_000;

/// Expand a short alias (`"opus"`) to its full model id; pass through
/// anything that isn't a known alias.
pub fn resolve(model: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == model)
        .map(|(_, full)| *full)
        .unwrap_or(model)
}

fn lookup(model: &str) -> Option<&'static ModelInfo> {
    let resolved = resolve(model);
    MODELS.iter().find(|m| m.id == resolved)
}

/// Route a model name to the vendor that serves it.
pub fn map(model: &str) -> Result<ProviderName, ProviderError> {
    lookup(model)
        .map(|m| m.provider)
        .ok_or_else(|| ProviderError::UnknownModel(model.to_string()))
}

pub fn context_limit(model: Option<&str>) -> u64 {
    model
        .and_then(lookup)
        .map(|m| m.context_limit)
        .unwrap_or(DEFAULT_CONTEXT_LIMIT)
}

pub fn is_valid(model: &str) -> bool {
    lookup(model).is_some()
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
