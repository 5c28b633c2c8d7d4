// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate (spec §6.6).

/// Resolve the API key the agent runtime authenticates with. Either
/// `ANTHROPIC_API_KEY` or `CLAUDE_API_KEY` satisfies this; the former wins
/// when both are set.
pub fn resolve_api_key() -> Option<String> {
    std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .or_else(|| std::env::var("CLAUDE_API_KEY").ok())
        .filter(|v| !v.is_empty())
}

/// `true` if an API key is present in the environment.
pub fn has_api_key() -> bool {
    resolve_api_key().is_some()
}
