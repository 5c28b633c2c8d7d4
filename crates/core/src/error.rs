// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable error-code taxonomy (spec §7) and the per-stage error record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error codes attached to a failed `StageExecution`.
///
/// These are serialized as-is into run state, so variants must keep their
/// string form stable once shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Pre-run validation failure; surfaced before any stage executes.
    Validation,
    /// Missing API key, missing required CLI tool, no git repo, etc.
    Environment,
    /// Worktree/branch setup failure, surfaced as a synthetic first stage.
    Initialization,
    /// Stage timed out; terminal, never retried.
    Timeout,
    /// Transient runtime/transport error; subject to the retry policy.
    Runtime,
    /// Cancellation observed at a suspension point; does not retry.
    Aborted,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Validation => "VALIDATION",
            ErrorCode::Environment => "ENVIRONMENT",
            ErrorCode::Initialization => "INITIALIZATION",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Runtime => "RUNTIME",
            ErrorCode::Aborted => "ABORTED",
        };
        write!(f, "{s}")
    }
}

impl ErrorCode {
    /// Whether a failure carrying this code should be retried by the Stage
    /// Executor's retry policy (spec §4.F.5): only transient runtime errors
    /// are retryable. Condition-false is not an error at all (handled as a
    /// `skipped` StageExecution before this code is ever constructed).
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::Runtime)
    }
}

/// Error attached to a terminal (failed) `StageExecution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl StageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            suggestion: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(message).with_code(ErrorCode::Timeout)
    }

    pub fn aborted() -> Self {
        Self::new("stage cancelled").with_code(ErrorCode::Aborted)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(message).with_code(ErrorCode::Runtime)
    }

    pub fn initialization(message: impl Into<String>) -> Self {
        Self::new(message).with_code(ErrorCode::Initialization)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
