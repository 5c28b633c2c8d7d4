// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent runtime contract (spec §6.2).
//!
//! The engine calls into a runtime as a black box: `execute()` runs a
//! prompt to completion (or failure), streaming tool-activity summaries as
//! it goes; `get_capabilities()` lets the Validator and Stage Executor
//! adapt to what a given runtime supports; `validate()` pre-flights the
//! environment before a run starts.

mod claude;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use claude::ClaudeSubprocessRuntime;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ExecuteCall, FakeAgentRuntime};

use async_trait::async_trait;
use pipeline_core::CancellationToken;
use std::path::PathBuf;
use thiserror::Error;

/// A single tool-activity summary surfaced while a prompt executes, e.g.
/// `"read: src/lib.rs"` or `"bash: cargo test (exit 0)"`. The engine keeps
/// only the last 3 per stage (spec §4.F.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolActivityEvent(pub String);

/// Streaming sink for tool-activity events. The runtime calls this once per
/// observed tool invocation; the engine is responsible for truncation and
/// fan-out to the state-change callback.
pub type ToolActivitySink = Box<dyn Fn(ToolActivityEvent) + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Optional permission mode forwarded to the underlying agent CLI
    /// (e.g. `"default"`, `"acceptEdits"`, `"bypassPermissions"`).
    pub permission_mode: Option<String>,
    /// Hard wall-clock budget for this invocation; `None` defers to the
    /// runtime's own default.
    pub timeout: Option<std::time::Duration>,
}

pub struct ExecuteRequest {
    pub prompt: String,
    pub cwd: PathBuf,
    pub cancellation: CancellationToken,
    pub options: ExecuteOptions,
    pub on_activity: Option<ToolActivitySink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeTokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ExecuteResponse {
    pub text_output: String,
    pub token_usage: Option<RuntimeTokenUsage>,
}

/// Optional feature support a runtime declares up front (spec §6.2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeCapabilities {
    pub streaming: bool,
    pub token_tracking: bool,
    pub permission_modes: bool,
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("agent runtime cancelled")]
    Cancelled,
    #[error("agent runtime timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("agent runtime environment invalid: {0}")]
    Environment(String),
    #[error("agent runtime failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait AgentRuntime: Send + Sync + 'static {
    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, RuntimeError>;

    fn get_capabilities(&self) -> RuntimeCapabilities;

    /// Pre-flight the environment (API key presence, binary on PATH, …).
    /// Called by the Validator (4.L) and once at Runner initialize (4.I).
    async fn validate(&self) -> Result<(), RuntimeError>;
}
