// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-based runtime that drives the `claude` CLI.
//!
//! Grounded on the teacher's `adapters/src/subprocess.rs` timeout-wrapped
//! spawning idiom and `agent/log_entry.rs`'s JSONL-transcript parsing, but
//! the contract here is one-shot (`execute()` runs to completion and
//! returns) rather than the teacher's persistent, reconnectable tmux
//! session.

use super::{
    AgentRuntime, ExecuteRequest, ExecuteResponse, RuntimeCapabilities, RuntimeError,
    RuntimeTokenUsage, ToolActivityEvent,
};
use crate::env::resolve_api_key;
use crate::subprocess::DEFAULT_STAGE_TIMEOUT;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Runtime that invokes the `claude` CLI in `--print --output-format
/// stream-json` mode, one subprocess per `execute()` call.
pub struct ClaudeSubprocessRuntime {
    binary: String,
}

impl ClaudeSubprocessRuntime {
    pub fn new() -> Self {
        Self {
            binary: std::env::var("PIPELINE_AGENT_BINARY").unwrap_or_else(|_| "claude".into()),
        }
    }
}

impl Default for ClaudeSubprocessRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentRuntime for ClaudeSubprocessRuntime {
    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, RuntimeError> {
        let timeout = request
            .options
            .timeout
            .unwrap_or(DEFAULT_STAGE_TIMEOUT);

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--print")
            .arg("--output-format")
            .arg("stream-json")
            .arg("--verbose")
            .arg(&request.prompt)
            .current_dir(&request.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(mode) = &request.options.permission_mode {
            cmd.arg("--permission-mode").arg(mode);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| RuntimeError::Failed(format!("failed to spawn {}: {e}", self.binary)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::Failed("child had no stdout".into()))?;
        let mut lines = BufReader::new(stdout).lines();

        let mut text_output = String::new();
        let mut token_usage = None;

        let run = async {
            loop {
                if request.cancellation.is_cancelled() {
                    let _ = child.start_kill();
                    return Err(RuntimeError::Cancelled);
                }
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Ok(value) = serde_json::from_str::<Value>(&line) {
                            process_event(&value, &request, &mut text_output, &mut token_usage);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        return Err(RuntimeError::Failed(format!("reading stream: {e}")));
                    }
                }
            }
            Ok(())
        };

        tokio::time::timeout(timeout, run)
            .await
            .map_err(|_| RuntimeError::Timeout(timeout))??;

        let status = child
            .wait()
            .await
            .map_err(|e| RuntimeError::Failed(format!("waiting for child: {e}")))?;

        if !status.success() {
            return Err(RuntimeError::Failed(format!(
                "{} exited with status {status}",
                self.binary
            )));
        }

        Ok(ExecuteResponse {
            text_output,
            token_usage,
        })
    }

    fn get_capabilities(&self) -> RuntimeCapabilities {
        RuntimeCapabilities {
            streaming: true,
            token_tracking: true,
            permission_modes: true,
        }
    }

    async fn validate(&self) -> Result<(), RuntimeError> {
        if resolve_api_key().is_none() {
            return Err(RuntimeError::Environment(
                "neither ANTHROPIC_API_KEY nor CLAUDE_API_KEY is set".into(),
            ));
        }
        which(&self.binary).ok_or_else(|| {
            RuntimeError::Environment(format!("{} not found on PATH", self.binary))
        })?;
        Ok(())
    }
}

fn which(binary: &str) -> Option<std::path::PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// Fold one line of the `stream-json` protocol into the accumulated
/// response, emitting a tool-activity summary for tool_use content blocks.
fn process_event(
    value: &Value,
    request: &ExecuteRequest,
    text_output: &mut String,
    token_usage: &mut Option<RuntimeTokenUsage>,
) {
    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return;
    };

    match kind {
        "assistant" => {
            let Some(content) = value
                .pointer("/message/content")
                .and_then(Value::as_array)
            else {
                return;
            };
            for block in content {
                match block.get("type").and_then(Value::as_str) {
                    Some("text") => {
                        if let Some(text) = block.get("text").and_then(Value::as_str) {
                            text_output.push_str(text);
                        }
                    }
                    Some("tool_use") => {
                        if let Some(summary) = summarize_tool_use(block) {
                            emit(request, summary);
                        }
                    }
                    _ => {}
                }
            }
        }
        "result" => {
            if let Some(usage) = value.get("usage") {
                *token_usage = Some(RuntimeTokenUsage {
                    input_tokens: usage
                        .get("input_tokens")
                        .and_then(Value::as_u64)
                        .unwrap_or(0),
                    output_tokens: usage
                        .get("output_tokens")
                        .and_then(Value::as_u64)
                        .unwrap_or(0),
                });
            }
            if text_output.is_empty() {
                if let Some(text) = value.get("result").and_then(Value::as_str) {
                    text_output.push_str(text);
                }
            }
        }
        _ => {}
    }
}

fn summarize_tool_use(block: &Value) -> Option<String> {
    let name = block.get("name").and_then(Value::as_str)?;
    let input = block.get("input")?;
    let summary = match name {
        "Read" => format!("read: {}", str_field(input, "file_path")),
        "Write" => format!("wrote: {}", str_field(input, "file_path")),
        "Edit" => format!("edited: {}", str_field(input, "file_path")),
        "Bash" => format!("bash: {}", str_field(input, "command")),
        other => format!("{}: {}", other.to_lowercase(), input),
    };
    Some(summary)
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("?")
        .to_string()
}

fn emit(request: &ExecuteRequest, summary: String) {
    if let Some(sink) = &request.on_activity {
        sink(ToolActivityEvent(summary));
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
