// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake agent runtime for testing the engine without spawning a real agent.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    AgentRuntime, ExecuteRequest, ExecuteResponse, RuntimeCapabilities, RuntimeError,
    RuntimeTokenUsage, ToolActivityEvent,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// One recorded `execute()` invocation.
#[derive(Debug, Clone)]
pub struct ExecuteCall {
    pub prompt: String,
    pub cwd: std::path::PathBuf,
}

enum Scripted {
    Ok(ExecuteResponse, Vec<ToolActivityEvent>),
    Err(RuntimeError),
}

struct FakeState {
    calls: Vec<ExecuteCall>,
    responses: VecDeque<Scripted>,
    capabilities: RuntimeCapabilities,
    validate_result: Result<(), String>,
}

/// Fake `AgentRuntime` for testing. Queue responses with
/// [`FakeAgentRuntime::push_success`] / [`push_failure`], in call order;
/// an `execute()` call past the end of the queue returns an empty success.
#[derive(Clone)]
pub struct FakeAgentRuntime {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeAgentRuntime {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                responses: VecDeque::new(),
                capabilities: RuntimeCapabilities {
                    streaming: true,
                    token_tracking: true,
                    permission_modes: true,
                },
                validate_result: Ok(()),
            })),
        }
    }
}

impl FakeAgentRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&self, text_output: impl Into<String>, activities: Vec<&str>) {
        self.inner.lock().responses.push_back(Scripted::Ok(
            ExecuteResponse {
                text_output: text_output.into(),
                token_usage: Some(RuntimeTokenUsage {
                    input_tokens: 100,
                    output_tokens: 50,
                }),
            },
            activities
                .into_iter()
                .map(|s| ToolActivityEvent(s.to_string()))
                .collect(),
        ));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.inner
            .lock()
            .responses
            .push_back(Scripted::Err(RuntimeError::Failed(message.into())));
    }

    pub fn set_validate_failure(&self, message: impl Into<String>) {
        self.inner.lock().validate_result = Err(message.into());
    }

    pub fn calls(&self) -> Vec<ExecuteCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl AgentRuntime for FakeAgentRuntime {
    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, RuntimeError> {
        {
            let mut state = self.inner.lock();
            state.calls.push(ExecuteCall {
                prompt: request.prompt.clone(),
                cwd: request.cwd.clone(),
            });
        }

        if request.cancellation.is_cancelled() {
            return Err(RuntimeError::Cancelled);
        }

        let scripted = {
            let mut state = self.inner.lock();
            state.responses.pop_front()
        };

        match scripted {
            Some(Scripted::Ok(response, activities)) => {
                if let Some(sink) = &request.on_activity {
                    for activity in activities {
                        sink(activity);
                    }
                }
                Ok(response)
            }
            Some(Scripted::Err(error)) => Err(error),
            None => Ok(ExecuteResponse {
                text_output: String::new(),
                token_usage: None,
            }),
        }
    }

    fn get_capabilities(&self) -> RuntimeCapabilities {
        self.inner.lock().capabilities
    }

    async fn validate(&self) -> Result<(), RuntimeError> {
        match &self.inner.lock().validate_result {
            Ok(()) => Ok(()),
            Err(message) => Err(RuntimeError::Environment(message.clone())),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
