// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage Executor (spec §4.F): runs one agent stage end to end. Never
//! throws for a stage-local failure — every outcome, including a runtime
//! error or a timeout, lands in the returned `StageExecution.error`.
//!
//! Grounded on the teacher's `Executor::execute`/`execute_inner` shape in
//! the engine crate: a span-wrapped dispatch with elapsed-time logging and
//! a typed error enum, generalized here from effect dispatch to one agent
//! invocation with retry/timeout/condition/commit semantics layered on top.

use crate::prompt::{build_prompt, TemplateContext};
use pipeline_adapters::runtime::{
    AgentRuntime, ExecuteOptions, ExecuteRequest, RuntimeError, ToolActivityEvent,
};
use pipeline_condition::evaluate_condition;
use pipeline_core::{
    AgentStageConfig, CancellationToken, Clock, ConditionContext, ErrorCode, PipelineConfig,
    StageError, StageExecution, StageStatus, TokenUsage, ToolActivity,
};
use parking_lot::Mutex;
use pipeline_git::GitAdapter;
use pipeline_handover::HandoverManager;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Everything the Stage Executor needs about the run it belongs to, beyond
/// the one stage it is currently executing.
pub struct StageRunContext<'a> {
    pub run_id: &'a str,
    pub cwd: &'a Path,
    pub git: &'a GitAdapter,
    pub handover: &'a HandoverManager,
    pub runtime: &'a dyn AgentRuntime,
    pub cancellation: &'a CancellationToken,
    pub template: &'a TemplateContext,
}

/// Run one stage to a terminal `StageExecution` (spec §4.F).
///
/// `on_activity` is called once per tool-activity event the runtime
/// streams, for callers that want to fan live events out elsewhere (e.g. a
/// state-change callback). Independently of that, every event is recorded
/// onto the returned `StageExecution.tool_activity`, truncated to the last
/// 3 entries (spec §4.F.4, §8 invariant 7).
pub async fn execute_stage<C: Clock>(
    stage: &AgentStageConfig,
    pipeline: &PipelineConfig,
    condition_ctx: &ConditionContext,
    run_ctx: &StageRunContext<'_>,
    clock: &C,
    on_activity: impl Fn(ToolActivityEvent) + Send + Sync + 'static,
) -> StageExecution {
    let started_at_ms = clock.epoch_ms();
    let mut exec = StageExecution::running(stage.name.clone(), started_at_ms);

    let span = tracing::info_span!("stage", stage = %stage.name, run_id = %run_ctx.run_id);
    let _guard = span.enter();

    if run_ctx.cancellation.is_cancelled() {
        exec.error = Some(StageError::aborted());
        exec.finish(StageStatus::Failed, clock.epoch_ms());
        return exec;
    }

    // Condition evaluation (spec §4.F.2): false -> skipped, no invocation.
    if let Some(raw) = &stage.condition {
        let outcome = evaluate_condition(raw, condition_ctx);
        for w in &outcome.warnings {
            warn!(stage = %stage.name, warning = ?w, "condition evaluation warning");
        }
        exec.condition_evaluated = Some(true);
        exec.condition_result = Some(outcome.result);
        if !outcome.result {
            info!(stage = %stage.name, "skipped: condition false");
            exec.finish(StageStatus::Skipped, clock.epoch_ms());
            return exec;
        }
    }

    let prompt = {
        let mut template = run_ctx.template.clone();
        template.timestamp_ms = started_at_ms;
        let agent_path = run_ctx.cwd.join(&stage.agent);
        let agent_prompt = match std::fs::read_to_string(&agent_path) {
            Ok(s) => s,
            Err(e) => {
                exec.error = Some(
                    StageError::new(format!("failed to read agent file {:?}: {e}", agent_path))
                        .with_code(ErrorCode::Environment),
                );
                exec.finish(StageStatus::Failed, clock.epoch_ms());
                return exec;
            }
        };
        build_prompt(&run_ctx.handover.build_context_message(), &agent_prompt, &template)
    };

    let timeout_secs = stage.timeout.or(pipeline.default_timeout);
    let retry = stage.retry_policy();
    let on_activity = Arc::new(on_activity);
    let activity_log: Arc<Mutex<Vec<ToolActivity>>> = Arc::new(Mutex::new(Vec::new()));
    let mut attempt: u32 = 0;
    let outcome = loop {
        attempt += 1;
        if run_ctx.cancellation.is_cancelled() {
            break Err(StageError::aborted());
        }

        let request = ExecuteRequest {
            prompt: prompt.clone(),
            cwd: run_ctx.cwd.to_path_buf(),
            cancellation: run_ctx.cancellation.clone(),
            options: ExecuteOptions {
                permission_mode: pipeline.permission_mode.clone(),
                timeout: timeout_secs.map(Duration::from_secs),
            },
            on_activity: Some(Box::new({
                let sink = on_activity.clone();
                let log = activity_log.clone();
                let clock = clock.clone();
                move |event: ToolActivityEvent| {
                    log.lock().push(ToolActivity {
                        summary: event.0.clone(),
                        at_ms: clock.epoch_ms(),
                    });
                    sink(event);
                }
            })),
        };

        let call = run_ctx.runtime.execute(request);
        let result = match timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), call).await {
                Ok(inner) => inner,
                Err(_) => {
                    warn!(stage = %stage.name, timeout_secs = secs, "stage timed out");
                    break Err(StageError::timeout(format!(
                        "stage timed out after {secs}s"
                    )));
                }
            },
            None => call.await,
        };

        match result {
            Ok(response) => break Ok(response),
            Err(RuntimeError::Cancelled) => break Err(StageError::aborted()),
            Err(RuntimeError::Timeout(d)) => {
                break Err(StageError::timeout(format!("stage timed out after {d:?}")))
            }
            Err(e) if attempt < retry.max_attempts => {
                warn!(stage = %stage.name, attempt, error = %e, "runtime error, retrying");
                if retry.delay > 0 {
                    tokio::time::sleep(Duration::from_secs(retry.delay)).await;
                }
                continue;
            }
            Err(e) => break Err(StageError::runtime(e.to_string())),
        }
    };

    for activity in activity_log.lock().iter().cloned() {
        exec.push_activity(activity);
    }

    match outcome {
        Ok(response) => {
            if let Err(e) = run_ctx.handover.write_stage_output(&stage.name, &response.text_output)
            {
                warn!(stage = %stage.name, error = %e, "handover write failed (HANDOVER_WARN)");
            }
            exec.outputs = parse_stage_outputs(&response.text_output);
            if let Some(usage) = &response.token_usage {
                exec.token_usage = Some(TokenUsage {
                    actual_input: Some(usage.input_tokens),
                    output: Some(usage.output_tokens),
                    ..Default::default()
                });
            }
            if pipeline.commit.auto_commit {
                match run_ctx
                    .git
                    .pipeline_commit(
                        &stage.name,
                        run_ctx.run_id,
                        pipeline.commit.message.as_deref(),
                        Some(&pipeline.commit.prefix),
                    )
                    .await
                {
                    Ok(sha) if sha.is_empty() => {
                        info!(stage = %stage.name, "nothing to commit (COMMIT_EMPTY)");
                    }
                    Ok(sha) => exec.commit_sha = Some(sha),
                    Err(e) => {
                        warn!(stage = %stage.name, error = %e, "pipeline commit failed");
                        exec.error = Some(StageError::runtime(e.to_string()));
                        exec.finish(StageStatus::Failed, clock.epoch_ms());
                        return exec;
                    }
                }
            }
            exec.finish(StageStatus::Success, clock.epoch_ms());
        }
        Err(error) => {
            exec.error = Some(error);
            exec.finish(StageStatus::Failed, clock.epoch_ms());
        }
    }

    exec
}

/// Append one tool-activity event to a `StageExecution`, truncating to the
/// last 3 entries (spec §4.F.4, §8 invariant 7).
pub fn record_activity(exec: &mut StageExecution, at_ms: u64, summary: String) {
    exec.push_activity(ToolActivity { summary, at_ms });
}

/// Pull `stages.<name>.outputs.<key>` values out of a stage's raw textual
/// output (spec §3 `StageExecution.outputs`, §4.D), so a later stage's
/// `condition` can reference them.
///
/// A successful stage's output may end with a trailer-style block, the
/// same `Key: value` shape already used for commit trailers (spec §4.A):
///
/// ```text
/// Outputs:
/// passed: true
/// coverage: 0.87
/// ```
///
/// Everything before the `Outputs:` marker line is free-form prose and
/// ignored; parsing stops at the first blank line after the marker. Each
/// value is parsed as JSON (so `true`/`false`/numbers round-trip as their
/// native type) and falls back to a plain string otherwise.
fn parse_stage_outputs(text: &str) -> HashMap<String, serde_json::Value> {
    let mut outputs = HashMap::new();
    let mut lines = text.lines();
    let found_marker = loop {
        match lines.next() {
            Some(line) if line.trim().eq_ignore_ascii_case("outputs:") => break true,
            Some(_) => continue,
            None => break false,
        }
    };
    if !found_marker {
        return outputs;
    }
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        let parsed = serde_json::from_str::<serde_json::Value>(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        outputs.insert(key.to_string(), parsed);
    }
    outputs
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
