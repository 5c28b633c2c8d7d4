// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Group Orchestrator (spec §4.H): dispatches one `ExecutionGroup`, applying
//! the enabled/disabled filter, choosing sequential vs. parallel dispatch,
//! merging results into `state.stages`, updating handover, notifying, and
//! resolving the group's failure strategy.
//!
//! New component; composes the DAG Planner/Stage Executor/Parallel
//! Executor the way the teacher's `daemon/src/lifecycle.rs` composes
//! listener dispatch, state mutation, and persistence into one reconcile
//! loop (SPEC_FULL.md §5).

use crate::executor::{execute_stage, StageRunContext};
use crate::parallel::{execute_parallel, execute_sequential, GroupRunResult};
use crate::prompt::TemplateContext;
use pipeline_adapters::notify::NotifyBus;
use pipeline_adapters::runtime::AgentRuntime;
use pipeline_core::{
    AgentStageConfig, CancellationToken, Clock, ConditionContext, ExecutionGroup, ExecutionMode,
    OnFail, PipelineConfig, PipelineState, StageExecution, StageStatus,
};
use pipeline_git::GitAdapter;
use pipeline_handover::HandoverManager;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Emitted once per observable mutation of `state.stages` or `state.status`
/// (spec §3 Ownership, §9): a shallow, independent clone, never the
/// caller's own working copy.
pub type StateChangeCallback = Arc<dyn Fn(&PipelineState) + Send + Sync>;

pub struct GroupDispatchDeps<'a> {
    pub run_id: &'a str,
    pub cwd: &'a Path,
    pub git: &'a GitAdapter,
    pub handover: &'a mut HandoverManager,
    pub runtime: Arc<dyn AgentRuntime>,
    pub notify: &'a NotifyBus,
    pub cancellation: &'a CancellationToken,
    pub template: &'a TemplateContext,
    pub on_state_change: &'a StateChangeCallback,
}

/// Outcome of dispatching one group (spec §4.H).
pub struct GroupOutcome {
    pub should_stop_pipeline: bool,
}

/// Run one `ExecutionGroup` against `state`, mutating `state.stages` and
/// `state.status` in place (spec §4.H steps 1-9).
pub async fn run_group<C: Clock>(
    group: &ExecutionGroup,
    pipeline: &PipelineConfig,
    state: &mut PipelineState,
    clock: &C,
    deps: &mut GroupDispatchDeps<'_>,
) -> GroupOutcome {
    // Step 1: filter enabled/disabled.
    let (enabled, disabled): (Vec<&AgentStageConfig>, Vec<&AgentStageConfig>) =
        group.stages.iter().partition(|s| s.enabled);

    for stage in &disabled {
        state
            .stages
            .push(StageExecution::skipped_disabled(stage.name.clone(), clock.epoch_ms()));
    }
    if !disabled.is_empty() {
        (deps.on_state_change)(&state.snapshot());
    }

    // Step 2: early exit if nothing enabled remains.
    if enabled.is_empty() {
        return GroupOutcome {
            should_stop_pipeline: false,
        };
    }

    // Step 3: mode selection - parallel only pays off with 2+ stages.
    let use_parallel = pipeline.execution_mode == ExecutionMode::Parallel && enabled.len() >= 2;

    // Step 4: dispatch. Every task clones its own inputs so the parallel
    // path can satisfy `Send + 'static` without borrowing `state` or
    // `deps` across an await point; `state` is only touched again once
    // every task has completed (step 5).
    let condition_ctx = ConditionContext::from_stages(&state.stages);

    let build_task = |stage: &AgentStageConfig| {
        let stage = stage.clone();
        let pipeline = pipeline.clone();
        let condition_ctx = condition_ctx.clone();
        let run_id = deps.run_id.to_string();
        let cwd = deps.cwd.to_path_buf();
        let git = deps.git.clone();
        let cancellation = deps.cancellation.clone();
        let template = deps.template.clone();
        let runtime = deps.runtime.clone();
        let clock = clock.clone();
        move || run_one_stage(stage, pipeline, condition_ctx, run_id, cwd, git, cancellation, template, runtime, clock)
    };

    let result: GroupRunResult = if use_parallel {
        execute_parallel(enabled.iter().copied().map(build_task).collect()).await
    } else {
        execute_sequential(enabled.iter().copied().map(build_task).collect()).await
    };

    // Step 5: merge results (single logical writer, back on the calling task).
    for exec in &result.executions {
        state.stages.push(exec.clone());
    }
    (deps.on_state_change)(&state.snapshot());

    // Step 6: handover update.
    if use_parallel {
        let succeeded: Vec<String> = result
            .executions
            .iter()
            .filter(|e| e.status == StageStatus::Success)
            .map(|e| e.stage_name.clone())
            .collect();
        if !succeeded.is_empty() {
            if let Err(e) = deps.handover.merge_parallel_outputs(&succeeded) {
                warn!(error = %e, "handover merge failed (HANDOVER_WARN)");
            }
        }
    } else {
        for exec in result.executions.iter().filter(|e| e.status == StageStatus::Success) {
            if let Err(e) = deps.handover.copy_stage_to_handover(&exec.stage_name) {
                warn!(stage = %exec.stage_name, error = %e, "handover copy failed (HANDOVER_WARN)");
            }
        }
    }

    // Step 7: notify (never fatal).
    let summary = result.aggregate_summary();
    let _ = deps
        .notify
        .notify("pipeline.group", &format!("group {}: {summary}", group.level))
        .await;

    info!(level = group.level, %summary, "group finished");

    // Step 8-9: failure resolution, most-restrictive strategy wins across
    // every failed stage in the group.
    let mut should_stop = false;
    for exec in &result.executions {
        if exec.status != StageStatus::Failed {
            continue;
        }
        let Some(stage_cfg) = pipeline.get_stage(&exec.stage_name) else {
            continue;
        };
        match pipeline.strategy_for(stage_cfg) {
            OnFail::Stop => {
                state.status.escalate_to_failed();
                should_stop = true;
            }
            OnFail::Continue | OnFail::Warn => {
                state.status.demote_to_partial();
            }
        }
    }

    GroupOutcome {
        should_stop_pipeline: should_stop,
    }
}

/// One stage's full run, including the run-scoped `HandoverManager` it
/// needs to read prior context and record its own output. Each invocation
/// opens its own handle onto `<cwd>/.agent-pipeline/runs/<run_id>`; the
/// directory and the merged `HANDOVER.md` are only ever rebuilt by the
/// caller's long-lived `HandoverManager` (step 6), so concurrent siblings
/// never race on it.
#[allow(clippy::too_many_arguments)]
async fn run_one_stage<C: Clock>(
    stage: AgentStageConfig,
    pipeline: PipelineConfig,
    condition_ctx: ConditionContext,
    run_id: String,
    cwd: PathBuf,
    git: GitAdapter,
    cancellation: CancellationToken,
    template: TemplateContext,
    runtime: Arc<dyn AgentRuntime>,
    clock: C,
) -> StageExecution {
    let handover = match HandoverManager::new(cwd.join(".agent-pipeline/runs").join(&run_id)) {
        Ok(h) => h,
        Err(e) => {
            let mut exec = StageExecution::running(stage.name.clone(), clock.epoch_ms());
            exec.error = Some(pipeline_core::StageError::runtime(format!(
                "could not open run handover directory: {e}"
            )));
            exec.finish(StageStatus::Failed, clock.epoch_ms());
            return exec;
        }
    };
    let run_ctx = StageRunContext {
        run_id: &run_id,
        cwd: &cwd,
        git: &git,
        handover: &handover,
        runtime: runtime.as_ref(),
        cancellation: &cancellation,
        template: &template,
    };
    execute_stage(&stage, &pipeline, &condition_ctx, &run_ctx, &clock, |_event| {}).await
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
