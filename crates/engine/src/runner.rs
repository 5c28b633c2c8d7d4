// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline Runner (spec §4.I): end-to-end run across initialize, plan,
//! execute, and finalize phases. Hosts the cooperative cancellation token
//! and the notification calls around a run's lifecycle.
//!
//! Grounded on the teacher's `daemon/src/lifecycle.rs` run loop
//! (initialize -> process -> finalize) and its cooperative-cancellation
//! conventions (SPEC_FULL.md §5).

use crate::branch::{self, BranchSetup};
use crate::orchestrator::{self, GroupDispatchDeps, StateChangeCallback};
use crate::planner;
use crate::prompt::TemplateContext;
use pipeline_adapters::notify::NotifyBus;
use pipeline_adapters::pr::{PrCreator, PrRequest};
use pipeline_adapters::runtime::AgentRuntime;
use pipeline_core::{
    CancellationToken, Clock, IdGen, PipelineConfig, PipelineState, PipelineStatus, RunId,
    StageError, StageExecution, StageStatus, TriggerRecord,
};
use pipeline_git::GitAdapter;
use pipeline_handover::HandoverManager;
use pipeline_storage::RunStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Dependencies the Runner needs for one invocation. Everything here is a
/// small trait object or cheap-to-clone handle so a caller (the CLI, or
/// the Loop Scheduler re-invoking the Runner) can wire them once and reuse
/// across runs (spec §5 "Shared resources").
pub struct RunnerDeps<C: Clock, I: IdGen> {
    pub git: GitAdapter,
    pub runtime: Arc<dyn AgentRuntime>,
    pub notify: NotifyBus,
    pub pr_creator: Arc<dyn PrCreator>,
    pub run_store: RunStore,
    pub clock: C,
    pub id_gen: I,
    pub on_state_change: StateChangeCallback,
}

/// Per-invocation knobs that don't belong to the pipeline config itself.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Associates this run with an outer loop iteration (spec §3
    /// `PipelineState.loopContext`).
    pub loop_context: Option<pipeline_core::LoopContext>,
    /// Lets a caller that needs to know the run id before the run starts
    /// (the Loop Scheduler records a `LoopIteration` with `runId` before
    /// invoking the Runner, spec §4.J.2) mint it up front instead of
    /// letting the Runner generate its own.
    pub run_id_override: Option<String>,
}

/// Run one pipeline end to end (spec §4.I). Never panics on a stage
/// failure — every stage-local problem lands in `StageExecution.error`;
/// only a hard initialization failure (e.g. worktree setup) short-circuits
/// the run, and even that surfaces as a synthetic first `StageExecution`
/// rather than an `Err` return.
pub async fn run_pipeline<C: Clock, I: IdGen>(
    pipeline: &PipelineConfig,
    repo_root: &Path,
    cancellation: &CancellationToken,
    options: RunOptions,
    deps: &RunnerDeps<C, I>,
) -> PipelineState {
    let run_id = options
        .run_id_override
        .clone()
        .unwrap_or_else(|| RunId::generate(&deps.clock, &deps.id_gen).to_string());
    let started_at_ms = deps.clock.epoch_ms();

    let initial_commit = deps.git.current_commit().await.unwrap_or_default();
    let changed_files = if initial_commit.is_empty() {
        Vec::new()
    } else {
        deps.git.changed_files(&initial_commit).await.unwrap_or_default()
    };

    let trigger = TriggerRecord {
        kind: pipeline.trigger,
        initial_commit: initial_commit.clone(),
        started_at_ms,
    };
    let mut state = PipelineState::new(run_id.clone(), pipeline.clone(), trigger);
    state.artifacts.changed_files = changed_files;
    state.loop_context = options.loop_context;

    // --- Initialize: branch/worktree setup (spec §4.I Initialize, §4.K) ---
    let branch_setup = match branch::setup_pipeline_branch(&deps.git, &pipeline.name, &run_id, &pipeline.branch).await
    {
        Ok(setup) => setup,
        Err(e) => {
            return fail_at_initialization(state, deps, e.to_string()).await;
        }
    };
    state.artifacts.worktree_path = branch_setup
        .worktree_path
        .as_ref()
        .map(|p| p.display().to_string());

    let run_cwd: PathBuf = branch_setup
        .worktree_path
        .clone()
        .unwrap_or_else(|| repo_root.to_path_buf());
    let run_git = GitAdapter::new(run_cwd.clone());

    let handover_dir = run_cwd.join(".agent-pipeline").join("runs").join(&run_id);
    let mut handover = match HandoverManager::new(&handover_dir) {
        Ok(h) => h,
        Err(e) => {
            return fail_at_initialization(
                state,
                deps,
                format!("could not create handover directory: {e}"),
            )
            .await;
        }
    };
    state.artifacts.handover_dir = handover_dir.display().to_string();

    (deps.on_state_change)(&state.snapshot());
    if let Err(e) = deps.run_store.save_state(&state) {
        warn!(run_id = %run_id, error = %e, "failed to persist initial run state");
    }
    let _ = deps
        .notify
        .notify("pipeline.started", &format!("{} (run {run_id})", pipeline.name))
        .await;

    // --- Plan (spec §4.I Plan, §4.E) ---
    let plan = planner::plan(&pipeline.agents);
    for issue in &plan_issue_messages(&plan.issues) {
        warn!(issue = %issue, run_id = %run_id, "planner issue");
    }

    let template = TemplateContext {
        pipeline_name: pipeline.name.clone(),
        run_id: run_id.clone(),
        trigger: pipeline.trigger,
        timestamp_ms: started_at_ms,
        base_branch: branch_setup.original_branch.clone(),
        branch: branch_setup.branch.clone().unwrap_or_else(|| branch_setup.original_branch.clone()),
        initial_commit: initial_commit.clone(),
    };

    // --- Execute (spec §4.I Execute) ---
    let mut aborted = false;
    'groups: for group in &plan.graph.groups {
        if cancellation.is_cancelled() {
            aborted = true;
            break 'groups;
        }
        let mut group_deps = GroupDispatchDeps {
            run_id: &run_id,
            cwd: &run_cwd,
            git: &run_git,
            handover: &mut handover,
            runtime: deps.runtime.clone(),
            notify: &deps.notify,
            cancellation,
            template: &template,
            on_state_change: &deps.on_state_change,
        };
        let outcome = orchestrator::run_group(group, pipeline, &mut state, &deps.clock, &mut group_deps).await;
        if let Err(e) = deps.run_store.save_state(&state) {
            warn!(run_id = %run_id, error = %e, "failed to persist run state");
        }
        if outcome.should_stop_pipeline {
            break 'groups;
        }
    }

    if aborted {
        state.status = PipelineStatus::Aborted;
    } else if state.status == PipelineStatus::Running {
        state.status = PipelineStatus::Completed;
    }

    // --- Finalize (spec §4.I Finalize) ---
    finalize(pipeline, &mut state, &branch_setup, &deps.git, deps).await;

    state.artifacts.total_duration_ms = deps.clock.epoch_ms().saturating_sub(started_at_ms);
    state.artifacts.final_commit = deps.git.current_commit().await.ok().filter(|s| !s.is_empty());

    (deps.on_state_change)(&state.snapshot());
    if let Err(e) = deps.run_store.save_state(&state) {
        warn!(run_id = %run_id, error = %e, "failed to persist final run state");
    }
    let event = match state.status {
        PipelineStatus::Completed => "pipeline.completed",
        _ => "pipeline.failed",
    };
    let _ = deps.notify.notify(event, &format!("{} (run {run_id}): {:?}", pipeline.name, state.status)).await;

    state
}

async fn finalize<C: Clock, I: IdGen>(
    pipeline: &PipelineConfig,
    state: &mut PipelineState,
    branch_setup: &BranchSetup,
    main_git: &GitAdapter,
    deps: &RunnerDeps<C, I>,
) {
    if let Some(branch_name) = &branch_setup.branch {
        if pipeline.branch.push && state.status != PipelineStatus::Aborted {
            if let Err(e) = main_git.push_branch(branch_name).await {
                warn!(branch = %branch_name, error = %e, "failed to push pipeline branch");
            }
        }
        if pipeline.branch.auto_create_pr && state.status == PipelineStatus::Completed {
            let request = PrRequest {
                branch: branch_name.clone(),
                base: branch_setup.original_branch.clone(),
                title: format!("[{}] {}", pipeline.name, branch_name),
                body: format!("Automated pipeline run for `{}`.", pipeline.name),
            };
            if let Err(e) = deps.pr_creator.create_pr(request).await {
                warn!(branch = %branch_name, error = %e, "failed to create pull request");
            }
        }
    }

    branch::teardown(main_git, branch_setup, &pipeline.branch).await;

    if pipeline.branch.preserve_working_tree && branch_setup.worktree_path.is_none() {
        if let Err(e) = main_git.checkout(&branch_setup.original_branch).await {
            warn!(branch = %branch_setup.original_branch, error = %e, "failed to restore original branch");
        }
    }
}

async fn fail_at_initialization<C: Clock, I: IdGen>(
    mut state: PipelineState,
    deps: &RunnerDeps<C, I>,
    message: String,
) -> PipelineState {
    let at_ms = deps.clock.epoch_ms();
    let mut exec = StageExecution::running("initialize", at_ms);
    exec.error = Some(StageError::initialization(message.clone()));
    exec.finish(StageStatus::Failed, at_ms);
    state.stages.push(exec);
    state.status = PipelineStatus::Failed;
    (deps.on_state_change)(&state.snapshot());
    if let Err(e) = deps.run_store.save_state(&state) {
        warn!(run_id = %state.run_id, error = %e, "failed to persist initialization-failure state");
    }
    let _ = deps.notify.notify("pipeline.failed", &message).await;
    state
}

fn plan_issue_messages(issues: &[planner::PlannerIssue]) -> Vec<String> {
    issues
        .iter()
        .map(|issue| match issue {
            planner::PlannerIssue::Cycle { stages } => {
                format!("dependency cycle (or unresolvable reference) among: {}", stages.join(", "))
            }
            planner::PlannerIssue::DisabledDependencyOfEnabled { disabled, dependents } => {
                format!(
                    "disabled stage '{disabled}' is a dependency of enabled stage(s): {}",
                    dependents.join(", ")
                )
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
