// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent-pipeline run` — execute a pipeline end to end (spec §4.I), or
//! with `--dry-run`, just print the planned execution groups (spec §6
//! "supplemented features").

use crate::{color, OutputFormat};
use anyhow::Result;
use clap::Args;
use pipeline_adapters::pr::{GhPrCreator, NoOpPrCreator, PrCreator};
use pipeline_adapters::runtime::ClaudeSubprocessRuntime;
use pipeline_adapters::NotifyBus;
use pipeline_core::{CancellationToken, PipelineState, PipelineStatus, SystemClock, UuidIdGen};
use pipeline_engine::{plan, run_pipeline, PlanResult, PlannerIssue, RunOptions, RunnerDeps};
use pipeline_git::GitAdapter;
use pipeline_storage::{RunStore, StateLayout};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline name (a `.agent-pipeline/pipelines/<name>.yml` file)
    pub name: String,

    /// Build the execution plan and print it without running any stage
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle(args: RunArgs, repo_root: &Path, format: OutputFormat) -> Result<i32> {
    let pipeline = super::load_named_pipeline(repo_root, &args.name)?;

    let report = pipeline_runbook::validate_pipeline(&pipeline, repo_root);
    if report.has_errors() {
        super::print_report(&report, format);
        return Ok(2);
    }
    if matches!(format, OutputFormat::Text) {
        super::print_report(&report, format);
    }

    if args.dry_run {
        let plan_result = plan(&pipeline.agents);
        print_plan(&pipeline.name, &plan_result, format);
        return Ok(0);
    }

    let cancellation = CancellationToken::new();
    let printed = Arc::new(AtomicUsize::new(0));
    let on_state_change: pipeline_engine::StateChangeCallback = {
        let printed = printed.clone();
        let format = format;
        Arc::new(move |state: &PipelineState| {
            print_new_stages(state, &printed, format);
        })
    };

    let pr_creator: Arc<dyn PrCreator> = if pipeline.branch.auto_create_pr {
        Arc::new(GhPrCreator::new())
    } else {
        Arc::new(NoOpPrCreator)
    };

    let deps = RunnerDeps {
        git: GitAdapter::new(repo_root),
        runtime: Arc::new(ClaudeSubprocessRuntime::new()),
        notify: NotifyBus::from_policy(&pipeline.notifications),
        pr_creator,
        run_store: RunStore::new(StateLayout::new(repo_root)),
        clock: SystemClock,
        id_gen: UuidIdGen,
        on_state_change,
    };

    if matches!(format, OutputFormat::Text) {
        println!("{} {}", color::header("running"), pipeline.name);
    }

    let run_fut = run_pipeline(&pipeline, repo_root, &cancellation, RunOptions::default(), &deps);
    tokio::pin!(run_fut);
    let state = tokio::select! {
        state = &mut run_fut => state,
        _ = tokio::signal::ctrl_c() => {
            if matches!(format, OutputFormat::Text) {
                eprintln!("{}", color::yellow("cancelling..."));
            }
            cancellation.cancel();
            run_fut.await
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
        OutputFormat::Text => print_summary(&state),
    }

    Ok(match state.status {
        PipelineStatus::Completed => 0,
        _ => 1,
    })
}

fn print_new_stages(state: &PipelineState, printed: &AtomicUsize, format: OutputFormat) {
    if !matches!(format, OutputFormat::Text) {
        return;
    }
    let already = printed.load(Ordering::SeqCst);
    if state.stages.len() <= already {
        return;
    }
    for exec in &state.stages[already..] {
        let status = format!("{:?}", exec.status).to_lowercase();
        println!("  {} {}", color::status(&status), exec.stage_name);
    }
    printed.store(state.stages.len(), Ordering::SeqCst);
}

fn print_summary(state: &PipelineState) {
    println!();
    println!("{} {:?}", color::header("status:"), state.status);
    for exec in &state.stages {
        let status = format!("{:?}", exec.status).to_lowercase();
        let mut line = format!("  {} {}", color::status(&status), exec.stage_name);
        if let Some(sha) = &exec.commit_sha {
            let short = &sha[..sha.len().min(8)];
            line.push_str(&format!(" {}", color::muted(&format!("commit {short}"))));
        }
        if let Some(err) = &exec.error {
            line.push_str(&format!(" {}", color::status_red(&err.message)));
        }
        println!("{line}");
    }
    println!("{} {}ms", color::muted("duration:"), state.artifacts.total_duration_ms);
}

fn print_plan(name: &str, result: &PlanResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let groups: Vec<serde_json::Value> = result
                .graph
                .groups
                .iter()
                .map(|g| {
                    serde_json::json!({
                        "level": g.level,
                        "stages": g.names(),
                    })
                })
                .collect();
            if let Ok(json) = serde_json::to_string_pretty(&groups) {
                println!("{json}");
            }
        }
        OutputFormat::Text => {
            println!("{} {name}", color::header("plan for"));
            for group in &result.graph.groups {
                println!(
                    "  {} {}: {}",
                    color::muted("level"),
                    group.level,
                    group.names().join(", ")
                );
            }
            for issue in &result.issues {
                match issue {
                    PlannerIssue::Cycle { stages } => eprintln!(
                        "{}: dependency cycle among {}",
                        color::status_red("error"),
                        stages.join(", ")
                    ),
                    PlannerIssue::DisabledDependencyOfEnabled { disabled, dependents } => {
                        eprintln!(
                            "{}: '{disabled}' is disabled but required by {}",
                            color::status_yellow("warning"),
                            dependents.join(", ")
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
