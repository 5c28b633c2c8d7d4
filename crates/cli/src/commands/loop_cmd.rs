// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent-pipeline loop` — drain a pending-pipeline queue through the
//! Runner via the Loop Scheduler (spec §4.J).

use crate::{color, OutputFormat};
use anyhow::Result;
use clap::Args;
use pipeline_adapters::pr::{GhPrCreator, NoOpPrCreator, PrCreator};
use pipeline_adapters::runtime::ClaudeSubprocessRuntime;
use pipeline_adapters::NotifyBus;
use pipeline_core::{CancellationToken, IdGen, LoopSessionStatus, SystemClock, UuidIdGen};
use pipeline_engine::{run_loop, LoopSchedulerDeps, RunnerDeps};
use pipeline_git::GitAdapter;
use pipeline_storage::{LoopStore, RunStore, StateLayout};
use std::path::Path;
use std::sync::Arc;

#[derive(Args)]
pub struct LoopArgs {
    /// Seed pipeline name (a `.agent-pipeline/pipelines/<name>.yml` file)
    pub name: String,

    /// Override the pipeline's configured `looping.maxIterations`, capped
    /// to whichever of the two is smaller
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Loop session id to use (generated if omitted)
    #[arg(long)]
    pub session: Option<String>,
}

pub async fn handle(args: LoopArgs, repo_root: &Path, format: OutputFormat) -> Result<i32> {
    let seed = super::load_named_pipeline(repo_root, &args.name)?;

    let report = pipeline_runbook::validate_pipeline(&seed, repo_root);
    if report.has_errors() {
        super::print_report(&report, format);
        return Ok(2);
    }

    let session_id = args.session.unwrap_or_else(|| {
        format!("{}-{}", seed.name, pipeline_core::UuidIdGen.next())
    });

    let pr_creator: Arc<dyn PrCreator> = if seed.branch.auto_create_pr {
        Arc::new(GhPrCreator::new())
    } else {
        Arc::new(NoOpPrCreator)
    };

    let runner = RunnerDeps {
        git: GitAdapter::new(repo_root),
        runtime: Arc::new(ClaudeSubprocessRuntime::new()),
        notify: NotifyBus::from_policy(&seed.notifications),
        pr_creator,
        run_store: RunStore::new(StateLayout::new(repo_root)),
        clock: SystemClock,
        id_gen: UuidIdGen,
        on_state_change: Arc::new(|_state| {}),
    };

    let deps = LoopSchedulerDeps {
        runner,
        loop_store: LoopStore::new(StateLayout::new(repo_root)),
        loader: Arc::new(|path: &Path| {
            pipeline_runbook::load_pipeline_file(path).map_err(|e| e.to_string())
        }),
    };

    let cancellation = CancellationToken::new();
    if matches!(format, OutputFormat::Text) {
        println!("{} {} (session {session_id})", color::header("looping"), seed.name);
    }

    let loop_fut = run_loop(&seed, repo_root, session_id, args.max_iterations, &cancellation, &deps);
    tokio::pin!(loop_fut);
    let result = tokio::select! {
        result = &mut loop_fut => result,
        _ = tokio::signal::ctrl_c() => {
            if matches!(format, OutputFormat::Text) {
                eprintln!("{}", color::yellow("cancelling..."));
            }
            cancellation.cancel();
            loop_fut.await
        }
    };

    let session = result?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
        OutputFormat::Text => {
            println!(
                "{} {:?} ({} iterations)",
                color::header("session status:"),
                session.status,
                session.total_iterations
            );
        }
    }

    Ok(match session.status {
        LoopSessionStatus::Completed => 0,
        LoopSessionStatus::LimitReached => 0,
        _ => 1,
    })
}

#[cfg(test)]
#[path = "loop_cmd_tests.rs"]
mod tests;
