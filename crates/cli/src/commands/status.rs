// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent-pipeline status` — print the latest runs and loop sessions from
//! the State Store (spec §6 "supplemented features").

use crate::table::{Column, Table};
use crate::OutputFormat;
use anyhow::Result;
use clap::Args;
use pipeline_storage::{RunStore, StateLayout};
use std::path::Path;

#[derive(Args)]
pub struct StatusArgs {
    /// Show at most this many of the most recent runs and loop sessions
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

pub fn handle(args: StatusArgs, repo_root: &Path, format: OutputFormat) -> Result<i32> {
    let layout = StateLayout::new(repo_root);
    let run_store = RunStore::new(layout.clone());
    let mut runs = run_store.get_all_runs()?;
    runs.sort_by(|a, b| b.run_id.cmp(&a.run_id));
    runs.truncate(args.limit);

    let loop_store = pipeline_storage::LoopStore::new(layout);
    let mut sessions = loop_store.get_all_sessions()?;
    sessions.sort_by(|a, b| b.session_id.cmp(&a.session_id));
    sessions.truncate(args.limit);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "runs": runs,
                "loopSessions": sessions,
            }))?);
        }
        OutputFormat::Text => {
            let mut run_table = Table::new(vec![
                Column::left("RUN"),
                Column::left("PIPELINE"),
                Column::status("STATUS"),
                Column::right("STAGES"),
                Column::left("DURATION"),
            ]);
            for run in &runs {
                run_table.row(vec![
                    run.run_id.clone(),
                    run.config.name.clone(),
                    format!("{:?}", run.status).to_lowercase(),
                    run.stages.len().to_string(),
                    format!("{}ms", run.artifacts.total_duration_ms),
                ]);
            }
            if runs.is_empty() {
                println!("no runs recorded yet");
            } else {
                run_table.render(&mut std::io::stdout());
            }

            println!();

            let mut loop_table = Table::new(vec![
                Column::left("SESSION"),
                Column::status("STATUS"),
                Column::right("ITERATIONS"),
                Column::right("MAX"),
            ]);
            for session in &sessions {
                loop_table.row(vec![
                    session.session_id.clone(),
                    format!("{:?}", session.status).to_lowercase(),
                    session.total_iterations.to_string(),
                    session.max_iterations.to_string(),
                ]);
            }
            if sessions.is_empty() {
                println!("no loop sessions recorded yet");
            } else {
                loop_table.render(&mut std::io::stdout());
            }
        }
    }

    Ok(0)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
