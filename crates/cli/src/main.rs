// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! agent-pipeline - CLI front end for the Agent Pipeline Execution Engine.

mod color;
mod commands;
mod table;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agent-pipeline",
    version,
    disable_version_flag = true,
    about = "Runs DAGs of agent stages against a git repository"
)]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline end to end
    Run(commands::run::RunArgs),
    /// Create a new pipeline definition
    Create(commands::create::CreateArgs),
    /// Open a pipeline definition in $EDITOR
    Edit(commands::edit::EditArgs),
    /// Delete a pipeline definition
    Delete(commands::delete::DeleteArgs),
    /// Print a pipeline's YAML definition
    Export(commands::export::ExportArgs),
    /// Validate a pipeline definition without running it
    Validate(commands::validate::ValidateArgs),
    /// Show recent runs and loop sessions
    Status(commands::status::StatusArgs),
    /// Drain a pending-pipeline queue through the runner
    Loop(commands::loop_cmd::LoopArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(dir) = &cli.directory {
        let canonical = std::fs::canonicalize(dir).unwrap_or_else(|e| {
            eprintln!("error: cannot change to directory '{}': {e}", dir.display());
            std::process::exit(1);
        });
        if let Err(e) = std::env::set_current_dir(&canonical) {
            eprintln!("error: cannot change to directory '{}': {e}", canonical.display());
            std::process::exit(1);
        }
    }

    let repo_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let code = match dispatch(cli.command, &repo_root, cli.output).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn dispatch(command: Commands, repo_root: &std::path::Path, format: OutputFormat) -> Result<i32> {
    match command {
        Commands::Run(args) => commands::run::handle(args, repo_root, format).await,
        Commands::Create(args) => commands::create::handle(args, repo_root, format),
        Commands::Edit(args) => commands::edit::handle(args, repo_root),
        Commands::Delete(args) => commands::delete::handle(args, repo_root),
        Commands::Export(args) => commands::export::handle(args, repo_root),
        Commands::Validate(args) => commands::validate::handle(args, repo_root, format),
        Commands::Status(args) => commands::status::handle(args, repo_root, format),
        Commands::Loop(args) => commands::loop_cmd::handle(args, repo_root, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
