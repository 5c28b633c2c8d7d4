// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent-pipeline create` — scaffold a new pipeline definition under
//! `.agent-pipeline/pipelines/<name>.yml`, plus a starter agent prompt.
//!
//! Prompts interactively for the first stage's name when stdout is a TTY
//! (spec §6.6); otherwise writes a minimal one-stage scaffold so the
//! command stays scriptable.

use crate::OutputFormat;
use anyhow::{bail, Context, Result};
use clap::Args;
use pipeline_core::{
    AgentStageConfig, BranchPolicy, CommitPolicy, ContextReductionPolicy, LoopingPolicy,
    NotificationPolicy, OnFail, PipelineConfig, TriggerKind,
};
use pipeline_runbook::{to_yaml, RepoLayout};
use std::io::{IsTerminal, Write};
use std::path::Path;

#[derive(Args)]
pub struct CreateArgs {
    /// Name for the new pipeline (and its first stage, unless prompted otherwise)
    pub name: String,
}

pub fn handle(args: CreateArgs, repo_root: &Path, format: OutputFormat) -> Result<i32> {
    let layout = RepoLayout::new(repo_root);
    let pipeline_path = layout.pipeline_file(&args.name);
    if pipeline_path.exists() {
        bail!("pipeline '{}' already exists at {}", args.name, pipeline_path.display());
    }

    let first_stage = if std::io::stdout().is_terminal() {
        prompt_stage_name(&args.name)?
    } else {
        args.name.clone()
    };

    let agent_rel = Path::new(".agent-pipeline/agents").join(format!("{first_stage}.md"));
    let agent_abs = repo_root.join(&agent_rel);
    if let Some(parent) = agent_abs.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating agents directory {}", parent.display()))?;
    }
    if !agent_abs.exists() {
        std::fs::write(&agent_abs, format!("You are the `{first_stage}` stage of the `{}` pipeline.\n", args.name))
            .with_context(|| format!("writing starter agent file {}", agent_abs.display()))?;
    }

    let pipeline = PipelineConfig {
        name: args.name.clone(),
        trigger: TriggerKind::Manual,
        agents: vec![AgentStageConfig {
            name: first_stage,
            agent: agent_rel,
            depends_on: Vec::new(),
            enabled: true,
            condition: None,
            on_fail: None,
            timeout: None,
            retry: None,
        }],
        execution_mode: Default::default(),
        failure_strategy: OnFail::Stop,
        commit: CommitPolicy::default(),
        branch: BranchPolicy::default(),
        notifications: NotificationPolicy::default(),
        looping: LoopingPolicy::default(),
        default_timeout: None,
        context_reduction: ContextReductionPolicy::default(),
        permission_mode: None,
    };

    if let Some(parent) = pipeline_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating pipelines directory {}", parent.display()))?;
    }
    let yaml = to_yaml(&pipeline)?;
    std::fs::write(&pipeline_path, yaml)
        .with_context(|| format!("writing pipeline file {}", pipeline_path.display()))?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "name": pipeline.name, "path": pipeline_path.display().to_string() })
            );
        }
        OutputFormat::Text => println!("created {}", pipeline_path.display()),
    }
    Ok(0)
}

fn prompt_stage_name(default_name: &str) -> Result<String> {
    print!("first stage name [{default_name}]: ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).context("reading stage name from stdin")?;
    let trimmed = line.trim();
    Ok(if trimmed.is_empty() { default_name.to_string() } else { trimmed.to_string() })
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
