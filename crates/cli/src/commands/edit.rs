// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent-pipeline edit` — open a pipeline definition in `$EDITOR` /
//! `$VISUAL` (spec §6.6).

use anyhow::{bail, Context, Result};
use clap::Args;
use pipeline_runbook::RepoLayout;
use std::path::Path;
use std::process::Command;

#[derive(Args)]
pub struct EditArgs {
    /// Pipeline name (a `.agent-pipeline/pipelines/<name>.yml` file)
    pub name: String,
}

pub fn handle(args: EditArgs, repo_root: &Path) -> Result<i32> {
    let path = RepoLayout::new(repo_root).pipeline_file(&args.name);
    if !path.exists() {
        bail!("no pipeline named '{}' at {}", args.name, path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| "vi".to_string());

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("launching editor '{editor}'"))?;

    if !status.success() {
        bail!("editor '{editor}' exited with {status}");
    }

    // Re-parse to give the user immediate feedback on a broken edit rather
    // than letting it surface later on the next `run`.
    pipeline_runbook::load_pipeline_file(&path).with_context(|| {
        format!("pipeline file {} no longer parses after editing", path.display())
    })?;

    Ok(0)
}

#[cfg(test)]
#[path = "edit_tests.rs"]
mod tests;
