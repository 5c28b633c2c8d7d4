// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent-pipeline delete` — remove a pipeline definition file. Does not
//! touch its agent prompt files (those may be shared with other
//! pipelines) or any past run/loop state.

use anyhow::{bail, Context, Result};
use clap::Args;
use pipeline_runbook::RepoLayout;
use std::path::Path;

#[derive(Args)]
pub struct DeleteArgs {
    /// Pipeline name (a `.agent-pipeline/pipelines/<name>.yml` file)
    pub name: String,
}

pub fn handle(args: DeleteArgs, repo_root: &Path) -> Result<i32> {
    let path = RepoLayout::new(repo_root).pipeline_file(&args.name);
    if !path.exists() {
        bail!("no pipeline named '{}' at {}", args.name, path.display());
    }
    std::fs::remove_file(&path).with_context(|| format!("deleting {}", path.display()))?;
    println!("deleted {}", path.display());
    Ok(0)
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
