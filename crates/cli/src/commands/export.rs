// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent-pipeline export` — print a loaded pipeline's YAML definition
//! (spec §6 "supplemented features": round-trip serialization, the
//! building block the `edit` workflow rewrites).

use anyhow::Result;
use clap::Args;
use pipeline_runbook::to_yaml;
use std::path::Path;

#[derive(Args)]
pub struct ExportArgs {
    /// Pipeline name (a `.agent-pipeline/pipelines/<name>.yml` file)
    pub name: String,
}

pub fn handle(args: ExportArgs, repo_root: &Path) -> Result<i32> {
    let pipeline = super::load_named_pipeline(repo_root, &args.name)?;
    let yaml = to_yaml(&pipeline)?;
    print!("{yaml}");
    Ok(0)
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
