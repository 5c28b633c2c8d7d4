// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent-pipeline validate` — run the Validator (spec §4.L) against a
//! pipeline file without running it. Exit code 2 on any error finding
//! (spec §6.5).

use crate::OutputFormat;
use anyhow::Result;
use clap::Args;
use pipeline_runbook::validate_pipeline;
use std::path::Path;

#[derive(Args)]
pub struct ValidateArgs {
    /// Pipeline name (a `.agent-pipeline/pipelines/<name>.yml` file)
    pub name: String,
}

pub fn handle(args: ValidateArgs, repo_root: &Path, format: OutputFormat) -> Result<i32> {
    let pipeline = super::load_named_pipeline(repo_root, &args.name)?;
    let report = validate_pipeline(&pipeline, repo_root);
    super::print_report(&report, format);
    Ok(if report.has_errors() { 2 } else { 0 })
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
