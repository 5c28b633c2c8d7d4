// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod create;
pub mod delete;
pub mod edit;
pub mod export;
pub mod loop_cmd;
pub mod run;
pub mod status;
pub mod validate;

use crate::OutputFormat;
use anyhow::{Context, Result};
use pipeline_core::PipelineConfig;
use pipeline_runbook::{Finding, Severity, ValidationReport};
use std::path::{Path, PathBuf};

/// Resolve `<repo_root>/.agent-pipeline/pipelines/<name>.yml`.
pub(crate) fn pipeline_file(repo_root: &Path, name: &str) -> PathBuf {
    pipeline_runbook::RepoLayout::new(repo_root).pipeline_file(name)
}

/// Load a pipeline by name, surfacing a helpful error if the file is missing.
pub(crate) fn load_named_pipeline(repo_root: &Path, name: &str) -> Result<PipelineConfig> {
    let path = pipeline_file(repo_root, name);
    pipeline_runbook::load_pipeline_file(&path)
        .with_context(|| format!("loading pipeline '{name}' from {}", path.display()))
}

/// Print a [`ValidationReport`]'s findings to stderr (text) or stdout (json).
pub(crate) fn print_report(report: &ValidationReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let findings: Vec<&Finding> = report.findings.iter().collect();
            if let Ok(json) = serde_json::to_string_pretty(&FindingsJson { findings }) {
                println!("{json}");
            }
        }
        OutputFormat::Text => {
            for finding in &report.findings {
                let (label, color_fn): (&str, fn(&str) -> String) = match finding.severity {
                    Severity::Error => ("error", crate::color::status_red),
                    Severity::Warning => ("warning", crate::color::status_yellow),
                };
                eprintln!(
                    "{}: {} ({})",
                    color_fn(label),
                    finding.message,
                    crate::color::muted(&finding.field)
                );
                if let Some(suggestion) = &finding.suggestion {
                    eprintln!("  {} {}", crate::color::muted("hint:"), suggestion);
                }
            }
        }
    }
}

#[derive(serde::Serialize)]
struct FindingsJson<'a> {
    findings: Vec<&'a Finding>,
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
