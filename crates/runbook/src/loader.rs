// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline YAML loading (spec §6.1): pipeline files live under
//! `<repo>/.agent-pipeline/pipelines/<name>.yml`, agent prompt files under
//! `<repo>/.agent-pipeline/agents/*.md`.
//!
//! Grounded on the teacher's `parser::parse_runbook_with_format` shape (a
//! `Format` enum dispatching to the right deserializer, wrapped errors with
//! source-location context) but swapped from the teacher's HCL/TOML
//! grammar to YAML per spec, since `PipelineConfig` is the target type
//! rather than a bespoke HCL-flavored IR.

use pipeline_core::PipelineConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read pipeline file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid pipeline YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid pipeline YAML: {0}")]
    YamlStr(#[source] serde_yaml::Error),
}

/// Load a `PipelineConfig` from a YAML file on disk.
pub fn load_pipeline_file(path: &Path) -> Result<PipelineConfig, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a `PipelineConfig` from an in-memory YAML string (used by the
/// Loop Scheduler when loading a queued pipeline file, and by tests).
pub fn load_pipeline_str(raw: &str) -> Result<PipelineConfig, LoadError> {
    serde_yaml::from_str(raw).map_err(LoadError::YamlStr)
}

/// Serialize a `PipelineConfig` back to YAML (round-trip, for the CLI's
/// `export` and `edit` workflows).
pub fn to_yaml(config: &PipelineConfig) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(config)
}

/// Where a repo's pipeline and agent files live (spec §6.3).
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn pipelines_dir(&self) -> PathBuf {
        self.root.join(".agent-pipeline").join("pipelines")
    }

    pub fn agents_dir(&self) -> PathBuf {
        self.root.join(".agent-pipeline").join("agents")
    }

    pub fn pipeline_file(&self, name: &str) -> PathBuf {
        self.pipelines_dir().join(format!("{name}.yml"))
    }

    /// Resolve a stage's `agent` path relative to the repo root.
    pub fn resolve_agent_path(&self, agent: &Path) -> PathBuf {
        if agent.is_absolute() {
            agent.to_path_buf()
        } else {
            self.root.join(agent)
        }
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
