// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PR-auto-create collaborator (spec §4.I Finalize: "if PR-auto-create is
//! on, create PR via an external collaborator"). Like the notification
//! channels, this is treated as a black-box external collaborator the
//! engine calls through a small trait rather than something it implements
//! itself (spec §1: "hosting remote coordination" is a Non-goal of the
//! engine core).

use crate::subprocess::{run_with_timeout, DEFAULT_STAGE_TIMEOUT};
use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum PrError {
    #[error("pr creation failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PrRequest {
    pub branch: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait PrCreator: Send + Sync + 'static {
    /// Returns the created PR's URL.
    async fn create_pr(&self, request: PrRequest) -> Result<String, PrError>;
}

/// Used when `branch.auto_create_pr` is off, or no PR collaborator is
/// configured.
pub struct NoOpPrCreator;

#[async_trait]
impl PrCreator for NoOpPrCreator {
    async fn create_pr(&self, _request: PrRequest) -> Result<String, PrError> {
        Ok(String::new())
    }
}

/// Creates a pull request via the `gh` CLI, grounded on the same tool this
/// crate's validator checks for (`gh auth status`). One subprocess per
/// `create_pr()` call, wrapped in the crate's standard timeout helper.
pub struct GhPrCreator {
    binary: String,
}

impl GhPrCreator {
    pub fn new() -> Self {
        Self {
            binary: std::env::var("PIPELINE_GH_BINARY").unwrap_or_else(|_| "gh".into()),
        }
    }
}

impl Default for GhPrCreator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrCreator for GhPrCreator {
    async fn create_pr(&self, request: PrRequest) -> Result<String, PrError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args([
            "pr",
            "create",
            "--head",
            &request.branch,
            "--base",
            &request.base,
            "--title",
            &request.title,
            "--body",
            &request.body,
        ]);
        let output = run_with_timeout(cmd, DEFAULT_STAGE_TIMEOUT, "gh pr create")
            .await
            .map_err(PrError::Failed)?;
        if !output.status.success() {
            return Err(PrError::Failed(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct FakePrCreator {
    pub url: String,
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl PrCreator for FakePrCreator {
    async fn create_pr(&self, _request: PrRequest) -> Result<String, PrError> {
        Ok(self.url.clone())
    }
}

#[cfg(test)]
#[path = "pr_tests.rs"]
mod tests;
