// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline and stage configuration (spec §3: `PipelineConfig`, `AgentStageConfig`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What caused this pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    Manual,
    PreCommit,
    PostCommit,
    PrePush,
    PostMerge,
}

/// What a stage does when it ends `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFail {
    Stop,
    Continue,
    Warn,
}

impl OnFail {
    /// Tie-break toward the most restrictive strategy: `stop` beats
    /// `warn`/`continue` (spec §4.H.9).
    pub fn more_restrictive(self, other: OnFail) -> OnFail {
        use OnFail::*;
        match (self, other) {
            (Stop, _) | (_, Stop) => Stop,
            _ => other,
        }
    }
}

/// Retry policy for a stage (spec §3, §4.F.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Seconds to sleep between attempts.
    pub delay: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: 0,
        }
    }
}

/// One agent invocation within a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStageConfig {
    /// Unique within the pipeline. Matches `[A-Za-z][A-Za-z0-9_-]*`.
    pub name: String,
    /// Path to the agent prompt file, relative to the repo root.
    pub agent: PathBuf,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// A `{{ ... }}` template string, evaluated by the Condition Evaluator.
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub on_fail: Option<OnFail>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
}

fn default_true() -> bool {
    true
}

impl AgentStageConfig {
    /// Effective retry policy (defaults to a single attempt, no retry).
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.unwrap_or_default()
    }
}

/// How a group of mutually-independent stages is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Parallel,
    Sequential,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Parallel
    }
}

/// Whether a successful stage's changes are committed automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPolicy {
    #[serde(default)]
    pub auto_commit: bool,
    /// Must contain `{{stage}}` or the Validator emits a warning.
    #[serde(default = "default_commit_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_commit_prefix() -> String {
    "[pipeline:{{stage}}]".to_string()
}

impl Default for CommitPolicy {
    fn default() -> Self {
        Self {
            auto_commit: false,
            prefix: default_commit_prefix(),
            message: None,
        }
    }
}

/// Isolation strategy chosen by the Branch/Worktree Manager (spec §4.K).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchStrategy {
    /// One stable branch name per pipeline, reset per run.
    Reusable,
    /// `{branchPrefix}/{runId}`, created fresh and destroyed on finalize.
    Ephemeral,
    /// In-place execution; no branch or worktree is created.
    None,
}

impl Default for BranchStrategy {
    fn default() -> Self {
        BranchStrategy::None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPolicy {
    #[serde(default)]
    pub strategy: BranchStrategy,
    #[serde(default)]
    pub branch_prefix: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    /// Use a git worktree for isolation (only meaningful when strategy != none).
    #[serde(default)]
    pub isolate: bool,
    #[serde(default = "default_true")]
    pub preserve_working_tree: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub auto_create_pr: bool,
}

impl Default for BranchPolicy {
    fn default() -> Self {
        Self {
            strategy: BranchStrategy::None,
            branch_prefix: None,
            base: None,
            isolate: false,
            preserve_working_tree: true,
            push: false,
            auto_create_pr: false,
        }
    }
}

/// How a stage's conversation context is kept within the runtime's token
/// budget (spec §3 "context-reduction policy", §4.L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextReductionStrategy {
    None,
    Summarize,
    Truncate,
}

impl Default for ContextReductionStrategy {
    fn default() -> Self {
        ContextReductionStrategy::None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextReductionPolicy {
    #[serde(default)]
    pub strategy: ContextReductionStrategy,
    /// Reduce context once estimated tokens cross this threshold.
    #[serde(default)]
    pub trigger_threshold: Option<u64>,
    /// Hard ceiling; must be `>= triggerThreshold` when both are set.
    #[serde(default)]
    pub max_tokens: Option<u64>,
}

impl Default for ContextReductionPolicy {
    fn default() -> Self {
        Self {
            strategy: ContextReductionStrategy::None,
            trigger_threshold: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPolicy {
    #[serde(default)]
    pub slack_webhook: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub desktop: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopingPolicy {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub max_iterations: Option<u32>,
}

impl Default for LoopingPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_iterations: None,
        }
    }
}

/// A fully-loaded pipeline definition (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub name: String,
    pub trigger: TriggerKind,
    pub agents: Vec<AgentStageConfig>,
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    #[serde(default)]
    pub failure_strategy: OnFail,
    #[serde(default)]
    pub commit: CommitPolicy,
    #[serde(default)]
    pub branch: BranchPolicy,
    #[serde(default)]
    pub notifications: NotificationPolicy,
    #[serde(default)]
    pub looping: LoopingPolicy,
    /// Default timeout (seconds) inherited by stages that don't declare one.
    #[serde(default)]
    pub default_timeout: Option<u64>,
    #[serde(default)]
    pub context_reduction: ContextReductionPolicy,
    /// Forwarded to the runtime as `ExecuteOptions.permission_mode`
    /// (e.g. `"default"`, `"acceptEdits"`, `"bypassPermissions"`, `"plan"`).
    #[serde(default)]
    pub permission_mode: Option<String>,
}

impl Default for OnFail {
    fn default() -> Self {
        OnFail::Stop
    }
}

impl PipelineConfig {
    /// Effective failure strategy for one stage (spec §4.H.9).
    pub fn strategy_for(&self, stage: &AgentStageConfig) -> OnFail {
        stage.on_fail.unwrap_or(self.failure_strategy)
    }

    pub fn get_stage(&self, name: &str) -> Option<&AgentStageConfig> {
        self.agents.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
