// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PipelineState` and `StageExecution` (spec §3): the durable record of one run.

use crate::error::StageError;
use crate::stage::{PipelineConfig, TriggerKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terminal or in-flight status of a single stage attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Running,
    Success,
    Failed,
    Skipped,
}

impl StageStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StageStatus::Running)
    }
}

/// Short string emitted by a running agent indicating what tool it is
/// currently using (spec GLOSSARY).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolActivity {
    pub summary: String,
    pub at_ms: u64,
}

/// Token accounting reported by the runtime, when it supports it (spec §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_input: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_input: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read: Option<u64>,
}

/// One stage's execution record within a `PipelineState`.
///
/// Lifecycle: created by the Group Orchestrator before dispatch, mutated
/// only by the Stage Executor during execution, frozen on transition to a
/// terminal status (spec §3 Ownership).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageExecution {
    pub stage_name: String,
    pub status: StageStatus,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StageError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_evaluated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_result: Option<bool>,
    /// Last 3 entries only (spec §4.F.4, §8 invariant 7).
    #[serde(default)]
    pub tool_activity: Vec<ToolActivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    /// Parsed `key: value` outputs this stage produced, used by the
    /// Condition Evaluator (`stages.<name>.outputs.<key>`) and handover.
    #[serde(default)]
    pub outputs: HashMap<String, serde_json::Value>,
}

impl StageExecution {
    pub fn running(stage_name: impl Into<String>, started_at_ms: u64) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Running,
            started_at_ms,
            ended_at_ms: None,
            duration_ms: None,
            commit_sha: None,
            error: None,
            condition_evaluated: None,
            condition_result: None,
            tool_activity: Vec::new(),
            token_usage: None,
            outputs: HashMap::new(),
        }
    }

    pub fn skipped_disabled(stage_name: impl Into<String>, at_ms: u64) -> Self {
        Self {
            status: StageStatus::Skipped,
            ended_at_ms: Some(at_ms),
            duration_ms: Some(0),
            ..Self::running(stage_name, at_ms)
        }
    }

    pub fn skipped_condition(stage_name: impl Into<String>, at_ms: u64) -> Self {
        Self {
            status: StageStatus::Skipped,
            ended_at_ms: Some(at_ms),
            duration_ms: Some(0),
            condition_evaluated: Some(true),
            condition_result: Some(false),
            ..Self::running(stage_name, at_ms)
        }
    }

    /// Truncates `tool_activity` to the last 3 entries (spec §8 invariant 7).
    pub fn push_activity(&mut self, activity: ToolActivity) {
        self.tool_activity.push(activity);
        let len = self.tool_activity.len();
        if len > 3 {
            self.tool_activity.drain(0..len - 3);
        }
    }

    pub fn finish(&mut self, status: StageStatus, ended_at_ms: u64) {
        self.status = status;
        self.ended_at_ms = Some(ended_at_ms);
        self.duration_ms = Some(ended_at_ms.saturating_sub(self.started_at_ms));
    }
}

/// Overall run status (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Running,
    Completed,
    Failed,
    Partial,
    Aborted,
}

impl PipelineStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PipelineStatus::Running)
    }

    /// Demote `running -> partial` only; never upgrades a non-running
    /// status (spec §4.H.9, §8 invariant 3).
    pub fn demote_to_partial(&mut self) {
        if *self == PipelineStatus::Running {
            *self = PipelineStatus::Partial;
        }
    }

    /// `running|partial -> failed` is the only allowed upgrade to `failed`
    /// (spec §8 invariant 3: `running -> partial -> failed` demotion chain).
    pub fn escalate_to_failed(&mut self) {
        if matches!(self, PipelineStatus::Running | PipelineStatus::Partial) {
            *self = PipelineStatus::Failed;
        }
    }
}

/// What caused this run, with the commit the run started from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub kind: TriggerKind,
    pub initial_commit: String,
    pub started_at_ms: u64,
}

/// Artifacts accumulated over the run (spec §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artifacts {
    #[serde(default)]
    pub initial_commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_commit: Option<String>,
    #[serde(default)]
    pub changed_files: Vec<String>,
    #[serde(default)]
    pub total_duration_ms: u64,
    #[serde(default)]
    pub handover_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_path: Option<String>,
}

/// Links a run back to the loop iteration that scheduled it (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopContext {
    pub session_id: String,
    pub iteration_number: u32,
}

/// A single pipeline run (spec §3). The Runner is the single logical writer;
/// external observers receive structurally-cloned snapshots (spec §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub run_id: String,
    pub config: PipelineConfig,
    pub trigger: TriggerRecord,
    #[serde(default)]
    pub stages: Vec<StageExecution>,
    pub status: PipelineStatus,
    pub artifacts: Artifacts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_context: Option<LoopContext>,
}

impl PipelineState {
    pub fn new(run_id: impl Into<String>, config: PipelineConfig, trigger: TriggerRecord) -> Self {
        let initial_commit = trigger.initial_commit.clone();
        Self {
            run_id: run_id.into(),
            config,
            trigger,
            stages: Vec::new(),
            status: PipelineStatus::Running,
            artifacts: Artifacts {
                initial_commit,
                ..Artifacts::default()
            },
            loop_context: None,
        }
    }

    pub fn stage(&self, name: &str) -> Option<&StageExecution> {
        self.stages.iter().find(|s| s.stage_name == name)
    }

    pub fn stage_mut(&mut self, name: &str) -> Option<&mut StageExecution> {
        self.stages.iter_mut().find(|s| s.stage_name == name)
    }

    /// A shallow, independent clone suitable for publishing to observers
    /// (spec §9: consumers must not be able to mutate engine-internal state).
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
