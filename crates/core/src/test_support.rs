// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders shared by this crate's own tests and by sibling crates'
//! test suites (enabled via the `test-support` feature).

use crate::stage::{
    AgentStageConfig, BranchPolicy, CommitPolicy, ContextReductionPolicy, ExecutionMode,
    LoopingPolicy, NotificationPolicy, OnFail, PipelineConfig, TriggerKind,
};
use crate::state::TriggerRecord;

/// A minimal, valid stage config with the given name and no dependencies.
pub fn stage(name: &str) -> AgentStageConfig {
    AgentStageConfig {
        name: name.to_string(),
        agent: format!("agents/{name}.md").into(),
        depends_on: vec![],
        enabled: true,
        condition: None,
        on_fail: None,
        timeout: None,
        retry: None,
    }
}

pub fn stage_depending_on(name: &str, deps: &[&str]) -> AgentStageConfig {
    AgentStageConfig {
        depends_on: deps.iter().map(|s| s.to_string()).collect(),
        ..stage(name)
    }
}

/// A minimal pipeline config with one stage per given name, each depending
/// on the previous (a straight-line chain).
pub fn pipeline_config(name: &str, stage_names: Vec<&str>) -> PipelineConfig {
    let mut agents = Vec::new();
    for (i, n) in stage_names.iter().enumerate() {
        if i == 0 {
            agents.push(stage(n));
        } else {
            agents.push(stage_depending_on(n, &[stage_names[i - 1]]));
        }
    }
    PipelineConfig {
        name: name.to_string(),
        trigger: TriggerKind::Manual,
        agents,
        execution_mode: ExecutionMode::Parallel,
        failure_strategy: OnFail::Stop,
        commit: CommitPolicy::default(),
        branch: BranchPolicy::default(),
        notifications: NotificationPolicy::default(),
        looping: LoopingPolicy::default(),
        default_timeout: None,
        context_reduction: ContextReductionPolicy::default(),
        permission_mode: None,
    }
}

pub fn trigger(initial_commit: &str, started_at_ms: u64) -> TriggerRecord {
    TriggerRecord {
        kind: TriggerKind::Manual,
        initial_commit: initial_commit.to_string(),
        started_at_ms,
    }
}
