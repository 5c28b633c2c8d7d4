// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{pipeline_config, trigger};

#[test]
fn push_activity_truncates_to_last_three() {
    let mut exec = StageExecution::running("a", 0);
    for i in 0..5 {
        exec.push_activity(ToolActivity { summary: format!("tool-{i}"), at_ms: i });
    }
    assert_eq!(exec.tool_activity.len(), 3);
    assert_eq!(exec.tool_activity[0].summary, "tool-2");
    assert_eq!(exec.tool_activity[2].summary, "tool-4");
}

#[test]
fn demote_to_partial_never_upgrades_terminal_status() {
    let mut status = PipelineStatus::Aborted;
    status.demote_to_partial();
    assert_eq!(status, PipelineStatus::Aborted);

    let mut running = PipelineStatus::Running;
    running.demote_to_partial();
    assert_eq!(running, PipelineStatus::Partial);
}

#[test]
fn escalate_to_failed_only_from_running_or_partial() {
    let mut partial = PipelineStatus::Partial;
    partial.escalate_to_failed();
    assert_eq!(partial, PipelineStatus::Failed);

    let mut completed = PipelineStatus::Completed;
    completed.escalate_to_failed();
    assert_eq!(completed, PipelineStatus::Completed);
}

#[test]
fn skipped_condition_records_evaluation_without_running() {
    let exec = StageExecution::skipped_condition("deploy", 100);
    assert_eq!(exec.status, StageStatus::Skipped);
    assert_eq!(exec.condition_evaluated, Some(true));
    assert_eq!(exec.condition_result, Some(false));
}

#[test]
fn snapshot_is_independent_of_source() {
    let config = pipeline_config("demo", vec!["a"]);
    let state = PipelineState::new("r1", config, trigger("deadbeef", 0));
    let mut snap = state.snapshot();
    snap.status = PipelineStatus::Aborted;
    assert_eq!(state.status, PipelineStatus::Running);
    assert_ne!(snap.status, state.status);
}

#[test]
fn pipeline_state_roundtrips_through_json() {
    let config = pipeline_config("demo", vec!["a", "b"]);
    let mut state = PipelineState::new("r1", config, trigger("deadbeef", 0));
    state.stages.push(StageExecution::running("a", 0));
    let json = serde_json::to_string(&state).unwrap();
    let back: PipelineState = serde_json::from_str(&json).unwrap();
    assert_eq!(back.run_id, "r1");
    assert_eq!(back.stages.len(), 1);
}
