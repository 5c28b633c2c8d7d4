// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_message_and_prefix_substitution() {
    let msg = pipeline_commit_message("review", "run-1", None, "[pipeline:{{stage}}]");
    assert!(msg.starts_with("[pipeline:review] Apply review changes"));
    assert!(msg.contains("Pipeline-Run-ID: run-1"));
    assert!(msg.contains("Pipeline-Stage: review"));
    assert!(msg.contains("Agent-Pipeline: true"));
}

#[test]
fn prefix_with_trailing_space_gets_no_extra_separator() {
    let msg = pipeline_commit_message("review", "run-1", None, "[pipeline:{{stage}}] ");
    assert!(msg.starts_with("[pipeline:review] Apply review changes"));
    assert!(!msg.starts_with("[pipeline:review]  Apply"));
}

#[test]
fn custom_message_overrides_default() {
    let msg = pipeline_commit_message("review", "run-1", Some("Fix lint"), "[pipeline:{{stage}}]");
    assert!(msg.starts_with("[pipeline:review] Fix lint"));
}

#[test]
fn trailers_appear_after_blank_line_in_declared_order() {
    let msg = commit_message(
        "subject",
        None,
        &[("A".to_string(), "1".to_string()), ("B".to_string(), "2".to_string())],
    );
    assert_eq!(msg, "subject\n\nA: 1\nB: 2");
}

#[test]
fn body_is_inserted_between_subject_and_trailers() {
    let msg = commit_message("subject", Some("body text"), &[("A".to_string(), "1".to_string())]);
    assert_eq!(msg, "subject\n\nbody text\n\nA: 1");
}
