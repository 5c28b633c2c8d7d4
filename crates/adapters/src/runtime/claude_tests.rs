// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pipeline_core::CancellationToken;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

fn request() -> ExecuteRequest {
    ExecuteRequest {
        prompt: "do the thing".into(),
        cwd: PathBuf::from("."),
        cancellation: CancellationToken::new(),
        options: super::super::ExecuteOptions::default(),
        on_activity: None,
    }
}

#[test]
fn summarize_tool_use_formats_read() {
    let block = serde_json::json!({"name": "Read", "input": {"file_path": "src/lib.rs"}});
    assert_eq!(summarize_tool_use(&block).unwrap(), "read: src/lib.rs");
}

#[test]
fn summarize_tool_use_formats_bash_with_command() {
    let block = serde_json::json!({"name": "Bash", "input": {"command": "cargo test"}});
    assert_eq!(summarize_tool_use(&block).unwrap(), "bash: cargo test");
}

#[test]
fn summarize_tool_use_falls_back_for_unknown_tools() {
    let block = serde_json::json!({"name": "Grep", "input": {"pattern": "foo"}});
    assert!(summarize_tool_use(&block).unwrap().starts_with("grep: "));
}

#[test]
fn process_event_accumulates_text_and_emits_activity() {
    let activities = Arc::new(Mutex::new(Vec::new()));
    let activities_clone = activities.clone();
    let mut req = request();
    req.on_activity = Some(Box::new(move |event| {
        activities_clone.lock().unwrap().push(event.0);
    }));

    let mut text = String::new();
    let mut usage = None;

    let assistant_event = serde_json::json!({
        "type": "assistant",
        "message": {
            "content": [
                {"type": "text", "text": "hello "},
                {"type": "tool_use", "name": "Read", "input": {"file_path": "a.rs"}},
            ]
        }
    });
    process_event(&assistant_event, &req, &mut text, &mut usage);

    let result_event = serde_json::json!({
        "type": "result",
        "usage": {"input_tokens": 10, "output_tokens": 20},
    });
    process_event(&result_event, &req, &mut text, &mut usage);

    assert_eq!(text, "hello ");
    assert_eq!(
        usage,
        Some(RuntimeTokenUsage {
            input_tokens: 10,
            output_tokens: 20
        })
    );
    assert_eq!(activities.lock().unwrap().as_slice(), ["read: a.rs"]);
}

#[test]
fn process_event_falls_back_to_result_text_when_no_assistant_text() {
    let req = request();
    let mut text = String::new();
    let mut usage = None;
    let result_event = serde_json::json!({"type": "result", "result": "final answer"});
    process_event(&result_event, &req, &mut text, &mut usage);
    assert_eq!(text, "final answer");
}
