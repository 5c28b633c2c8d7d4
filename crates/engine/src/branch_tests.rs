// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::process::Command;
use tempfile::TempDir;

fn init_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let run = |args: &[&str]| {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(status.success());
    };
    run(&["init", "-q"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "test"]);
    std::fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    run(&["add", "-A"]);
    run(&["commit", "-q", "-m", "initial"]);
    dir
}

#[tokio::test]
async fn none_strategy_returns_no_branch_or_worktree() {
    let dir = init_repo();
    let git = GitAdapter::new(dir.path());
    let policy = BranchPolicy::default();
    let setup = setup_pipeline_branch(&git, "demo", "run-1", &policy).await.unwrap();
    assert!(setup.branch.is_none());
    assert!(setup.worktree_path.is_none());
}

#[tokio::test]
async fn ephemeral_without_isolation_names_branch_but_creates_no_worktree() {
    let dir = init_repo();
    let git = GitAdapter::new(dir.path());
    let policy = BranchPolicy {
        strategy: BranchStrategy::Ephemeral,
        branch_prefix: Some("agent-pipeline".to_string()),
        isolate: false,
        ..BranchPolicy::default()
    };
    let setup = setup_pipeline_branch(&git, "demo", "run-1", &policy).await.unwrap();
    assert_eq!(setup.branch.as_deref(), Some("agent-pipeline/run-1"));
    assert!(setup.worktree_path.is_none());
}

#[tokio::test]
async fn ephemeral_with_isolation_creates_worktree() {
    let dir = init_repo();
    let git = GitAdapter::new(dir.path());
    let policy = BranchPolicy {
        strategy: BranchStrategy::Ephemeral,
        branch_prefix: Some("agent-pipeline".to_string()),
        isolate: true,
        ..BranchPolicy::default()
    };
    let setup = setup_pipeline_branch(&git, "demo", "run-42", &policy).await.unwrap();
    assert_eq!(setup.branch.as_deref(), Some("agent-pipeline/run-42"));
    let worktree_path = setup.worktree_path.clone().unwrap();
    assert!(worktree_path.ends_with("run-42"));
    assert!(worktree_path.exists());

    teardown(&git, &setup, &policy).await;
    assert!(!worktree_path.exists());
}
