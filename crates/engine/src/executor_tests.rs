use super::*;
use pipeline_adapters::FakeAgentRuntime;
use pipeline_core::test_support::{pipeline_config, stage};
use pipeline_core::{ConditionContext, FakeClock, TriggerKind};
use std::process::Command as StdCommand;
use tempfile::TempDir;

fn init_repo() -> (TempDir, GitAdapter) {
    let dir = tempfile::tempdir().unwrap();
    let run = |args: &[&str]| {
        let status = StdCommand::new("git")
            .args(args)
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    };
    run(&["init", "-q"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "Test"]);
    std::fs::write(dir.path().join("README.md"), "hi").unwrap();
    run(&["add", "-A"]);
    run(&["commit", "-q", "-m", "init"]);
    let adapter = GitAdapter::new(dir.path());
    (dir, adapter)
}

fn template(dir: &Path) -> TemplateContext {
    let _ = dir;
    TemplateContext {
        pipeline_name: "release".to_string(),
        run_id: "run-1".to_string(),
        trigger: TriggerKind::Manual,
        timestamp_ms: 0,
        base_branch: "main".to_string(),
        branch: "main".to_string(),
        initial_commit: "abc".to_string(),
    }
}

fn write_agent_file(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let agents_dir = dir.path().join(".agent-pipeline/agents");
    std::fs::create_dir_all(&agents_dir).unwrap();
    let path = agents_dir.join(format!("{name}.md"));
    std::fs::write(&path, format!("Prompt for {name}")).unwrap();
    std::path::PathBuf::from(".agent-pipeline/agents").join(format!("{name}.md"))
}

#[tokio::test]
async fn successful_stage_is_recorded_success_with_no_commit() {
    let (dir, git) = init_repo();
    let agent_path = write_agent_file(&dir, "review");
    let mut cfg = stage("review");
    cfg.agent = agent_path;
    let mut pipeline = pipeline_config("p", vec!["review"]);
    pipeline.agents[0] = cfg.clone();
    let runtime = FakeAgentRuntime::new();
    runtime.push_success("looks good", vec!["read: a.rs"]);
    let handover = HandoverManager::new(dir.path().join(".agent-pipeline/runs/run-1")).unwrap();
    let cancellation = CancellationToken::new();
    let tmpl = template(dir.path());
    let run_ctx = StageRunContext {
        run_id: "run-1",
        cwd: dir.path(),
        git: &git,
        handover: &handover,
        runtime: &runtime,
        cancellation: &cancellation,
        template: &tmpl,
    };
    let clock = FakeClock::new();
    let ctx = ConditionContext::new();

    let exec = execute_stage(&cfg, &pipeline, &ctx, &run_ctx, &clock, |_| {}).await;

    assert_eq!(exec.status, StageStatus::Success);
    assert!(exec.commit_sha.is_none());
    assert!(exec.error.is_none());
    let call = runtime.calls().into_iter().next().unwrap();
    assert!(call.prompt.contains("Prompt for review"));
}

#[tokio::test]
async fn auto_commit_records_sha_when_output_changes_files() {
    let (dir, git) = init_repo();
    let agent_path = write_agent_file(&dir, "format");
    let mut cfg = stage("format");
    cfg.agent = agent_path;
    let mut pipeline = pipeline_config("p", vec!["format"]);
    pipeline.commit.auto_commit = true;
    pipeline.agents[0] = cfg.clone();

    let runtime = FakeAgentRuntime::new();
    runtime.push_success("did formatting", vec![]);
    let handover = HandoverManager::new(dir.path().join(".agent-pipeline/runs/run-1")).unwrap();
    let cancellation = CancellationToken::new();
    let tmpl = template(dir.path());
    let run_ctx = StageRunContext {
        run_id: "run-1",
        cwd: dir.path(),
        git: &git,
        handover: &handover,
        runtime: &runtime,
        cancellation: &cancellation,
        template: &tmpl,
    };
    let clock = FakeClock::new();
    let ctx = ConditionContext::new();

    // Mutate the working tree so there's something to commit.
    std::fs::write(dir.path().join("formatted.txt"), "x").unwrap();

    let exec = execute_stage(&cfg, &pipeline, &ctx, &run_ctx, &clock, |_| {}).await;

    assert_eq!(exec.status, StageStatus::Success);
    assert!(exec.commit_sha.as_deref().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn false_condition_skips_without_invoking_runtime() {
    let (dir, git) = init_repo();
    let agent_path = write_agent_file(&dir, "deploy");
    let mut cfg = stage("deploy");
    cfg.agent = agent_path;
    cfg.condition = Some("{{ stages.review.outputs.passed }}".to_string());
    let pipeline = pipeline_config("p", vec!["deploy"]);
    let runtime = FakeAgentRuntime::new();
    runtime.push_success("should not run", vec![]);
    let handover = HandoverManager::new(dir.path().join(".agent-pipeline/runs/run-1")).unwrap();
    let cancellation = CancellationToken::new();
    let tmpl = template(dir.path());
    let run_ctx = StageRunContext {
        run_id: "run-1",
        cwd: dir.path(),
        git: &git,
        handover: &handover,
        runtime: &runtime,
        cancellation: &cancellation,
        template: &tmpl,
    };
    let clock = FakeClock::new();
    let mut ctx = ConditionContext::new();
    ctx.insert_stage(
        "review",
        [("passed".to_string(), serde_json::json!(false))]
            .into_iter()
            .collect(),
    );

    let exec = execute_stage(&cfg, &pipeline, &ctx, &run_ctx, &clock, |_| {}).await;

    assert_eq!(exec.status, StageStatus::Skipped);
    assert_eq!(exec.condition_evaluated, Some(true));
    assert_eq!(exec.condition_result, Some(false));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn runtime_failure_retries_then_succeeds() {
    let (dir, git) = init_repo();
    let agent_path = write_agent_file(&dir, "flaky");
    let mut cfg = stage("flaky");
    cfg.agent = agent_path;
    cfg.retry = Some(pipeline_core::RetryPolicy {
        max_attempts: 3,
        delay: 0,
    });
    let pipeline = pipeline_config("p", vec!["flaky"]);
    let runtime = FakeAgentRuntime::new();
    runtime.push_failure("transient network error");
    runtime.push_success("recovered", vec![]);
    let handover = HandoverManager::new(dir.path().join(".agent-pipeline/runs/run-1")).unwrap();
    let cancellation = CancellationToken::new();
    let tmpl = template(dir.path());
    let run_ctx = StageRunContext {
        run_id: "run-1",
        cwd: dir.path(),
        git: &git,
        handover: &handover,
        runtime: &runtime,
        cancellation: &cancellation,
        template: &tmpl,
    };
    let clock = FakeClock::new();
    let ctx = ConditionContext::new();

    let exec = execute_stage(&cfg, &pipeline, &ctx, &run_ctx, &clock, |_| {}).await;

    assert_eq!(exec.status, StageStatus::Success);
    assert_eq!(runtime.calls().len(), 2);
}

#[tokio::test]
async fn already_cancelled_token_aborts_without_invoking_runtime() {
    let (dir, git) = init_repo();
    let agent_path = write_agent_file(&dir, "noop");
    let mut cfg = stage("noop");
    cfg.agent = agent_path;
    let pipeline = pipeline_config("p", vec!["noop"]);
    let runtime = FakeAgentRuntime::new();
    let handover = HandoverManager::new(dir.path().join(".agent-pipeline/runs/run-1")).unwrap();
    let cancellation = CancellationToken::new();
    cancellation.cancel();
    let tmpl = template(dir.path());
    let run_ctx = StageRunContext {
        run_id: "run-1",
        cwd: dir.path(),
        git: &git,
        handover: &handover,
        runtime: &runtime,
        cancellation: &cancellation,
        template: &tmpl,
    };
    let clock = FakeClock::new();
    let ctx = ConditionContext::new();

    let exec = execute_stage(&cfg, &pipeline, &ctx, &run_ctx, &clock, |_| {}).await;

    assert_eq!(exec.status, StageStatus::Failed);
    assert_eq!(exec.error.as_ref().unwrap().code, Some(ErrorCode::Aborted));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn successful_stage_parses_outputs_trailer_block() {
    let (dir, git) = init_repo();
    let agent_path = write_agent_file(&dir, "review");
    let mut cfg = stage("review");
    cfg.agent = agent_path;
    let pipeline = pipeline_config("p", vec!["review"]);
    let runtime = FakeAgentRuntime::new();
    runtime.push_success(
        "Reviewed the change, looks good.\n\nOutputs:\npassed: true\nscore: 0.9\nreviewer: alice\n",
        vec![],
    );
    let handover = HandoverManager::new(dir.path().join(".agent-pipeline/runs/run-1")).unwrap();
    let cancellation = CancellationToken::new();
    let tmpl = template(dir.path());
    let run_ctx = StageRunContext {
        run_id: "run-1",
        cwd: dir.path(),
        git: &git,
        handover: &handover,
        runtime: &runtime,
        cancellation: &cancellation,
        template: &tmpl,
    };
    let clock = FakeClock::new();
    let ctx = ConditionContext::new();

    let exec = execute_stage(&cfg, &pipeline, &ctx, &run_ctx, &clock, |_| {}).await;

    assert_eq!(exec.status, StageStatus::Success);
    assert_eq!(exec.outputs.get("passed"), Some(&serde_json::json!(true)));
    assert_eq!(exec.outputs.get("score"), Some(&serde_json::json!(0.9)));
    assert_eq!(
        exec.outputs.get("reviewer"),
        Some(&serde_json::json!("alice"))
    );
}

#[tokio::test]
async fn stage_output_without_trailer_has_no_outputs() {
    let (dir, git) = init_repo();
    let agent_path = write_agent_file(&dir, "review");
    let mut cfg = stage("review");
    cfg.agent = agent_path;
    let pipeline = pipeline_config("p", vec!["review"]);
    let runtime = FakeAgentRuntime::new();
    runtime.push_success("Just prose, no trailer block here.", vec![]);
    let handover = HandoverManager::new(dir.path().join(".agent-pipeline/runs/run-1")).unwrap();
    let cancellation = CancellationToken::new();
    let tmpl = template(dir.path());
    let run_ctx = StageRunContext {
        run_id: "run-1",
        cwd: dir.path(),
        git: &git,
        handover: &handover,
        runtime: &runtime,
        cancellation: &cancellation,
        template: &tmpl,
    };
    let clock = FakeClock::new();
    let ctx = ConditionContext::new();

    let exec = execute_stage(&cfg, &pipeline, &ctx, &run_ctx, &clock, |_| {}).await;

    assert!(exec.outputs.is_empty());
}

#[test]
fn record_activity_truncates_to_last_three() {
    let mut exec = StageExecution::running("s", 0);
    for i in 0..5 {
        record_activity(&mut exec, i, format!("tool-{i}"));
    }
    assert_eq!(exec.tool_activity.len(), 3);
    assert_eq!(exec.tool_activity[0].summary, "tool-2");
    assert_eq!(exec.tool_activity[2].summary, "tool-4");
}
