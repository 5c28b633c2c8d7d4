use super::*;
use pipeline_core::test_support::{pipeline_config, stage, stage_depending_on};
use pipeline_core::{BranchPolicy, BranchStrategy, RetryPolicy};
use serial_test::serial;
use tempfile::TempDir;

fn repo_with_agents(names: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("agents")).unwrap();
    for n in names {
        std::fs::write(dir.path().join(format!("agents/{n}.md")), "# prompt\n").unwrap();
    }
    dir
}

#[test]
#[serial]
fn valid_minimal_pipeline_has_no_findings() {
    std::env::set_var("ANTHROPIC_API_KEY", "sk-test");
    let dir = repo_with_agents(&["a", "b"]);
    let config = pipeline_config("demo", vec!["a", "b"]);
    let report = validate_pipeline(&config, dir.path());
    assert!(
        !report.has_errors(),
        "unexpected errors: {:?}",
        report.errors().collect::<Vec<_>>()
    );
    std::env::remove_var("ANTHROPIC_API_KEY");
}

#[test]
fn empty_name_is_an_error() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.name = String::new();
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "name"));
}

#[test]
fn missing_agent_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = pipeline_config("demo", vec!["a"]);
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "agents[].agent"));
}

#[test]
fn duplicate_stage_names_are_an_error() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.agents.push(stage("a"));
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "agents[].name"));
}

#[test]
fn direct_dependency_cycle_is_detected() {
    let dir = repo_with_agents(&["a", "b"]);
    let mut config = pipeline_config("demo", vec!["a", "b"]);
    config.agents = vec![
        stage_depending_on("a", &["b"]),
        stage_depending_on("b", &["a"]),
    ];
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "agents[].dependsOn"));
}

#[test]
fn dependency_on_undefined_stage_is_an_error() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.agents = vec![stage_depending_on("a", &["missing"])];
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "agents[].dependsOn"));
}

#[test]
fn zero_timeout_is_an_error_and_long_timeout_is_a_warning() {
    let dir = repo_with_agents(&["a", "b"]);
    let mut config = pipeline_config("demo", vec!["a", "b"]);
    config.agents[0].timeout = Some(0);
    config.agents[1].timeout = Some(3600);
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "agents[].timeout"));
    assert!(report.warnings().any(|f| f.field == "agents[].timeout"));
}

#[test]
fn commit_prefix_without_placeholder_warns_only_when_auto_commit_is_on() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.commit.prefix = "no placeholder here".to_string();
    let report = validate_pipeline(&config, dir.path());
    assert!(!report.warnings().any(|f| f.field == "commit.prefix"));

    config.commit.auto_commit = true;
    let report = validate_pipeline(&config, dir.path());
    assert!(report.warnings().any(|f| f.field == "commit.prefix"));
}

#[test]
fn context_reduction_threshold_above_max_tokens_is_an_error() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.context_reduction.strategy = ContextReductionStrategy::Truncate;
    config.context_reduction.trigger_threshold = Some(9000);
    config.context_reduction.max_tokens = Some(8000);
    let report = validate_pipeline(&config, dir.path());
    assert!(report
        .errors()
        .any(|f| f.field == "contextReduction.triggerThreshold"));
}

#[test]
fn bypass_permissions_mode_warns() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.permission_mode = Some("bypassPermissions".to_string());
    let report = validate_pipeline(&config, dir.path());
    assert!(report.warnings().any(|f| f.field == "permissionMode"));
}

#[test]
fn unknown_permission_mode_is_an_error() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.permission_mode = Some("godmode".to_string());
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "permissionMode"));
}

#[test]
fn condition_referencing_unknown_stage_is_an_error() {
    let dir = repo_with_agents(&["a", "b"]);
    let mut config = pipeline_config("demo", vec!["a", "b"]);
    config.agents[1].condition = Some("{{ stages.ghost.outputs.ok == \"true\" }}".to_string());
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "agents[].condition"));
}

#[test]
fn malformed_condition_is_an_error() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.agents[0].condition = Some("{{ && }}".to_string());
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "agents[].condition"));
}

#[test]
fn non_slack_webhook_url_is_an_error() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.notifications.slack_webhook = Some("https://evil.example.com/hook".to_string());
    let report = validate_pipeline(&config, dir.path());
    assert!(report
        .errors()
        .any(|f| f.field == "notifications.slackWebhook"));
}

#[test]
fn retry_bounds_are_enforced() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.agents[0].retry = Some(RetryPolicy {
        max_attempts: 50,
        delay: 1000,
    });
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "agents[].retry.maxAttempts"));
    assert!(report.errors().any(|f| f.field == "agents[].retry.delay"));
}

#[test]
#[serial]
fn missing_api_key_is_an_error() {
    std::env::remove_var("ANTHROPIC_API_KEY");
    std::env::remove_var("CLAUDE_API_KEY");
    let dir = repo_with_agents(&["a"]);
    let config = pipeline_config("demo", vec!["a"]);
    let report = validate_pipeline(&config, dir.path());
    assert!(report.errors().any(|f| f.field == "environment"));
}

#[test]
fn auto_create_pr_without_branch_isolation_skips_gh_check() {
    let dir = repo_with_agents(&["a"]);
    let mut config = pipeline_config("demo", vec!["a"]);
    config.branch = BranchPolicy {
        strategy: BranchStrategy::None,
        auto_create_pr: true,
        ..BranchPolicy::default()
    };
    let report = validate_pipeline(&config, dir.path());
    assert!(!report.errors().any(|f| f.field == "branch.autoCreatePr"));
}
