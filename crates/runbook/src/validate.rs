// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Validator (spec §4.L): a priority-ordered set of rules run over a
//! loaded `PipelineConfig`, each producing zero or more `Finding` records.
//! Nothing here returns `Err` for a content problem — a pipeline with only
//! `warning`-severity findings is still runnable; one with any `error`
//! finding is not (the caller decides what to do with that).
//!
//! Grounded on the teacher's `runbook/validate.rs` in shape only (a
//! dedicated module of independent rule functions feeding one report), not
//! in content: the teacher's rules check shell-command syntax, which this
//! pipeline format has no equivalent of.

use pipeline_core::{BranchStrategy, ContextReductionStrategy, PipelineConfig};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// How serious a `Finding` is. `Error` findings mean the pipeline must not
/// run; `Warning` findings are surfaced but don't block execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One validation result, scoped to the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub field: String,
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Finding {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            severity: Severity::Error,
            message: message.into(),
            suggestion: None,
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            severity: Severity::Warning,
            message: message.into(),
            suggestion: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// A stage timeout past this many seconds is flagged as suspiciously long,
/// not rejected (spec §4.L).
const LONG_TIMEOUT_WARNING_SECS: u64 = 900;

const MAX_RETRY_ATTEMPTS: u32 = 10;
const MAX_RETRY_DELAY_SECS: u64 = 300;

const VALID_PERMISSION_MODES: &[&str] = &["default", "acceptEdits", "bypassPermissions", "plan"];

/// The report returned by `validate_pipeline`: every finding, in rule
/// priority order.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }
}

/// Run every rule over `config` and collect the findings. `repo_root` is
/// used to resolve agent file paths and, via `gh`/API-key checks, is
/// otherwise environment-dependent.
pub fn validate_pipeline(config: &PipelineConfig, repo_root: &Path) -> ValidationReport {
    let mut findings = Vec::new();

    validate_name(config, &mut findings);
    validate_agents_nonempty(config, &mut findings);
    validate_unique_stage_names(config, &mut findings);
    validate_agent_files_resolvable(config, repo_root, &mut findings);
    validate_depends_on_cycle_free(config, &mut findings);
    validate_timeouts(config, &mut findings);
    validate_commit_prefix(config, &mut findings);
    validate_context_reduction(config, &mut findings);
    validate_permission_mode(config, &mut findings);
    validate_conditions(config, &mut findings);
    validate_notifications(config, &mut findings);
    validate_retry_bounds(config, &mut findings);
    validate_environment(config, &mut findings);

    ValidationReport { findings }
}

fn name_pattern() -> regex::Regex {
    regex::Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$")
        .unwrap_or_else(|e| unreachable!("static name pattern must compile: {e}"))
}

fn valid_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

fn validate_name(config: &PipelineConfig, out: &mut Vec<Finding>) {
    if config.name.is_empty() {
        out.push(Finding::error("name", "pipeline name must not be empty"));
    } else if !valid_name(&config.name) {
        out.push(
            Finding::error(
                "name",
                format!(
                    "pipeline name {:?} must match [A-Za-z][A-Za-z0-9_-]*",
                    config.name
                ),
            )
            .with_suggestion("rename using only letters, digits, '_' and '-'"),
        );
    }
}

fn validate_agents_nonempty(config: &PipelineConfig, out: &mut Vec<Finding>) {
    if config.agents.is_empty() {
        out.push(Finding::error("agents", "pipeline has no stages"));
    }
    for stage in &config.agents {
        if !valid_name(&stage.name) {
            out.push(
                Finding::error(
                    "agents[].name",
                    format!(
                        "stage name {:?} must match [A-Za-z][A-Za-z0-9_-]*",
                        stage.name
                    ),
                )
                .with_suggestion("rename using only letters, digits, '_' and '-'"),
            );
        }
    }
}

fn validate_unique_stage_names(config: &PipelineConfig, out: &mut Vec<Finding>) {
    let mut seen = HashSet::new();
    for stage in &config.agents {
        if !seen.insert(stage.name.as_str()) {
            out.push(Finding::error(
                "agents[].name",
                format!("duplicate stage name {:?}", stage.name),
            ));
        }
    }
}

fn validate_agent_files_resolvable(config: &PipelineConfig, repo_root: &Path, out: &mut Vec<Finding>) {
    for stage in &config.agents {
        let path = repo_root.join(&stage.agent);
        if !path.is_file() {
            out.push(
                Finding::error(
                    "agents[].agent",
                    format!(
                        "stage {:?} references agent file {:?}, which does not exist",
                        stage.name, stage.agent
                    ),
                )
                .with_suggestion(format!("create {:?} relative to the repo root", stage.agent)),
            );
        }
    }
}

/// DFS-based cycle check over `dependsOn`. Deliberately reimplemented here
/// rather than depending on `pipeline-engine`'s planner, to avoid an
/// engine<->runbook dependency cycle (the engine has no reason to depend on
/// this crate, but a validator-only crate pulling in the whole execution
/// engine just for one graph check would be backwards).
fn validate_depends_on_cycle_free(config: &PipelineConfig, out: &mut Vec<Finding>) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        name: &'a str,
        config: &'a PipelineConfig,
        marks: &mut std::collections::HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match marks.get(name) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|s| *s == name).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(name.to_string());
                return Some(cycle);
            }
            None => {}
        }
        let Some(stage) = config.get_stage(name) else {
            return None;
        };
        marks.insert(name, Mark::Visiting);
        stack.push(name);
        for dep in &stage.depends_on {
            if let Some(cycle) = visit(dep, config, marks, stack) {
                return Some(cycle);
            }
        }
        stack.pop();
        marks.insert(name, Mark::Done);
        None
    }

    let mut marks = std::collections::HashMap::new();
    let mut reported = HashSet::new();
    for stage in &config.agents {
        let mut stack = Vec::new();
        if let Some(cycle) = visit(&stage.name, config, &mut marks, &mut stack) {
            let key = {
                let mut sorted = cycle.clone();
                sorted.sort();
                sorted.join(",")
            };
            if reported.insert(key) {
                out.push(Finding::error(
                    "agents[].dependsOn",
                    format!("dependency cycle: {}", cycle.join(" -> ")),
                ));
            }
        }
    }

    for stage in &config.agents {
        for dep in &stage.depends_on {
            if config.get_stage(dep).is_none() {
                out.push(Finding::error(
                    "agents[].dependsOn",
                    format!(
                        "stage {:?} depends on undefined stage {:?}",
                        stage.name, dep
                    ),
                ));
            }
        }
    }
}

fn validate_timeouts(config: &PipelineConfig, out: &mut Vec<Finding>) {
    let check = |field: &str, secs: u64, out: &mut Vec<Finding>| {
        if secs == 0 {
            out.push(Finding::error(field, "timeout must be greater than zero"));
        } else if secs > LONG_TIMEOUT_WARNING_SECS {
            out.push(Finding::warning(
                field,
                format!(
                    "timeout of {secs}s is unusually long (over {LONG_TIMEOUT_WARNING_SECS}s)"
                ),
            ));
        }
    };
    if let Some(secs) = config.default_timeout {
        check("defaultTimeout", secs, out);
    }
    for stage in &config.agents {
        if let Some(secs) = stage.timeout {
            check("agents[].timeout", secs, out);
        }
    }
}

fn validate_commit_prefix(config: &PipelineConfig, out: &mut Vec<Finding>) {
    if config.commit.auto_commit && !config.commit.prefix.contains("{{stage}}") {
        out.push(
            Finding::warning(
                "commit.prefix",
                "commit prefix does not contain the {{stage}} placeholder",
            )
            .with_suggestion("include {{stage}} so each commit message identifies its stage"),
        );
    }
}

fn validate_context_reduction(config: &PipelineConfig, out: &mut Vec<Finding>) {
    let policy = &config.context_reduction;
    if policy.strategy == ContextReductionStrategy::None
        && (policy.trigger_threshold.is_some() || policy.max_tokens.is_some())
    {
        out.push(Finding::warning(
            "contextReduction.strategy",
            "trigger/max token bounds are set but strategy is \"none\", so they have no effect",
        ));
    }
    if let (Some(trigger), Some(max)) = (policy.trigger_threshold, policy.max_tokens) {
        if trigger > max {
            out.push(Finding::error(
                "contextReduction.triggerThreshold",
                format!(
                    "triggerThreshold ({trigger}) must be <= maxTokens ({max})"
                ),
            ));
        }
    }
}

fn validate_permission_mode(config: &PipelineConfig, out: &mut Vec<Finding>) {
    let Some(mode) = &config.permission_mode else {
        return;
    };
    if !VALID_PERMISSION_MODES.contains(&mode.as_str()) {
        out.push(
            Finding::error(
                "permissionMode",
                format!(
                    "unrecognized permissionMode {mode:?}; must be one of: {}",
                    VALID_PERMISSION_MODES.join(", ")
                ),
            ),
        );
    } else if mode == "bypassPermissions" {
        out.push(Finding::warning(
            "permissionMode",
            "bypassPermissions disables all tool-use confirmation for this pipeline's stages",
        ));
    }
}

fn validate_conditions(config: &PipelineConfig, out: &mut Vec<Finding>) {
    let stage_names: HashSet<&str> = config.agents.iter().map(|s| s.name.as_str()).collect();
    for stage in &config.agents {
        let Some(raw) = &stage.condition else {
            continue;
        };
        let inner = pipeline_condition::strip_braces(raw);
        match pipeline_condition::validate_expression(inner) {
            Err(e) => {
                out.push(Finding::error(
                    "agents[].condition",
                    format!("stage {:?} has an invalid condition: {e}", stage.name),
                ));
                continue;
            }
            Ok(()) => {}
        }
        match pipeline_condition::extract_stage_references(inner) {
            Ok(refs) => {
                for referenced in refs {
                    if !stage_names.contains(referenced.as_str()) {
                        out.push(Finding::error(
                            "agents[].condition",
                            format!(
                                "stage {:?} condition references undefined stage {:?}",
                                stage.name, referenced
                            ),
                        ));
                    }
                }
            }
            Err(e) => {
                out.push(Finding::error(
                    "agents[].condition",
                    format!("stage {:?} has an invalid condition: {e}", stage.name),
                ));
            }
        }
    }
}

fn validate_notifications(config: &PipelineConfig, out: &mut Vec<Finding>) {
    if let Some(url) = &config.notifications.slack_webhook {
        if !url.starts_with("https://hooks.slack.com/") {
            out.push(
                Finding::error(
                    "notifications.slackWebhook",
                    "Slack webhook URL must start with https://hooks.slack.com/",
                )
                .with_suggestion("copy the webhook URL from the Slack app's Incoming Webhooks page"),
            );
        }
    }
}

fn validate_retry_bounds(config: &PipelineConfig, out: &mut Vec<Finding>) {
    for stage in &config.agents {
        let Some(retry) = &stage.retry else {
            continue;
        };
        if retry.max_attempts > MAX_RETRY_ATTEMPTS {
            out.push(Finding::error(
                "agents[].retry.maxAttempts",
                format!(
                    "stage {:?} retry.maxAttempts ({}) exceeds the maximum of {MAX_RETRY_ATTEMPTS}",
                    stage.name, retry.max_attempts
                ),
            ));
        }
        if retry.delay > MAX_RETRY_DELAY_SECS {
            out.push(Finding::error(
                "agents[].retry.delay",
                format!(
                    "stage {:?} retry.delay ({}s) exceeds the maximum of {MAX_RETRY_DELAY_SECS}s",
                    stage.name, retry.delay
                ),
            ));
        }
    }
}

/// Environmental preconditions, validated only when the relevant feature is
/// enabled (spec §4.L): an API key for running any stage at all, and `gh`
/// installed and authenticated when PR auto-create is on.
fn validate_environment(config: &PipelineConfig, out: &mut Vec<Finding>) {
    if !config.agents.is_empty() && !pipeline_adapters::has_api_key() {
        out.push(
            Finding::error(
                "environment",
                "no agent runtime API key found (ANTHROPIC_API_KEY or CLAUDE_API_KEY)",
            )
            .with_suggestion("set ANTHROPIC_API_KEY in the environment before running"),
        );
    }

    if config.branch.strategy != BranchStrategy::None && config.branch.auto_create_pr {
        match gh_auth_status() {
            Ok(()) => {}
            Err(message) => out.push(
                Finding::error("branch.autoCreatePr", message)
                    .with_suggestion("install the gh CLI and run `gh auth login`"),
            ),
        }
    }
}

fn gh_auth_status() -> Result<(), String> {
    let output = std::process::Command::new("gh")
        .args(["auth", "status"])
        .output();
    match output {
        Ok(out) if out.status.success() => Ok(()),
        Ok(_) => Err("`gh auth status` failed; the gh CLI is installed but not authenticated".to_string()),
        Err(_) => Err("the gh CLI is not installed, but branch.autoCreatePr is enabled".to_string()),
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
