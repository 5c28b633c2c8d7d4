// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt assembly for the Stage Executor (spec §4.F.1): handover context +
//! agent prompt file contents + a small template context.

use pipeline_core::TriggerKind;

/// The small template context appended to every stage prompt (spec §4.F.1).
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub pipeline_name: String,
    pub run_id: String,
    pub trigger: TriggerKind,
    pub timestamp_ms: u64,
    pub base_branch: String,
    pub branch: String,
    pub initial_commit: String,
}

impl TemplateContext {
    fn render(&self) -> String {
        format!(
            "pipelineName: {}\nrunId: {}\ntrigger: {:?}\ntimestamp: {}\nbaseBranch: {}\nbranch: {}\ninitialCommit: {}\n",
            self.pipeline_name,
            self.run_id,
            self.trigger,
            self.timestamp_ms,
            self.base_branch,
            self.branch,
            self.initial_commit,
        )
    }
}

/// Concatenate handover context, the agent's own prompt file, and the
/// template context into one prompt string (spec §4.F.1).
pub fn build_prompt(handover_context: &str, agent_prompt: &str, ctx: &TemplateContext) -> String {
    let mut out = String::new();
    if !handover_context.is_empty() {
        out.push_str(handover_context);
        out.push('\n');
    }
    out.push_str(agent_prompt);
    out.push_str("\n\n## Run context\n\n");
    out.push_str(&ctx.render());
    out
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
