// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared context shape for the Condition Evaluator (spec §4.D), kept here
//! so both `pipeline-engine` and `pipeline-condition` depend on one
//! definition instead of the engine depending on the evaluator crate for a
//! single struct.

use crate::state::StageExecution;
use serde_json::Value;
use std::collections::HashMap;

/// Read-only view over prior stages' outputs, keyed by stage name. The
/// Condition Evaluator resolves `stages.<name>.outputs.<key>` against this.
#[derive(Debug, Clone, Default)]
pub struct ConditionContext {
    stages: HashMap<String, HashMap<String, Value>>,
}

impl ConditionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from the stages recorded so far in a run. Skipped and
    /// failed stages contribute no outputs, which is intentional: a
    /// condition referencing them resolves as a missing reference (spec
    /// §9 Open Question: skipped prerequisite outputs are absent).
    pub fn from_stages(stages: &[StageExecution]) -> Self {
        let mut ctx = Self::new();
        for stage in stages {
            if !stage.outputs.is_empty() {
                ctx.stages
                    .insert(stage.stage_name.clone(), stage.outputs.clone());
            }
        }
        ctx
    }

    pub fn insert_stage(&mut self, name: impl Into<String>, outputs: HashMap<String, Value>) {
        self.stages.insert(name.into(), outputs);
    }

    pub fn lookup(&self, stage: &str, key: &str) -> Option<&Value> {
        self.stages.get(stage).and_then(|o| o.get(key))
    }

    pub fn has_stage(&self, stage: &str) -> bool {
        self.stages.contains_key(stage)
    }
}

#[cfg(test)]
#[path = "condition_types_tests.rs"]
mod tests;
