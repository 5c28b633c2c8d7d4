// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The execution plan produced by the DAG Planner (spec §4.E).

use crate::stage::AgentStageConfig;
use serde::{Deserialize, Serialize};

/// One topological level: stages that are mutually independent and may run
/// concurrently. Declaration order within a level is preserved as the
/// tie-break for deterministic execution traces (spec §4.E).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionGroup {
    /// 0-based topological level.
    pub level: usize,
    pub stages: Vec<AgentStageConfig>,
}

impl ExecutionGroup {
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }
}

/// The full plan: an ordered list of `ExecutionGroup`s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionGraph {
    pub groups: Vec<ExecutionGroup>,
}

impl ExecutionGraph {
    pub fn new(groups: Vec<ExecutionGroup>) -> Self {
        Self { groups }
    }

    /// `maxParallelism = max(|group.stages|)` (spec §3).
    pub fn max_parallelism(&self) -> usize {
        self.groups.iter().map(|g| g.stages.len()).max().unwrap_or(0)
    }

    pub fn total_stages(&self) -> usize {
        self.groups.iter().map(|g| g.stages.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
