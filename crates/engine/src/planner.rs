// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DAG Planner (spec §4.E): Kahn's-algorithm topological layering of
//! `AgentStageConfig`s into an `ExecutionGraph`, generalized from the
//! teacher's linear `on_done`/`on_fail` step chain to a `dependsOn`-based
//! DAG.

use pipeline_core::{AgentStageConfig, ExecutionGraph, ExecutionGroup};
use std::collections::{HashMap, HashSet};

/// Non-fatal findings surfaced alongside the plan. `Cycle` names the
/// participating stage set so the caller can report it, but the planner
/// still returns a best-effort graph that excludes the cyclic component
/// (spec §4.E).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerIssue {
    /// A cycle (or a stage whose `dependsOn` can never be satisfied, e.g. an
    /// unknown stage name) was detected. `stages` is excluded from the
    /// returned graph.
    Cycle { stages: Vec<String> },
    /// An `enabled: false` stage is a `dependsOn` target of an enabled
    /// stage: downstream may never observe its outputs (spec §4.E, §9 Open
    /// Question — the dependent still runs; its condition sees the
    /// prerequisite's outputs as missing).
    DisabledDependencyOfEnabled {
        disabled: String,
        dependents: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct PlanResult {
    pub graph: ExecutionGraph,
    pub issues: Vec<PlannerIssue>,
}

/// Build an `ExecutionGraph` from the pipeline's declared stages.
///
/// Stages referencing an unknown `dependsOn` name are treated the same as a
/// cyclic dependency: they can never become ready, so they land in the same
/// `PlannerIssue::Cycle` report (the Validator, §4.L, is the layer that
/// turns an unknown reference into a hard pre-run error; the planner's job
/// here is only to produce a frame for that error and a graph that still
/// makes progress on everything else).
pub fn plan(stages: &[AgentStageConfig]) -> PlanResult {
    let declared_order: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
    let by_name: HashMap<&str, &AgentStageConfig> =
        stages.iter().map(|s| (s.name.as_str(), s)).collect();

    // Remaining in-degree: count only dependencies that name a real stage.
    let mut remaining_deps: HashMap<&str, HashSet<&str>> = HashMap::new();
    for stage in stages {
        let deps: HashSet<&str> = stage
            .depends_on
            .iter()
            .map(String::as_str)
            .filter(|d| by_name.contains_key(d))
            .collect();
        remaining_deps.insert(stage.name.as_str(), deps);
    }

    let mut resolved: HashSet<&str> = HashSet::new();
    let mut groups: Vec<ExecutionGroup> = Vec::new();
    let mut level = 0usize;

    loop {
        let ready: Vec<&str> = declared_order
            .iter()
            .copied()
            .filter(|name| {
                !resolved.contains(name)
                    && remaining_deps
                        .get(name)
                        .is_some_and(|deps| deps.iter().all(|d| resolved.contains(d)))
            })
            .collect();

        if ready.is_empty() {
            break;
        }

        let group_stages: Vec<AgentStageConfig> = ready
            .iter()
            .map(|name| by_name[name].clone())
            .collect();
        groups.push(ExecutionGroup {
            level,
            stages: group_stages,
        });
        level += 1;
        for name in ready {
            resolved.insert(name);
        }
    }

    let mut issues = Vec::new();
    let unresolved: Vec<String> = declared_order
        .iter()
        .filter(|name| !resolved.contains(*name))
        .map(|s| s.to_string())
        .collect();
    if !unresolved.is_empty() {
        issues.push(PlannerIssue::Cycle { stages: unresolved });
    }

    // Disabled-dependency-of-enabled warning: only meaningful for stages
    // that made it into the graph (disabled stages still occupy a level —
    // the Group Orchestrator filters them out at dispatch time, spec §4.H.1).
    for stage in stages {
        if !stage.enabled {
            let dependents: Vec<String> = stages
                .iter()
                .filter(|s| s.enabled && s.depends_on.iter().any(|d| d == &stage.name))
                .map(|s| s.name.clone())
                .collect();
            if !dependents.is_empty() {
                issues.push(PlannerIssue::DisabledDependencyOfEnabled {
                    disabled: stage.name.clone(),
                    dependents,
                });
            }
        }
    }

    PlanResult {
        graph: ExecutionGraph::new(groups),
        issues,
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
