// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parallel Executor (spec §4.G): runs one execution group's stages, either
//! sequentially or concurrently. No stage inside a parallel group cancels
//! its siblings on failure — every launched stage is awaited to completion.

use pipeline_core::StageExecution;
use std::time::Duration;

/// Result of running one group, either sequentially or in parallel
/// (spec §4.G).
#[derive(Debug, Clone)]
pub struct GroupRunResult {
    /// Declaration order of the input list is preserved regardless of
    /// completion order (spec §4.G ordering guarantee).
    pub executions: Vec<StageExecution>,
    pub all_succeeded: bool,
    pub any_failed: bool,
    pub duration: Duration,
}

impl GroupRunResult {
    fn from_executions(executions: Vec<StageExecution>, duration: Duration) -> Self {
        let any_failed = executions
            .iter()
            .any(|e| e.status == pipeline_core::StageStatus::Failed);
        let all_succeeded = executions
            .iter()
            .all(|e| e.status == pipeline_core::StageStatus::Success);
        Self {
            executions,
            all_succeeded,
            any_failed,
            duration,
        }
    }

    /// `aggregateResults(result)`: `"k/n stages succeeded"` (spec §4.G).
    pub fn aggregate_summary(&self) -> String {
        let n = self.executions.len();
        let k = self
            .executions
            .iter()
            .filter(|e| e.status == pipeline_core::StageStatus::Success)
            .count();
        format!("{k}/{n} stages succeeded")
    }
}

/// Run `tasks` one at a time, in declared order. Used for sequential
/// groups and as the fallback for a single-stage group even when the
/// pipeline's execution mode is `parallel` (spec §4.G).
pub async fn execute_sequential<F, Fut>(tasks: Vec<F>) -> GroupRunResult
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = StageExecution>,
{
    let start = std::time::Instant::now();
    let mut executions = Vec::with_capacity(tasks.len());
    for task in tasks {
        executions.push(task().await);
    }
    GroupRunResult::from_executions(executions, start.elapsed())
}

/// Launch every task concurrently and await all of them, even after one
/// fails (spec §4.G: "No stage inside a parallel group cancels its
/// siblings on failure"). Declaration order of `tasks` is preserved in the
/// returned `executions`, not completion order.
pub async fn execute_parallel<F, Fut>(tasks: Vec<F>) -> GroupRunResult
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = StageExecution> + Send + 'static,
{
    let start = std::time::Instant::now();
    let handles: Vec<_> = tasks.into_iter().map(|task| tokio::spawn(task())).collect();
    let mut executions = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(exec) => executions.push(exec),
            Err(join_err) => {
                // A panicking stage task still must not cancel its siblings
                // or crash group dispatch; surface it as a failed stage.
                let mut exec = pipeline_core::StageExecution::running("unknown", 0);
                exec.status = pipeline_core::StageStatus::Failed;
                exec.error = Some(pipeline_core::StageError::runtime(format!(
                    "stage task panicked: {join_err}"
                )));
                executions.push(exec);
            }
        }
    }
    GroupRunResult::from_executions(executions, start.elapsed())
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
