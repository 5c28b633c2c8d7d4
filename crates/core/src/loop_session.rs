// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LoopSession` and `LoopIteration` (spec §3, §4.J): state owned by the
//! outer Loop Scheduler, one level above a single Runner execution.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopSessionStatus {
    InProgress,
    Completed,
    Failed,
    LimitReached,
    Aborted,
}

impl LoopSessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, LoopSessionStatus::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationStatus {
    InProgress,
    Completed,
    Failed,
}

/// Where a queued pipeline file came from (spec §4.J.1, §4.J.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopSourceType {
    /// The pipeline the user invoked directly; never moved between
    /// directories regardless of outcome.
    Library,
    /// A pipeline file picked up from `pending/`.
    LoopPending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopIteration {
    pub iteration_number: u32,
    pub pipeline_name: String,
    pub run_id: String,
    pub status: IterationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub triggered_next: bool,
    pub source_type: LoopSourceType,
}

impl LoopIteration {
    pub fn start(
        iteration_number: u32,
        pipeline_name: impl Into<String>,
        run_id: impl Into<String>,
        source_type: LoopSourceType,
    ) -> Self {
        Self {
            iteration_number,
            pipeline_name: pipeline_name.into(),
            run_id: run_id.into(),
            status: IterationStatus::InProgress,
            duration_ms: None,
            triggered_next: false,
            source_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopSession {
    pub session_id: String,
    pub start_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time_ms: Option<u64>,
    pub status: LoopSessionStatus,
    pub max_iterations: u32,
    #[serde(default)]
    pub total_iterations: u32,
    #[serde(default)]
    pub iterations: Vec<LoopIteration>,
}

impl LoopSession {
    pub fn start(session_id: impl Into<String>, start_time_ms: u64, max_iterations: u32) -> Self {
        Self {
            session_id: session_id.into(),
            start_time_ms,
            end_time_ms: None,
            status: LoopSessionStatus::InProgress,
            max_iterations,
            total_iterations: 0,
            iterations: Vec::new(),
        }
    }

    pub fn append_iteration(&mut self, iteration: LoopIteration) {
        self.iterations.push(iteration);
        self.total_iterations = self.iterations.len() as u32;
    }

    pub fn update_iteration(
        &mut self,
        iteration_number: u32,
        status: IterationStatus,
        duration_ms: u64,
    ) {
        if let Some(it) = self
            .iterations
            .iter_mut()
            .find(|it| it.iteration_number == iteration_number)
        {
            it.status = status;
            it.duration_ms = Some(duration_ms);
        }
    }

    pub fn complete(&mut self, status: LoopSessionStatus, end_time_ms: u64) {
        self.status = status;
        self.end_time_ms = Some(end_time_ms);
    }

    /// Spec §8 invariant 9: `totalIterations == len(iterations)`.
    pub fn invariant_total_matches_len(&self) -> bool {
        self.total_iterations as usize == self.iterations.len()
    }
}

#[cfg(test)]
#[path = "loop_session_tests.rs"]
mod tests;
