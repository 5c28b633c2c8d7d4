// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pipeline-core: shared domain model for the agent pipeline execution engine.
//!
//! This crate owns the data model described by the engine's design doc: stage
//! and pipeline configuration, the execution graph produced by the DAG
//! planner, the run-scoped `PipelineState`, and the `LoopSession` owned by
//! the outer loop scheduler. It has no I/O of its own — persistence, git,
//! and runtime invocation live in sibling crates that depend on these types.

pub mod cancellation;
pub mod clock;
pub mod condition_types;
pub mod error;
pub mod graph;
pub mod id;
pub mod loop_session;
pub mod stage;
pub mod state;

pub use cancellation::CancellationToken;
pub use clock::{Clock, FakeClock, SystemClock};
pub use condition_types::ConditionContext;
pub use error::{ErrorCode, StageError};
pub use graph::{ExecutionGraph, ExecutionGroup};
pub use id::{IdGen, RunId, SequentialIdGen, SessionId, ShortId, UuidIdGen};
pub use loop_session::{
    LoopIteration, LoopSession, LoopSessionStatus, LoopSourceType, IterationStatus,
};
pub use stage::{
    AgentStageConfig, BranchPolicy, BranchStrategy, CommitPolicy, ContextReductionPolicy,
    ContextReductionStrategy, ExecutionMode, LoopingPolicy, NotificationPolicy, OnFail,
    PipelineConfig, RetryPolicy, TriggerKind,
};
pub use state::{
    Artifacts, LoopContext, PipelineState, PipelineStatus, StageExecution, StageStatus,
    TokenUsage, ToolActivity, TriggerRecord,
};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
