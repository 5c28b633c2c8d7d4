// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pipeline-git: thin porcelain wrapper over a repository (spec §4.A).
//!
//! Every operation shells out to the system `git` binary via
//! `tokio::process::Command`, the same pattern the teacher crate uses for
//! its own worktree subprocess calls (`oj-engine`'s `Effect::DeleteWorkspace`
//! handler) and shares its `run_with_timeout` guard.

mod adapter;
mod error;
mod trailers;
mod worktree;

pub use adapter::GitAdapter;
pub use error::GitError;
pub use trailers::{commit_message, pipeline_commit_message};
pub use worktree::{Worktree, WorktreeSpec};
