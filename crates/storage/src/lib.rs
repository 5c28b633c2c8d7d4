// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pipeline-storage: the State Store (spec §4.B).
//!
//! Append-style persistence, one JSON file per run or session, written
//! atomically (write-temp-then-rename). Ported directly from the teacher's
//! `oj-storage::snapshot` save/load shape (`Snapshot::save`/`Snapshot::load`,
//! corrupt-file quarantine) but adapted from one snapshot file per daemon to
//! one file per run/session under `.agent-pipeline/state/runs/` and
//! `.agent-pipeline/loops/`.

mod error;
mod layout;
mod loop_store;
mod run_store;

pub use error::StorageError;
pub use layout::{LoopQueue, StateLayout};
pub use loop_store::LoopStore;
pub use run_store::RunStore;
