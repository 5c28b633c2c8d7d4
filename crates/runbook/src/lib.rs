// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pipeline-runbook: loads a pipeline's YAML definition (spec §6.1) and
//! validates it (spec §4.L) before the engine ever sees it.

pub mod loader;
pub mod validate;

pub use loader::{load_pipeline_file, load_pipeline_str, to_yaml, LoadError, RepoLayout};
pub use validate::{validate_pipeline, Finding, Severity, ValidationReport};
