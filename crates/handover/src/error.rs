// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Handover failures are always `HANDOVER_WARN` (spec §7): logged by the
/// caller, never fatal to a stage or group.
#[derive(Debug, Error)]
pub enum HandoverError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stage '{0}' has no captured output to copy to handover")]
    NoOutput(String),
}
