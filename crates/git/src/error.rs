// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git {op} failed: {stderr}")]
    CommandFailed { op: String, stderr: String },
    #[error("git {op} timed out after {secs}s")]
    Timeout { op: String, secs: u64 },
    #[error("io error running git {op}: {source}")]
    Io {
        op: String,
        #[source]
        source: std::io::Error,
    },
    #[error("branch {branch} is already checked out at {path}")]
    BranchInUse { branch: String, path: String },
}
