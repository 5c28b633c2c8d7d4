// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent layout under `.agent-pipeline/` (spec §6.3).

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    /// `root` is the repository root; all paths are rooted at
    /// `<root>/.agent-pipeline`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn base(&self) -> PathBuf {
        self.root.join(".agent-pipeline")
    }

    pub fn pipelines_dir(&self) -> PathBuf {
        self.base().join("pipelines")
    }

    pub fn agents_dir(&self) -> PathBuf {
        self.base().join("agents")
    }

    pub fn runs_state_dir(&self) -> PathBuf {
        self.base().join("state").join("runs")
    }

    pub fn run_state_file(&self, run_id: &str) -> PathBuf {
        self.runs_state_dir().join(format!("{run_id}.json"))
    }

    pub fn run_handover_dir(&self, run_id: &str) -> PathBuf {
        self.base().join("runs").join(run_id)
    }

    pub fn loops_dir(&self) -> PathBuf {
        self.base().join("loops")
    }

    pub fn loop_session_file(&self, session_id: &str) -> PathBuf {
        self.loops_dir().join(format!("{session_id}.json"))
    }

    pub fn loop_session_dir(&self, session_id: &str) -> PathBuf {
        self.loops_dir().join(session_id)
    }

    pub fn loop_queue_dir(&self, session_id: &str, queue: LoopQueue) -> PathBuf {
        self.loop_session_dir(session_id).join(queue.as_str())
    }
}

/// The four directories draining a loop session (spec §4.J).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopQueue {
    Pending,
    Running,
    Finished,
    Failed,
}

impl LoopQueue {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopQueue::Pending => "pending",
            LoopQueue::Running => "running",
            LoopQueue::Finished => "finished",
            LoopQueue::Failed => "failed",
        }
    }

    pub fn all() -> [LoopQueue; 4] {
        [
            LoopQueue::Pending,
            LoopQueue::Running,
            LoopQueue::Finished,
            LoopQueue::Failed,
        ]
    }
}

/// Atomically write `bytes` to `path` (write-temp-then-rename), creating
/// parent directories as needed. Ported from the teacher's
/// `Snapshot::save`.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = std::fs::File::create(&tmp_path)?;
        use std::io::Write;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
