// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::StorageError;
use crate::layout::{atomic_write, StateLayout};
use pipeline_core::PipelineState;
use tracing::warn;

/// Persists `PipelineState` records under `.agent-pipeline/state/runs/`.
pub struct RunStore {
    layout: StateLayout,
}

impl RunStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    /// `saveState(state)`: atomic write-temp-then-rename (spec §4.B).
    pub fn save_state(&self, state: &PipelineState) -> Result<(), StorageError> {
        let path = self.layout.run_state_file(&state.run_id);
        let bytes = serde_json::to_vec_pretty(state)?;
        atomic_write(&path, &bytes).map_err(|source| StorageError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load_state(&self, run_id: &str) -> Result<Option<PipelineState>, StorageError> {
        let path = self.layout.run_state_file(run_id);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// `getAllRuns()`: enumerate JSON files; corrupt files are skipped with
    /// a warning rather than failing the whole scan (spec §4.B).
    pub fn get_all_runs(&self) -> Result<Vec<PipelineState>, StorageError> {
        let dir = self.layout.runs_state_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: dir.display().to_string(),
                    source,
                })
            }
        };

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match std::fs::read(&path).map_err(StorageError::from_io(&path)).and_then(|bytes| {
                serde_json::from_slice::<PipelineState>(&bytes).map_err(StorageError::from)
            }) {
                Ok(state) => runs.push(state),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping corrupt run state file"),
            }
        }
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

impl StorageError {
    fn from_io(path: &std::path::Path) -> impl Fn(std::io::Error) -> StorageError + '_ {
        move |source| StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "run_store_tests.rs"]
mod tests;
