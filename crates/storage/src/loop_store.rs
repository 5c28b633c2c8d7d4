// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::StorageError;
use crate::layout::{atomic_write, LoopQueue, StateLayout};
use pipeline_core::{IterationStatus, LoopIteration, LoopSession, LoopSessionStatus};
use tracing::warn;

/// Persists `LoopSession` records and manages the
/// `pending/running/finished/failed` queue directories (spec §4.B, §4.J).
pub struct LoopStore {
    layout: StateLayout,
}

impl LoopStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    fn save(&self, session: &LoopSession) -> Result<(), StorageError> {
        let path = self.layout.loop_session_file(&session.session_id);
        let bytes = serde_json::to_vec_pretty(session)?;
        atomic_write(&path, &bytes).map_err(|source| StorageError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn start_session(
        &self,
        session_id: &str,
        start_time_ms: u64,
        max_iterations: u32,
    ) -> Result<LoopSession, StorageError> {
        let session = LoopSession::start(session_id, start_time_ms, max_iterations);
        self.save(&session)?;
        Ok(session)
    }

    pub fn append_iteration(
        &self,
        session: &mut LoopSession,
        iteration: LoopIteration,
    ) -> Result<(), StorageError> {
        session.append_iteration(iteration);
        self.save(session)
    }

    pub fn update_iteration(
        &self,
        session: &mut LoopSession,
        iteration_number: u32,
        status: IterationStatus,
        duration_ms: u64,
    ) -> Result<(), StorageError> {
        session.update_iteration(iteration_number, status, duration_ms);
        self.save(session)
    }

    pub fn complete_session(
        &self,
        session: &mut LoopSession,
        status: LoopSessionStatus,
        end_time_ms: u64,
    ) -> Result<(), StorageError> {
        session.complete(status, end_time_ms);
        self.save(session)
    }

    pub fn load_session(&self, session_id: &str) -> Result<Option<LoopSession>, StorageError> {
        let path = self.layout.loop_session_file(session_id);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// `getAllSessions()`: corrupt files are skipped, mirroring
    /// `RunStore::get_all_runs`.
    pub fn get_all_sessions(&self) -> Result<Vec<LoopSession>, StorageError> {
        let dir = self.layout.loops_dir();
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

        let mut sessions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match std::fs::read(&path) {
                Ok(bytes) => match serde_json::from_slice::<LoopSession>(&bytes) {
                    Ok(session) => sessions.push(session),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping corrupt loop session file"),
                },
                Err(e) => warn!(path = %path.display(), error = %e, "failed to read loop session file"),
            }
        }
        sessions.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        Ok(sessions)
    }

    /// `createSessionDirectories(sessionId, repo)`: ensure the four queue
    /// directories exist under `.agent-pipeline/loops/<sessionId>/`.
    pub fn create_session_directories(&self, session_id: &str) -> Result<(), StorageError> {
        for queue in LoopQueue::all() {
            let dir = self.layout.loop_queue_dir(session_id, queue);
            std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
                path: dir.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn queue_dir(&self, session_id: &str, queue: LoopQueue) -> std::path::PathBuf {
        self.layout.loop_queue_dir(session_id, queue)
    }
}

#[cfg(test)]
#[path = "loop_store_tests.rs"]
mod tests;
