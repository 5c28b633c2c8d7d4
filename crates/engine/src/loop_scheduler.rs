// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loop Scheduler (spec §4.J): drains the `pending/` directory of queued
//! pipeline files one at a time, running each through the Runner and
//! recording a `LoopIteration` per execution, until the queue is dry, a
//! pipeline aborts, a pipeline fails under a `stop` strategy, or
//! `maxIterations` is reached.
//!
//! Grounded on the teacher's `daemon/src/lifecycle.rs` poll loop (drain a
//! directory of queued work items) and its queue-move conventions
//! (`queue/src/mod.rs` pending -> running -> finished/failed), generalized
//! from job files to whole pipeline configs.

use crate::runner::{run_pipeline, RunOptions, RunnerDeps};
use pipeline_core::{
    CancellationToken, Clock, IdGen, LoopContext, LoopIteration, LoopSession, LoopSessionStatus,
    LoopSourceType, PipelineConfig, PipelineStatus, RunId,
};
use pipeline_storage::{LoopQueue, LoopStore, StateLayout, StorageError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to load queued pipeline file {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parses a pipeline config file picked up from a loop queue directory.
/// The engine has no opinion on the file format (YAML vs. HCL vs. JSON);
/// this is supplied by the caller, which for the CLI is
/// `pipeline-runbook`'s loader.
pub type PipelineLoader = dyn Fn(&Path) -> Result<PipelineConfig, String> + Send + Sync;

pub struct LoopSchedulerDeps<C: Clock, I: IdGen> {
    pub runner: RunnerDeps<C, I>,
    pub loop_store: LoopStore,
    pub loader: Arc<PipelineLoader>,
}

/// Run a seeded pipeline through the outer loop (spec §4.J). The seed
/// pipeline is always iteration 1 and is never moved between queue
/// directories, regardless of outcome.
pub async fn run_loop<C: Clock, I: IdGen>(
    seed: &PipelineConfig,
    repo_root: &Path,
    session_id: String,
    cli_max_iterations: Option<u32>,
    cancellation: &CancellationToken,
    deps: &LoopSchedulerDeps<C, I>,
) -> Result<LoopSession, LoopError> {
    let configured_max = seed.looping.max_iterations.unwrap_or(100);
    let max_iterations = match cli_max_iterations {
        Some(cli) => configured_max.min(cli),
        None => configured_max,
    };

    let start_ms = deps.runner.clock.epoch_ms();
    deps.loop_store.create_session_directories(&session_id)?;
    let mut session = deps.loop_store.start_session(&session_id, start_ms, max_iterations)?;

    let mut iteration_number: u32 = 1;
    let mut current_pipeline = seed.clone();
    let mut current_source = LoopSourceType::Library;
    let mut current_file: Option<PathBuf> = None;

    loop {
        if cancellation.is_cancelled() {
            deps.loop_store
                .complete_session(&mut session, LoopSessionStatus::Aborted, deps.runner.clock.epoch_ms())?;
            return Ok(session);
        }

        let run_id = RunId::generate(&deps.runner.clock, &deps.runner.id_gen).to_string();
        let iteration = LoopIteration::start(
            iteration_number,
            current_pipeline.name.clone(),
            run_id.clone(),
            current_source,
        );
        deps.loop_store.append_iteration(&mut session, iteration)?;

        let run_options = RunOptions {
            loop_context: Some(LoopContext {
                session_id: session_id.clone(),
                iteration_number,
            }),
            run_id_override: Some(run_id),
        };
        let iteration_started_ms = deps.runner.clock.epoch_ms();
        let state = run_pipeline(&current_pipeline, repo_root, cancellation, run_options, &deps.runner).await;
        let duration_ms = deps.runner.clock.epoch_ms().saturating_sub(iteration_started_ms);

        let iteration_status = match state.status {
            PipelineStatus::Completed | PipelineStatus::Partial => pipeline_core::IterationStatus::Completed,
            _ => pipeline_core::IterationStatus::Failed,
        };
        deps.loop_store
            .update_iteration(&mut session, iteration_number, iteration_status, duration_ms)?;

        if let Some(worktree_path) = state.artifacts.worktree_path.as_ref() {
            copy_loop_dirs_back(&session_id, Path::new(worktree_path), repo_root);
        }

        if let Some(path) = current_file.take() {
            let dest_queue = match state.status {
                PipelineStatus::Completed | PipelineStatus::Partial => LoopQueue::Finished,
                _ => LoopQueue::Failed,
            };
            move_queued_file(&deps.loop_store, &session_id, &path, dest_queue, deps.runner.clock.epoch_ms());
        }

        // Step 3: aborted terminates the session immediately.
        if state.status == PipelineStatus::Aborted {
            deps.loop_store
                .complete_session(&mut session, LoopSessionStatus::Aborted, deps.runner.clock.epoch_ms())?;
            return Ok(session);
        }

        // Step 4: failed under a `stop` effective strategy terminates the session.
        if state.status == PipelineStatus::Failed && current_pipeline.failure_strategy == pipeline_core::OnFail::Stop {
            deps.loop_store
                .complete_session(&mut session, LoopSessionStatus::Failed, deps.runner.clock.epoch_ms())?;
            return Ok(session);
        }

        // Step 5: pick the next pending file.
        let pending_dir = deps.loop_store.queue_dir(&session_id, LoopQueue::Pending);
        let next_file = match pick_next_pending(&pending_dir) {
            Ok(Some(path)) => path,
            Ok(None) => {
                deps.loop_store.complete_session(
                    &mut session,
                    LoopSessionStatus::Completed,
                    deps.runner.clock.epoch_ms(),
                )?;
                return Ok(session);
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "failed to scan pending directory");
                deps.loop_store.complete_session(
                    &mut session,
                    LoopSessionStatus::Completed,
                    deps.runner.clock.epoch_ms(),
                )?;
                return Ok(session);
            }
        };

        // Step 6: move to `running/` atomically, then load it.
        let running_dir = deps.loop_store.queue_dir(&session_id, LoopQueue::Running);
        let running_path = running_dir.join(next_file.file_name().expect("pending file has a name"));
        if let Err(e) = std::fs::rename(&next_file, &running_path) {
            warn!(session_id = %session_id, error = %e, "failed to move pending file to running");
            deps.loop_store
                .complete_session(&mut session, LoopSessionStatus::Failed, deps.runner.clock.epoch_ms())?;
            return Ok(session);
        }

        let loaded = (deps.loader)(&running_path);
        let next_pipeline = match loaded {
            Ok(p) => p,
            Err(message) => {
                let failed_dir = deps.loop_store.queue_dir(&session_id, LoopQueue::Failed);
                let dest = unique_destination(&failed_dir, &running_path, deps.runner.clock.epoch_ms());
                let _ = std::fs::rename(&running_path, &dest);
                deps.loop_store
                    .complete_session(&mut session, LoopSessionStatus::Failed, deps.runner.clock.epoch_ms())?;
                return Err(LoopError::LoadFailed {
                    path: running_path,
                    message,
                });
            }
        };

        // Step 7: increment, enforce the ceiling.
        iteration_number += 1;
        if iteration_number > max_iterations {
            deps.loop_store.complete_session(
                &mut session,
                LoopSessionStatus::LimitReached,
                deps.runner.clock.epoch_ms(),
            )?;
            return Ok(session);
        }

        current_pipeline = next_pipeline;
        current_source = LoopSourceType::LoopPending;
        current_file = Some(running_path);
    }
}

/// Earliest-`mtime`-first pending file, or `None` if the directory is empty.
fn pick_next_pending(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut candidates: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let mtime = entry.metadata()?.modified()?;
        candidates.push((mtime, path));
    }
    candidates.sort_by_key(|(mtime, _)| *mtime);
    Ok(candidates.into_iter().next().map(|(_, path)| path))
}

fn move_queued_file(loop_store: &LoopStore, session_id: &str, from: &Path, dest_queue: LoopQueue, now_ms: u64) {
    let dest_dir = loop_store.queue_dir(session_id, dest_queue);
    let dest = unique_destination(&dest_dir, from, now_ms);
    if let Err(e) = std::fs::rename(from, &dest) {
        warn!(from = %from.display(), to = %dest.display(), error = %e, "failed to move queued pipeline file");
    }
}

/// If `dest_dir/<name>` already exists, append `-<now_ms>` before the
/// extension to avoid a collision (spec §4.J.8).
fn unique_destination(dest_dir: &Path, source: &Path, now_ms: u64) -> PathBuf {
    let file_name = source.file_name().expect("source file has a name");
    let candidate = dest_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("pipeline");
    let ext = source.extension().and_then(|s| s.to_str());
    let renamed = match ext {
        Some(ext) => format!("{stem}-{now_ms}.{ext}"),
        None => format!("{stem}-{now_ms}"),
    };
    dest_dir.join(renamed)
}

/// Copy the loop session's directory tree from an isolating worktree back
/// into the main repository's loop directories (spec §4.J, "Copying between
/// worktree and main"). A failure is a warning, never fatal.
fn copy_loop_dirs_back(session_id: &str, worktree_root: &Path, main_root: &Path) {
    let src = StateLayout::new(worktree_root).loop_session_dir(session_id);
    let dst = StateLayout::new(main_root).loop_session_dir(session_id);
    if !src.exists() {
        return;
    }
    if let Err(e) = copy_dir_recursive(&src, &dst) {
        warn!(src = %src.display(), dst = %dst.display(), error = %e, "failed to copy loop directories back from worktree");
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let target = dst.join(entry.file_name());
        if path.is_dir() {
            copy_dir_recursive(&path, &target)?;
        } else {
            std::fs::copy(&path, &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "loop_scheduler_tests.rs"]
mod tests;
