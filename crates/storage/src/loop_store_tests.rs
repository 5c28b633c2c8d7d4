// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pipeline_core::LoopSourceType;
use tempfile::tempdir;

fn store(root: &std::path::Path) -> LoopStore {
    LoopStore::new(StateLayout::new(root))
}

#[test]
fn start_session_persists_initial_state() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    let session = store.start_session("s1", 0, 10).unwrap();
    assert_eq!(session.status, LoopSessionStatus::InProgress);

    let loaded = store.load_session("s1").unwrap().unwrap();
    assert_eq!(loaded.max_iterations, 10);
}

#[test]
fn append_and_update_iteration_persist_each_step() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    let mut session = store.start_session("s1", 0, 10).unwrap();

    store
        .append_iteration(
            &mut session,
            LoopIteration::start(1, "seed", "run-1", LoopSourceType::Library),
        )
        .unwrap();
    store
        .update_iteration(&mut session, 1, IterationStatus::Completed, 500)
        .unwrap();

    let loaded = store.load_session("s1").unwrap().unwrap();
    assert_eq!(loaded.total_iterations, 1);
    assert_eq!(loaded.iterations[0].status, IterationStatus::Completed);
    assert_eq!(loaded.iterations[0].duration_ms, Some(500));
}

#[test]
fn complete_session_sets_terminal_status() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    let mut session = store.start_session("s1", 0, 10).unwrap();
    store
        .complete_session(&mut session, LoopSessionStatus::Completed, 9999)
        .unwrap();

    let loaded = store.load_session("s1").unwrap().unwrap();
    assert_eq!(loaded.status, LoopSessionStatus::Completed);
    assert_eq!(loaded.end_time_ms, Some(9999));
}

#[test]
fn create_session_directories_makes_all_four_queues() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    store.create_session_directories("s1").unwrap();
    for queue in LoopQueue::all() {
        assert!(store.queue_dir("s1", queue).is_dir());
    }
}

#[test]
fn get_all_sessions_skips_corrupt_files() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    store.start_session("s1", 0, 10).unwrap();
    std::fs::write(StateLayout::new(dir.path()).loops_dir().join("corrupt.json"), b"{not json").unwrap();

    let sessions = store.get_all_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
}
