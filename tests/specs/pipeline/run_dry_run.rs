//! `run --dry-run` specs. A real run needs a working agent runtime, which
//! isn't available in the test sandbox, so these specs stop at planning.

use crate::prelude::*;

#[test]
fn dry_run_prints_the_planned_groups() {
    let project = Project::empty();
    write_minimal_pipeline(&project);

    project
        .pipeline()
        .args(&["run", "release", "--dry-run"])
        .passes()
        .stdout_has("build")
        .stdout_has("test");
}

#[test]
fn dry_run_does_not_persist_any_run_state() {
    let project = Project::empty();
    write_minimal_pipeline(&project);

    project.pipeline().args(&["run", "release", "--dry-run"]).passes();

    assert!(!project.exists(".agent-pipeline/state/runs"));
}

#[test]
fn dry_run_on_an_invalid_pipeline_exits_two_without_planning() {
    let project = Project::empty();
    project.file(".agent-pipeline/pipelines/release.yml", MINIMAL_PIPELINE);
    // No agent files written: validation must fail before planning runs.

    let code = project.pipeline().args(&["run", "release", "--dry-run"]).code();
    assert_eq!(code, 2);
}
