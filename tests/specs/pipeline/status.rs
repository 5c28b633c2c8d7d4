//! `status` specs.

use crate::prelude::*;

#[test]
fn status_on_a_fresh_project_reports_no_runs() {
    let project = Project::empty();
    project
        .pipeline()
        .args(&["status"])
        .passes()
        .stdout_has("no runs");
}

#[test]
fn status_accepts_a_limit_flag() {
    let project = Project::empty();
    project.pipeline().args(&["status", "--limit", "5"]).passes();
}
