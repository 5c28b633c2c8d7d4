//! Create / export / delete lifecycle specs.

use crate::prelude::*;

#[test]
fn create_scaffolds_a_runnable_pipeline() {
    let project = Project::empty();

    // stdin/stdout aren't a tty under the test harness, so create falls
    // back to a single stage named after the pipeline.
    project.pipeline().args(&["create", "release"]).passes();

    assert!(project.exists(".agent-pipeline/pipelines/release.yml"));
    let agents: Vec<_> = std::fs::read_dir(project.path().join(".agent-pipeline/agents"))
        .unwrap()
        .collect();
    assert_eq!(agents.len(), 1);

    project.pipeline().args(&["validate", "release"]).passes();
}

#[test]
fn create_refuses_to_clobber_an_existing_pipeline() {
    let project = Project::empty();
    project.pipeline().args(&["create", "release"]).passes();
    project.pipeline().args(&["create", "release"]).fails();
}

#[test]
fn export_prints_the_pipeline_yaml() {
    let project = Project::empty();
    write_minimal_pipeline(&project);

    project
        .pipeline()
        .args(&["export", "release"])
        .passes()
        .stdout_has("name: release")
        .stdout_has("dependsOn");
}

#[test]
fn delete_removes_the_pipeline_but_not_its_agent_files() {
    let project = Project::empty();
    write_minimal_pipeline(&project);

    project.pipeline().args(&["delete", "release"]).passes();

    assert!(!project.exists(".agent-pipeline/pipelines/release.yml"));
    assert!(project.exists("agents/build.md"));
}
