//! Validator specs: exit codes and finding contents.

use crate::prelude::*;

#[test]
fn valid_pipeline_exits_zero_with_no_findings() {
    let project = Project::empty();
    write_minimal_pipeline(&project);

    project
        .pipeline()
        .args(&["validate", "release"])
        .passes();
}

#[test]
fn missing_agent_file_exits_two() {
    let project = Project::empty();
    project.file(".agent-pipeline/pipelines/release.yml", MINIMAL_PIPELINE);
    // Agent prompt files deliberately not written.

    let code = project.pipeline().args(&["validate", "release"]).code();
    assert_eq!(code, 2);
}

#[test]
fn dependency_cycle_is_reported_as_an_error() {
    let project = Project::empty();
    project.file(
        ".agent-pipeline/pipelines/release.yml",
        r#"name: release
trigger: manual
agents:
  - name: build
    agent: agents/build.md
    dependsOn: [test]
  - name: test
    agent: agents/test.md
    dependsOn: [build]
"#,
    );
    project.file("agents/build.md", "build");
    project.file("agents/test.md", "test");

    let code = project.pipeline().args(&["validate", "release"]).code();
    assert_eq!(code, 2);
}

#[test]
fn json_output_includes_findings_array() {
    let project = Project::empty();
    project.file(".agent-pipeline/pipelines/release.yml", MINIMAL_PIPELINE);

    project
        .pipeline()
        .args(&["-o", "json", "validate", "release"])
        .fails()
        .stdout_has("findings");
}
