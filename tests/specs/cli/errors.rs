//! Error-path specs: missing pipelines, exit codes, `-C`/`-o` globals.

use crate::prelude::*;

#[test]
fn validating_an_unknown_pipeline_is_an_error() {
    let project = Project::empty();
    project
        .pipeline()
        .args(&["validate", "nonexistent"])
        .fails()
        .stderr_has("nonexistent");
}

#[test]
fn deleting_an_unknown_pipeline_is_an_error() {
    let project = Project::empty();
    project.pipeline().args(&["delete", "nonexistent"]).fails();
}

#[test]
fn dash_c_changes_to_the_given_directory() {
    let project = Project::empty();
    write_minimal_pipeline(&project);

    cli()
        .args(&["-C", project.path().to_str().unwrap(), "validate", "release"])
        .passes();
}

#[test]
fn invalid_directory_for_dash_c_fails() {
    cli()
        .args(&["-C", "/does/not/exist/anywhere", "validate", "release"])
        .fails();
}
