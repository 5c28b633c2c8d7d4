use super::*;
use pipeline_core::test_support::pipeline_config;
use pipeline_runbook::{to_yaml, validate_pipeline};

#[test]
fn pipeline_file_joins_repo_root_and_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = pipeline_file(dir.path(), "release");
    assert_eq!(
        path,
        dir.path().join(".agent-pipeline/pipelines/release.yml")
    );
}

#[test]
fn load_named_pipeline_errors_with_context_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_named_pipeline(dir.path(), "ghost").unwrap_err();
    assert!(format!("{err:#}").contains("ghost"));
}

#[test]
fn load_named_pipeline_round_trips_a_written_file() {
    let dir = tempfile::tempdir().unwrap();
    let layout = pipeline_runbook::RepoLayout::new(dir.path());
    let pipeline = pipeline_config("release", vec!["build"]);
    std::fs::create_dir_all(layout.pipelines_dir()).unwrap();
    std::fs::write(layout.pipeline_file("release"), to_yaml(&pipeline).unwrap()).unwrap();

    let loaded = load_named_pipeline(dir.path(), "release").unwrap();
    assert_eq!(loaded.name, "release");
}

#[test]
fn print_report_does_not_panic_for_either_format() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_config("release", vec!["build"]);
    let report = validate_pipeline(&pipeline, dir.path());
    assert!(report.has_errors(), "missing agent file should be flagged");

    print_report(&report, OutputFormat::Text);
    print_report(&report, OutputFormat::Json);
}
