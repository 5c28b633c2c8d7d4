use super::*;
use clap::Parser;
use pipeline_core::test_support::{pipeline_config, trigger};
use pipeline_core::PipelineState;
use pipeline_storage::{RunStore, StateLayout};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Sub,
}

#[derive(clap::Subcommand)]
enum Sub {
    Status(StatusArgs),
}

#[test]
fn parses_limit_argument() {
    let cli = Cli::try_parse_from(["test", "status", "--limit", "5"]).unwrap();
    let Sub::Status(args) = cli.command;
    assert_eq!(args.limit, 5);
}

#[test]
fn default_limit_is_twenty() {
    let cli = Cli::try_parse_from(["test", "status"]).unwrap();
    let Sub::Status(args) = cli.command;
    assert_eq!(args.limit, 20);
}

#[test]
fn runs_with_no_state_store_returns_ok() {
    let dir = tempfile::tempdir().unwrap();
    let code = handle(StatusArgs { limit: 20 }, dir.path(), OutputFormat::Text).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn respects_limit_and_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::new(StateLayout::new(dir.path()));
    for i in 0..3 {
        let pipeline = pipeline_config("release", vec!["build"]);
        let trig = trigger("abc123", i);
        let state = PipelineState::new(format!("{i:013}-run"), pipeline, trig);
        store.save_state(&state).unwrap();
    }

    let code = handle(StatusArgs { limit: 2 }, dir.path(), OutputFormat::Json).unwrap();
    assert_eq!(code, 0);

    let all = store.get_all_runs().unwrap();
    assert_eq!(all.len(), 3, "all three runs should still be on disk");
}
