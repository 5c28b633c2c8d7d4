use super::*;

#[test]
fn parses_global_directory_and_output_flags() {
    let cli = Cli::try_parse_from([
        "agent-pipeline",
        "-C",
        "/tmp",
        "-o",
        "json",
        "status",
    ])
    .unwrap();
    assert_eq!(cli.directory, Some(PathBuf::from("/tmp")));
    assert_eq!(cli.output, OutputFormat::Json);
    assert!(matches!(cli.command, Commands::Status(_)));
}

#[test]
fn output_format_defaults_to_text() {
    let cli = Cli::try_parse_from(["agent-pipeline", "status"]).unwrap();
    assert_eq!(cli.output, OutputFormat::Text);
}

#[test]
fn parses_every_subcommand() {
    assert!(matches!(
        Cli::try_parse_from(["agent-pipeline", "run", "release"]).unwrap().command,
        Commands::Run(_)
    ));
    assert!(matches!(
        Cli::try_parse_from(["agent-pipeline", "create", "release"]).unwrap().command,
        Commands::Create(_)
    ));
    assert!(matches!(
        Cli::try_parse_from(["agent-pipeline", "edit", "release"]).unwrap().command,
        Commands::Edit(_)
    ));
    assert!(matches!(
        Cli::try_parse_from(["agent-pipeline", "delete", "release"]).unwrap().command,
        Commands::Delete(_)
    ));
    assert!(matches!(
        Cli::try_parse_from(["agent-pipeline", "export", "release"]).unwrap().command,
        Commands::Export(_)
    ));
    assert!(matches!(
        Cli::try_parse_from(["agent-pipeline", "validate", "release"]).unwrap().command,
        Commands::Validate(_)
    ));
    assert!(matches!(
        Cli::try_parse_from(["agent-pipeline", "loop", "release"]).unwrap().command,
        Commands::Loop(_)
    ));
}

#[tokio::test]
async fn dispatch_surfaces_missing_pipeline_as_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = dispatch(
        Commands::Export(commands::export::ExportArgs { name: "ghost".to_string() }),
        dir.path(),
        OutputFormat::Text,
    )
    .await;
    assert!(result.is_err());
}
