//! CLI help and top-level argument-parsing specs.

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_fails() {
    // A subcommand is required; clap exits non-zero and prints usage to stderr.
    cli().fails().stderr_has("Usage:");
}

#[test]
fn help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn run_help_shows_dry_run_flag() {
    cli().args(&["run", "--help"]).passes().stdout_has("--dry-run");
}

#[test]
fn unknown_subcommand_fails() {
    cli().args(&["frobnicate"]).fails();
}
