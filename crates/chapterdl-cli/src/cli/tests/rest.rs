//! Tests for chapters, config and the global --config flag.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_chapters() {
    match parse(&["chapterdl", "chapters", "series.json"]) {
        CliCommand::Chapters { manifest } => assert_eq!(manifest, PathBuf::from("series.json")),
        _ => panic!("expected Chapters"),
    }
}

#[test]
fn cli_parse_config() {
    match parse(&["chapterdl", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn cli_parse_global_config_flag() {
    let cli = Cli::try_parse_from(["chapterdl", "download", "s.json", "--config", "/etc/chapterdl.toml"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("/etc/chapterdl.toml")));
    let cli = Cli::try_parse_from(["chapterdl", "--config", "c.toml", "config"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    assert!(matches!(cli.command, CliCommand::Config));
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["chapterdl", "status"]).is_err());
}
