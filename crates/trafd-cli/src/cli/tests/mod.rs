//! CLI parse and config-override tests.

use super::commands::run_traffic;
use super::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use trafd_core::config::{ConfigError, ReportFormat, TrafdConfig};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_defaults_to_run() {
    let cli = parse(&["trafd"]);
    assert!(cli.command.is_none());
    assert!(!cli.verbose);
    assert!(cli.config.is_none());
    assert!(cli.overrides.workers.is_none());
}

#[test]
fn cli_parse_subcommands() {
    assert!(matches!(parse(&["trafd", "run"]).command, Some(CliCommand::Run)));
    assert!(matches!(parse(&["trafd", "sample"]).command, Some(CliCommand::Sample)));
    assert!(matches!(
        parse(&["trafd", "show-config"]).command,
        Some(CliCommand::ShowConfig)
    ));
}

#[test]
fn cli_parse_overrides_after_subcommand() {
    let cli = parse(&[
        "trafd",
        "run",
        "--url-file",
        "/tmp/urls.txt",
        "--speed-limit",
        "64",
        "--workers",
        "8",
        "--interval",
        "2",
        "--interface",
        "ens5",
        "--fetch-timeout",
        "30",
        "--report-format",
        "json",
        "--config",
        "/etc/trafd.toml",
        "-v",
    ]);
    assert!(cli.verbose);
    assert_eq!(cli.config, Some(PathBuf::from("/etc/trafd.toml")));

    let mut cfg = TrafdConfig::default();
    cli.overrides.apply(&mut cfg);
    assert_eq!(cfg.url_file, PathBuf::from("/tmp/urls.txt"));
    assert_eq!(cfg.speed_limit_kbps, 64);
    assert_eq!(cfg.workers, 8);
    assert_eq!(cfg.interval_secs, 2);
    assert_eq!(cfg.interface, "ens5");
    assert_eq!(cfg.fetch_timeout_secs, 30);
    assert_eq!(cfg.report_format, ReportFormat::Json);
}

#[test]
fn cli_overrides_leave_unset_fields_alone() {
    let cli = parse(&["trafd", "--workers", "3"]);
    let mut cfg = TrafdConfig {
        speed_limit_kbps: 999,
        ..TrafdConfig::default()
    };
    cli.overrides.apply(&mut cfg);
    assert_eq!(cfg.workers, 3);
    assert_eq!(cfg.speed_limit_kbps, 999);
    assert_eq!(cfg.interface, "eth0");
}

#[test]
fn cli_rejects_bad_values() {
    assert!(Cli::try_parse_from(["trafd", "--workers", "two"]).is_err());
    assert!(Cli::try_parse_from(["trafd", "--report-format", "xml"]).is_err());
    assert!(Cli::try_parse_from(["trafd", "frobnicate"]).is_err());
}

fn traffic_config(url_file: PathBuf, proc_root: PathBuf) -> TrafdConfig {
    TrafdConfig {
        url_file,
        proc_root,
        ..TrafdConfig::default()
    }
}

#[tokio::test]
async fn run_fails_fast_on_blank_url_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("urls.txt");
    std::fs::write(&path, "\n   \n\t\n").unwrap();
    let cfg = traffic_config(path.clone(), dir.path().to_path_buf());

    // Returning at all means no workers were started: a running pool only
    // stops on a signal.
    let err = tokio::time::timeout(Duration::from_secs(5), run_traffic(cfg))
        .await
        .expect("run_traffic should not wait for a signal")
        .unwrap_err();
    match err.downcast_ref::<ConfigError>() {
        Some(ConfigError::EmptyUrlList { path: p }) => assert_eq!(p, &path),
        other => panic!("expected EmptyUrlList, got {:?}", other),
    }
}

#[tokio::test]
async fn run_fails_fast_on_missing_url_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.txt");
    let cfg = traffic_config(path.clone(), dir.path().to_path_buf());

    let err = tokio::time::timeout(Duration::from_secs(5), run_traffic(cfg))
        .await
        .expect("run_traffic should not wait for a signal")
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Read { .. })
    ));
}
