//! Command line parsing

use bgp_archive_downloader::cli::{Cli, Commands, OutputFormat};
use bgp_archive_downloader::downloader::FailurePolicy;
use bgp_archive_downloader::source::Source;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["bgp-archive-downloader"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_download_defaults() {
    let cli = parse(&["download", "-s", "2014-03-01", "-e", "2014-03-02"]);
    let Commands::Download(args) = &cli.command else {
        panic!("expected download command");
    };

    assert_eq!(args.source, "ripe");
    assert_eq!(args.collector, "rrc00");
    assert_eq!(args.data_type, "bview");
    assert_eq!(args.output, PathBuf::from("."));
    assert_eq!(args.concurrency, 10);
    assert_eq!(cli.output_format, OutputFormat::Human);

    let request = args.to_request().unwrap();
    assert_eq!(request.source, Source::Ripe);
    assert_eq!(request.start_date, "2014-03-01");
    assert_eq!(request.end_date, "2014-03-02");
}

#[test]
fn test_download_short_flags() {
    let cli = parse(&[
        "download", "-S", "routeviews", "-c", "chicago", "-t", "all", "-s", "2024-01-01", "-e",
        "2024-01-31", "-o", "/tmp/mrt", "-n", "4",
    ]);
    let Commands::Download(args) = &cli.command else {
        panic!("expected download command");
    };

    let request = args.to_request().unwrap();
    assert_eq!(request.source, Source::RouteViews);
    assert_eq!(request.collector, "chicago");
    assert_eq!(request.data_type, "all");
    assert_eq!(request.output_root, PathBuf::from("/tmp/mrt"));
    assert_eq!(request.max_concurrency, 4);
}

#[test]
fn test_dates_are_required() {
    let result = Cli::try_parse_from(["bgp-archive-downloader", "download", "-s", "2014-03-01"]);
    assert!(result.is_err());
}

#[test]
fn test_concurrency_bounds() {
    assert!(Cli::try_parse_from([
        "bgp-archive-downloader", "download", "-s", "2014-03-01", "-e", "2014-03-01", "-n", "65",
    ])
    .is_err());

    let cli = parse(&["download", "-s", "2014-03-01", "-e", "2014-03-01", "-n", "0"]);
    let Commands::Download(args) = &cli.command else {
        panic!("expected download command");
    };
    assert_eq!(args.to_request().unwrap().effective_concurrency(), 10);
}

#[test]
fn test_unknown_source_is_rejected_when_building_request() {
    let cli = parse(&["download", "-S", "pch", "-s", "2014-03-01", "-e", "2014-03-01"]);
    let Commands::Download(args) = &cli.command else {
        panic!("expected download command");
    };
    assert!(args.to_request().is_err());
}

#[test]
fn test_global_flags() {
    let cli = parse(&[
        "download",
        "-s",
        "2014-03-01",
        "-e",
        "2014-03-01",
        "--output-format",
        "json",
        "--fail-fast",
        "--max-retries",
        "7",
    ]);

    assert_eq!(cli.output_format, OutputFormat::Json);
    assert_eq!(cli.failure_policy(), FailurePolicy::AbortOnFirstError);
    let policy = cli.retry_policy();
    assert_eq!(policy.max_attempts, 7);
    assert_eq!(policy.base_delay, Duration::from_secs(1));
    assert_eq!(policy.max_backoff, None);
    assert!(!policy.remove_partial_on_failure);
}

#[test]
fn test_max_retries_range() {
    assert!(Cli::try_parse_from(["bgp-archive-downloader", "--max-retries", "0", "sources"]).is_err());
    assert!(Cli::try_parse_from(["bgp-archive-downloader", "--max-retries", "21", "sources"]).is_err());
}

#[test]
fn test_sources_command() {
    let cli = parse(&["sources", "--source", "ripe"]);
    let Commands::Sources(cmd) = &cli.command else {
        panic!("expected sources command");
    };
    assert_eq!(cmd.source.as_deref(), Some("ripe"));
}
