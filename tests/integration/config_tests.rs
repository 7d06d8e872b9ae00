//! Configuration layering as seen by the application.

use clap::Parser;
use dupescan::cli::{Cli, Commands, OutputFormat};
use dupescan::config::Config;
use dupescan::duplicates::Criterion;
use dupescan::error::ExitCode;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all DUPESCAN_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("DUPESCAN_") {
            std::env::remove_var(key);
        }
    }
}

fn scan_args(cli: &Cli) -> &dupescan::cli::ScanArgs {
    match cli.command {
        Commands::Scan(ref args) => args,
        _ => panic!("Expected Scan command"),
    }
}

#[test]
fn test_file_then_env_then_cli() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
criterion = "size"
output = "csv"
yield_every = 40
trace_capacity = 100
trace_threshold = 150
"#,
    )
    .unwrap();

    let file_only = Config::load(Some(&path)).unwrap();
    assert_eq!(file_only.criterion, Criterion::BySize);
    assert_eq!(file_only.output, OutputFormat::Csv);
    assert_eq!(file_only.trace_capacity, 100);
    assert_eq!(file_only.trace_threshold, 150);

    std::env::set_var("DUPESCAN_OUTPUT", "json");
    std::env::set_var("DUPESCAN_YIELD_EVERY", "9");
    let with_env = Config::load(Some(&path)).unwrap();
    clear_env();
    assert_eq!(with_env.criterion, Criterion::BySize);
    assert_eq!(with_env.output, OutputFormat::Json);
    assert_eq!(with_env.yield_every, 9);

    let cli = Cli::try_parse_from(["dupescan", "scan", "/p", "--by", "name", "--yield-every", "2"])
        .unwrap();
    let effective = with_env.with_scan_args(scan_args(&cli));
    assert_eq!(effective.criterion, Criterion::ByName);
    assert_eq!(effective.output, OutputFormat::Json);
    assert_eq!(effective.yield_every, 2);
}

#[test]
fn test_zero_yield_in_file_is_clamped() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "yield_every = 0\ntrace_capacity = 50\ntrace_threshold = 10\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.yield_every, 1);
    assert_eq!(config.trace_threshold, 50);
}

#[test]
fn test_config_subcommand_succeeds() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "skip_hidden = true\n").unwrap();

    let cli = Cli::try_parse_from(["dupescan", "-q", "--config", path.to_str().unwrap(), "config"])
        .unwrap();
    assert_eq!(dupescan::run_app(cli).unwrap(), ExitCode::Success);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let cli = Cli::try_parse_from([
        "dupescan",
        "-q",
        "--config",
        missing.to_str().unwrap(),
        "scan",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    let err = dupescan::run_app(cli).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_effective_config_renders_as_toml() {
    let config = Config {
        criterion: Criterion::BySize,
        ignore_patterns: vec!["*.log".to_string()],
        ..Config::default()
    };
    let text = config.to_toml().unwrap();

    assert!(text.contains("criterion = \"size\""));
    assert!(text.contains("yield_every = 25"));
    assert!(text.contains("*.log"));
}
