//! End-to-end runs of the `scan` subcommand.

use clap::Parser;
use dupescan::cli::Cli;
use dupescan::error::ExitCode;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// A folder with one content duplicate pair and one same-size pair.
fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();
    fs::write(dir.path().join("c.txt"), "world").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/a.txt"), "other content").unwrap();
    dir
}

fn run(config_dir: &Path, args: &[&str]) -> anyhow::Result<ExitCode> {
    let config = config_dir.join("config.toml");
    fs::write(&config, "").unwrap();

    let mut argv = vec![
        "dupescan".to_string(),
        "-q".to_string(),
        "--no-color".to_string(),
        "--config".to_string(),
        config.to_string_lossy().into_owned(),
    ];
    argv.extend(args.iter().map(|s| (*s).to_string()));
    dupescan::run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_exit_code_when_duplicates_found() {
    let dir = fixture();
    let cfg = tempdir().unwrap();
    let root = dir.path().to_str().unwrap();

    for format in ["text", "json", "csv"] {
        let code = run(cfg.path(), &["scan", root, "--output", format]).unwrap();
        assert_eq!(code, ExitCode::Success, "format {format}");
    }
}

#[test]
fn test_exit_code_when_no_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one"), "1").unwrap();
    fs::write(dir.path().join("two"), "22").unwrap();
    let cfg = tempdir().unwrap();

    let code = run(cfg.path(), &["scan", dir.path().to_str().unwrap(), "--by", "size"]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_empty_folder_is_not_an_error() {
    let dir = tempdir().unwrap();
    let cfg = tempdir().unwrap();

    let code = run(cfg.path(), &["scan", dir.path().to_str().unwrap(), "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_trace_file_written() {
    let dir = fixture();
    let cfg = tempdir().unwrap();
    let trace_path = cfg.path().join("scan.log");

    let code = run(
        cfg.path(),
        &[
            "scan",
            dir.path().to_str().unwrap(),
            "--by",
            "name",
            "--output",
            "csv",
            "--trace-file",
            trace_path.to_str().unwrap(),
        ],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let trace = fs::read_to_string(&trace_path).unwrap();
    let lines: Vec<&str> = trace.lines().collect();
    assert!(lines[0].starts_with("=== Scan started ("));
    assert_eq!(lines[1], "Selected criterion: name");
    assert!(lines.iter().any(|l| l.starts_with("[name] [1/4] pigeonhole key = ")));
    assert!(lines.contains(&"[name] grouping complete. Unique keys: 3"));
    assert!(lines.last().unwrap().starts_with("=== Scan finished ("));
}

#[test]
fn test_missing_directory_is_general_error() {
    let cfg = tempdir().unwrap();
    let missing = cfg.path().join("not-here");

    let err = run(cfg.path(), &["scan", missing.to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().contains("Path not found"));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_file_instead_of_directory() {
    let cfg = tempdir().unwrap();
    let file = cfg.path().join("plain.txt");
    fs::write(&file, "x").unwrap();

    let err = run(cfg.path(), &["scan", file.to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().contains("Not a directory"));
}

#[test]
fn test_ignore_flag_removes_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep.txt"), "same").unwrap();
    fs::write(dir.path().join("drop.bak"), "same").unwrap();
    let cfg = tempdir().unwrap();
    let root = dir.path().to_str().unwrap();

    assert_eq!(run(cfg.path(), &["scan", root]).unwrap(), ExitCode::Success);
    assert_eq!(
        run(cfg.path(), &["scan", root, "--ignore", "*.bak"]).unwrap(),
        ExitCode::NoDuplicates
    );
}
