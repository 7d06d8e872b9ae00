//! dupescan - duplicate file classifier
//!
//! Walks a folder and groups its files by identical name, identical size or
//! identical SHA-256 content digest, in a single pigeonhole pass. Every
//! decision is written to a bounded, human-readable scan trace.
//!
//! # Modules
//!
//! - [`scanner`]: file handles, folder walking and hashing
//! - [`duplicates`]: criteria, the classifier and the scan session
//! - [`trace`]: the bounded scan trace
//! - [`output`]: text, JSON and CSV renderers
//! - [`cli`], [`config`], [`logging`], [`signal`], [`error`]: the command-line application

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod trace;

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use cli::{Cli, Commands, OutputFormat, ScanArgs};
use config::Config;
use duplicates::{ClassifierConfig, ClassifyError, ResultSet, ScanSession, ScanSummary};
use error::ExitCode;
use output::{CsvOutput, JsonOutput, TextOutput};
use progress::Progress;
use scanner::{FileEntry, Walker, WalkerConfig};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error if configuration, walking, scanning or writing output
/// fails. A cancelled scan surfaces as an error that
/// [`ExitCode::for_error`] maps to [`ExitCode::Interrupted`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::Success)
        }
        Commands::Scan(ref args) => {
            let config = config.with_scan_args(args);
            let color = !cli.no_color && std::io::stdout().is_terminal();
            run_scan(args, &config, cli.quiet, color)
        }
    }
}

fn run_scan(args: &ScanArgs, config: &Config, quiet: bool, color: bool) -> Result<ExitCode> {
    let handler = signal::install_handler()?;

    let walker = Walker::new(
        &args.path,
        WalkerConfig::new(config.skip_hidden, config.ignore_patterns.clone()),
    )
    .with_shutdown_flag(handler.get_flag());
    walker.validate_root()?;

    log::info!("Listing files in {}", args.path.display());
    let files: Vec<FileEntry> = walker
        .walk()
        .filter_map(|entry| match entry {
            Ok(file) => Some(file),
            Err(e) => {
                log::debug!("Skipping entry: {}", e);
                None
            }
        })
        .collect();
    if handler.is_shutdown_requested() {
        return Err(anyhow::Error::new(ClassifyError::Cancelled)
            .context("Interrupted while listing files"));
    }
    log::info!("Found {} files", files.len());

    let show_bar = !quiet && !config.output.is_machine_readable();
    let progress = Arc::new(Progress::new(!show_bar).with_trace(args.show_trace));
    let mut classifier = ClassifierConfig::default()
        .with_yield_every(config.yield_every)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress.clone());
    if args.show_trace {
        classifier = classifier.with_trace_sink(progress);
    }

    let mut session = ScanSession::new(classifier)
        .with_trace_limits(config.trace_capacity, config.trace_threshold);
    session.select(files);

    let outcome = session.scan(config.criterion);

    if let Some(ref path) = args.trace_file {
        let mut text = session.trace_text();
        if !text.is_empty() {
            text.push('\n');
        }
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write trace to {}", path.display()))?;
        log::info!("Trace written to {}", path.display());
    }

    let results = match outcome {
        Ok(Some(results)) => results,
        Ok(None) => {
            log::info!("No files to scan in {}", args.path.display());
            ResultSet {
                criterion: config.criterion,
                groups: Vec::new(),
                total_files: 0,
                total_size: 0,
                unique_keys: 0,
            }
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Scan of {} failed", args.path.display()));
        }
    };

    let summary = ScanSummary::from_results(&results, session.last_duration().unwrap_or_default());
    let exit_code = ExitCode::for_groups(results.len());
    write_results(&results, &summary, exit_code, config.output, color)?;
    Ok(exit_code)
}

fn write_results(
    results: &ResultSet<FileEntry>,
    summary: &ScanSummary,
    exit_code: ExitCode,
    format: OutputFormat,
    color: bool,
) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => TextOutput::new(results, summary)
            .with_color(color)
            .write_to(&mut out)?,
        OutputFormat::Json => JsonOutput::new(results, summary, exit_code).write_to(&mut out)?,
        OutputFormat::Csv => CsvOutput::new(results).write_to(&mut out)?,
    }
    out.flush().context("Failed to flush output")
}
