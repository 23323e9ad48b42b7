//! Command-line interface module for regmove.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Resolving flags, config file and defaults into a [`MoveConfig`]
//! - Driving the batch and rendering its report

use crate::config::{ConfigError, FileConfig, Overrides};
use crate::output::OutputFormatter;
use crate::selector::{self, BatchError, BatchReport, FileSelector, MoveConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Move files whose names match a regular expression into another directory
#[derive(Parser, Debug)]
#[command(name = "regmove")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to take files from [default: ~/Downloads]
    #[arg(long = "src", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Directory to move matching files into [default: ~/Wallpapers]
    #[arg(long = "dest", value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Regular expression matched anywhere in each file name [default: .*unsplash.*\.jpg]
    #[arg(long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Read settings from this TOML file instead of the usual locations
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show which files would be moved without moving them
    #[arg(long)]
    pub dry_run: bool,

    /// Keep moving the remaining files after a failure
    #[arg(long)]
    pub keep_going: bool,

    /// Try an atomic rename before falling back to copy-then-delete
    #[arg(long)]
    pub rename: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            source: self.source.clone(),
            destination: self.destination.clone(),
            pattern: self.pattern.clone(),
            keep_going: self.keep_going,
            rename: self.rename,
            dry_run: self.dry_run,
        }
    }
}

/// Errors surfaced to the user by [`run_cli`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("could not serialize report: {0}")]
    Report(#[from] serde_json::Error),
    /// Some files failed under `--keep-going`.
    #[error("{failed} of {total} matching files could not be moved")]
    PartialBatch { failed: usize, total: usize },
}

impl AppError {
    /// Process exit status: `2` for bad configuration, `1` otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_)
            | Self::Batch(BatchError::Pattern { .. } | BatchError::SameDirectory { .. }) => 2,
            _ => 1,
        }
    }
}

/// Runs the CLI application with parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use regmove::cli::{run_cli, Cli};
///
/// let cli = Cli::parse_from(["regmove", "--src", "/tmp/in", "--dest", "/tmp/out"]);
/// if let Err(e) = run_cli(&cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<BatchReport, AppError> {
    let file_config = FileConfig::load(cli.config.as_deref())?;
    let (config, options) = file_config.resolve(cli.overrides())?;
    debug!(?config, ?options, "resolved configuration");

    let report = match cli.output {
        OutputFormat::Human => run_human(config, &options)?,
        OutputFormat::Json => {
            let report = selector::move_files_with(config, &options)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            report
        }
    };

    if report.has_failures() {
        return Err(AppError::PartialBatch {
            failed: report.failed(),
            total: report.outcomes.len(),
        });
    }

    Ok(report)
}

fn run_human(
    config: MoveConfig,
    options: &selector::BatchOptions,
) -> Result<BatchReport, AppError> {
    let selector = FileSelector::new(config)?;
    let message = format!(
        "Moving files matching '{}' from {} to {}",
        selector.pattern(),
        selector.source().display(),
        selector.destination().display()
    );
    if options.dry_run {
        OutputFormatter::dry_run_notice(&message);
    } else {
        OutputFormatter::info(&message);
    }

    let candidates = selector.select()?;
    let pb = OutputFormatter::create_progress_bar(candidates.len() as u64);
    let result = selector::process_candidates(candidates, options, |outcome| {
        pb.suspend(|| println!("{}", OutputFormatter::outcome_line(outcome)));
        pb.inc(1);
    });
    pb.finish_and_clear();

    let report = result?;
    OutputFormatter::summary(&report);
    if report.has_failures() {
        OutputFormatter::warning("Some files could not be moved. Please review errors above.");
    } else if !report.dry_run && !report.is_empty() {
        OutputFormatter::success("Done.");
    }
    Ok(report)
}
