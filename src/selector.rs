//! Batch selection of files by name pattern.
//!
//! The selector lists the direct entries of a source directory, keeps the
//! regular files whose names match a regular expression, and hands each one to
//! the [`mover`](crate::mover) in lexical file-name order. Subdirectories are
//! never entered.

use crate::mover::{self, MoveError, MoveErrorKind, MoveMethod, MoveStrategy};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// The three values that drive one batch run.
///
/// Built once by the caller and passed by value into [`move_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveConfig {
    /// Directory whose direct entries are examined.
    pub source: PathBuf,
    /// Directory that receives the matching files.
    pub destination: PathBuf,
    /// Regular expression tested against each bare file name.
    pub pattern: String,
}

/// What to do when moving one file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure and return it as an error.
    #[default]
    FailFast,
    /// Record the failure in the report and keep going.
    Continue,
}

/// Options for [`move_files_with`]. The default reproduces [`move_files`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub failure_policy: FailurePolicy,
    pub strategy: MoveStrategy,
    /// Select only; leave every file where it is.
    pub dry_run: bool,
}

/// Errors that abort a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// The source directory (or one of its entries) could not be read.
    #[error("could not read directory {}: {source}", path.display())]
    DirectoryList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Source and destination resolve to the same directory.
    #[error("source and destination are the same directory: {}", path.display())]
    SameDirectory { path: PathBuf },
    /// Moving a file failed under [`FailurePolicy::FailFast`].
    #[error("could not move {}: {source}", path.display())]
    Move {
        path: PathBuf,
        #[source]
        source: MoveError,
    },
}

/// A file picked by the selector, with both ends of its move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub file_name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Outcome of a single candidate within a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Moved { method: MoveMethod },
    WouldMove,
    Failed { kind: MoveErrorKind, message: String },
}

/// A candidate together with what happened to it.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file_name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Per-file results of a batch run, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub dry_run: bool,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, candidate: Candidate, status: FileStatus) {
        self.outcomes.push(FileOutcome {
            file_name: candidate.file_name,
            source: candidate.source,
            destination: candidate.destination,
            status,
        });
    }

    /// Number of files actually moved.
    pub fn moved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FileStatus::Moved { .. }))
            .count()
    }

    /// Number of files that failed to move.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FileStatus::Failed { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// A validated [`MoveConfig`] with its pattern compiled.
#[derive(Debug, Clone)]
pub struct FileSelector {
    source: PathBuf,
    destination: PathBuf,
    pattern: Regex,
}

impl FileSelector {
    /// Compiles the pattern, then checks that the two directories differ.
    /// The source is not listed here.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Pattern`] if the pattern does not compile and
    /// [`BatchError::SameDirectory`] if both directories canonicalize to the
    /// same path.
    pub fn new(config: MoveConfig) -> Result<Self, BatchError> {
        let pattern = Regex::new(&config.pattern).map_err(|e| BatchError::Pattern {
            pattern: config.pattern.clone(),
            source: e,
        })?;

        // Missing directories are reported later, when the source is listed.
        if let (Ok(source), Ok(destination)) = (
            fs::canonicalize(&config.source),
            fs::canonicalize(&config.destination),
        ) && source == destination
        {
            return Err(BatchError::SameDirectory { path: source });
        }

        Ok(Self {
            source: config.source,
            destination: config.destination,
            pattern,
        })
    }

    /// Unanchored match against a bare file name.
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }

    /// Lists the source directory and returns the matching regular files,
    /// sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::DirectoryList`] if the directory or any entry
    /// cannot be read.
    pub fn select(&self) -> Result<Vec<Candidate>, BatchError> {
        let list_error = |e| BatchError::DirectoryList {
            path: self.source.clone(),
            source: e,
        };

        let mut entries = fs::read_dir(&self.source)
            .map_err(list_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(list_error)?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut candidates = Vec::new();
        for entry in entries {
            let file_name = entry.file_name().to_string_lossy().to_string();

            if entry.file_type().map_err(list_error)?.is_dir() {
                debug!(name = %file_name, "skipping directory");
                continue;
            }

            if !self.matches(&file_name) {
                debug!(name = %file_name, "no match");
                continue;
            }

            // Paths are joined from the raw name so non-UTF-8 names survive.
            let raw_name = entry.file_name();
            candidates.push(Candidate {
                source: self.source.join(&raw_name),
                destination: self.destination.join(&raw_name),
                file_name,
            });
        }

        Ok(candidates)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// Moves every file in `config.source` whose name matches `config.pattern`
/// into `config.destination`.
///
/// Stops at the first failure; files not yet reached are left alone.
///
/// # Errors
///
/// Returns [`BatchError::Pattern`] before touching the filesystem if the
/// pattern is invalid, [`BatchError::DirectoryList`] if the source cannot be
/// listed, or the first [`MoveError`].
///
/// # Examples
///
/// ```no_run
/// use regmove::selector::{move_files, MoveConfig};
/// use std::path::PathBuf;
///
/// let config = MoveConfig {
///     source: PathBuf::from("/home/me/Downloads"),
///     destination: PathBuf::from("/home/me/Wallpapers"),
///     pattern: r".*unsplash.*\.jpg".to_string(),
/// };
/// if let Err(e) = move_files(config) {
///     eprintln!("{}", e);
/// }
/// ```
pub fn move_files(config: MoveConfig) -> Result<(), BatchError> {
    move_files_with(config, &BatchOptions::default()).map(|_| ())
}

/// Like [`move_files`], with a failure policy, move strategy, and dry-run
/// switch, returning a per-file report.
///
/// # Errors
///
/// Same as [`move_files`]. Under [`FailurePolicy::Continue`] move failures are
/// recorded in the report instead of being returned.
pub fn move_files_with(
    config: MoveConfig,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError> {
    let selector = FileSelector::new(config)?;
    process_candidates(selector.select()?, options, |_| {})
}

/// Moves (or, in a dry run, records) each candidate in order, calling
/// `on_file` after each one has been handled.
///
/// # Errors
///
/// Under [`FailurePolicy::FailFast`] returns the first [`MoveError`].
pub fn process_candidates<F>(
    candidates: Vec<Candidate>,
    options: &BatchOptions,
    mut on_file: F,
) -> Result<BatchReport, BatchError>
where
    F: FnMut(&FileOutcome),
{
    let mut report = BatchReport::new(options.dry_run);

    for candidate in candidates {
        let status = if options.dry_run {
            FileStatus::WouldMove
        } else {
            match mover::move_file_with(&candidate.source, &candidate.destination, options.strategy)
            {
                Ok(method) => {
                    info!(
                        file = %candidate.file_name,
                        destination = %candidate.destination.display(),
                        ?method,
                        "moved"
                    );
                    FileStatus::Moved { method }
                }
                Err(e) if options.failure_policy == FailurePolicy::FailFast => {
                    return Err(BatchError::Move {
                        path: candidate.source,
                        source: e,
                    });
                }
                Err(e) => FileStatus::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                },
            }
        };

        report.record(candidate, status);
        if let Some(outcome) = report.outcomes.last() {
            on_file(outcome);
        }
    }

    Ok(report)
}
