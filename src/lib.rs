//! regmove - move files whose names match a regular expression
//!
//! This library lists the direct entries of a source directory, selects the
//! files whose names match a pattern, and moves each one into a destination
//! directory by copying it and deleting the original.

pub mod cli;
pub mod config;
pub mod logging;
pub mod mover;
pub mod output;
pub mod selector;

pub use config::{ConfigError, FileConfig, Overrides};
pub use mover::{MoveError, MoveErrorKind, MoveMethod, MoveStrategy, move_file, move_file_with};
pub use selector::{
    BatchError, BatchOptions, BatchReport, FailurePolicy, FileSelector, FileStatus, MoveConfig,
    move_files, move_files_with,
};

pub use cli::{Cli, run_cli};
