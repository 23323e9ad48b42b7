//! Configuration file support and default resolution.
//!
//! A run needs a source directory, a destination directory and a pattern.
//! Each value is taken from the first of these that provides it:
//! 1. A command-line flag
//! 2. The `[move]` table of a TOML configuration file
//! 3. A built-in default
//!
//! # Configuration File Format
//!
//! ```toml
//! [move]
//! source = "~/Downloads"
//! destination = "~/Wallpapers"
//! pattern = '.*unsplash.*\.jpg'
//! keep_going = false
//! rename = false
//! ```

use crate::mover::MoveStrategy;
use crate::selector::{BatchOptions, FailurePolicy, MoveConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pattern used when neither a flag nor a config file provides one.
pub const DEFAULT_PATTERN: &str = r".*unsplash.*\.jpg";

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".regmoverc.toml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("invalid configuration in {}: {source}", path.display())]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// IO error while reading configuration.
    #[error("could not read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A directory was not given and no home directory is known to derive a
    /// default from.
    #[error("no {0} directory given and HOME is not set")]
    MissingDirectory(&'static str),
}

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    #[serde(default, rename = "move")]
    pub moves: MoveSection,
}

/// The `[move]` table. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveSection {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub pattern: Option<String>,
    #[serde(default)]
    pub keep_going: bool,
    #[serde(default)]
    pub rename: bool,
}

/// Values supplied on the command line, which win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub pattern: Option<String>,
    pub keep_going: bool,
    pub rename: bool,
    pub dry_run: bool,
}

impl FileConfig {
    /// Load configuration from a file, with fallback to an empty config.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.regmoverc.toml` in the current directory
    /// 3. Look for `~/.config/regmove/config.toml` in home directory
    /// 4. Fall back to an empty configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any file found is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(".config").join("regmove").join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::Io` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content).map_err(|e| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolves the final [`MoveConfig`] and [`BatchOptions`] using the
    /// current `HOME` for defaults and `~/` expansion.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingDirectory` when a directory has to be
    /// defaulted but `HOME` is unset.
    pub fn resolve(&self, overrides: Overrides) -> Result<(MoveConfig, BatchOptions), ConfigError> {
        self.resolve_with_home(overrides, home_dir().as_deref())
    }

    /// Same as [`FileConfig::resolve`] with an explicit home directory.
    ///
    /// # Errors
    ///
    /// See [`FileConfig::resolve`].
    pub fn resolve_with_home(
        &self,
        overrides: Overrides,
        home: Option<&Path>,
    ) -> Result<(MoveConfig, BatchOptions), ConfigError> {
        let section = &self.moves;

        let source = match (overrides.source, &section.source) {
            (Some(path), _) => path,
            (None, Some(path)) => expand_home(path, home),
            (None, None) => home
                .map(|h| h.join("Downloads"))
                .ok_or(ConfigError::MissingDirectory("source"))?,
        };

        let destination = match (overrides.destination, &section.destination) {
            (Some(path), _) => path,
            (None, Some(path)) => expand_home(path, home),
            (None, None) => home
                .map(|h| h.join("Wallpapers"))
                .ok_or(ConfigError::MissingDirectory("destination"))?,
        };

        let pattern = overrides
            .pattern
            .or_else(|| section.pattern.clone())
            .unwrap_or_else(|| DEFAULT_PATTERN.to_string());

        let options = BatchOptions {
            failure_policy: if overrides.keep_going || section.keep_going {
                FailurePolicy::Continue
            } else {
                FailurePolicy::FailFast
            },
            strategy: if overrides.rename || section.rename {
                MoveStrategy::RenameFirst
            } else {
                MoveStrategy::CopyDelete
            },
            dry_run: overrides.dry_run,
        };

        Ok((
            MoveConfig {
                source,
                destination,
                pattern,
            },
            options,
        ))
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Expands a leading `~` or `~/` using `home`. Other paths are returned as is.
fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}
