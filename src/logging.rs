//! Diagnostic logging setup.
//!
//! Log events are written to stderr so they never mix with the report on
//! stdout. `REGMOVE_LOG` takes an `EnvFilter` directive; without it the level
//! follows the number of `-v` flags.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a filter directive such as `regmove=debug`.
pub const LOG_ENV: &str = "REGMOVE_LOG";

/// Maps a `-v` count to a default filter directive.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn init_logging(
    verbose: u8,
    ansi: bool,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(build_env_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_target(false),
        )
        .try_init()
}
