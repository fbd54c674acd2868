//! Process-wide `tracing` subscriber for the binaries.
//!
//! The filter comes from `RUST_LOG` (default `warn`), the output format from
//! `NEON_TESTGEN_LOG_FORMAT` (`pretty`, `compact` or `json`, default
//! `compact`). Events go to stderr so stdout stays free for reports.

use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const FORMAT_ENV: &str = "NEON_TESTGEN_LOG_FORMAT";

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Formatter output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human oriented.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

/// Errors installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// `NEON_TESTGEN_LOG_FORMAT` holds an unknown value.
    #[error("unknown log format `{0}` (expected pretty, compact or json)")]
    UnknownFormat(String),
    /// A global subscriber is already installed.
    #[error("failed to install global tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let base = tracing_fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Pretty => Box::new(base.pretty()),
        LogFormat::Compact => Box::new(base.compact()),
        LogFormat::Json => Box::new(base.json().with_ansi(false)),
    }
}

/// Installs the subscriber with the given format.
///
/// # Errors
///
/// Returns [`LoggingError::Init`] if a global subscriber is already set.
pub fn init_with(format: LogFormat) -> Result<(), LoggingError> {
    Registry::default()
        .with(layer(format))
        .with(filter())
        .try_init()?;
    Ok(())
}

/// Installs the subscriber configured from the environment.
///
/// # Errors
///
/// Returns [`LoggingError::UnknownFormat`] for a bad `NEON_TESTGEN_LOG_FORMAT`
/// and [`LoggingError::Init`] if a global subscriber is already set.
pub fn init() -> Result<(), LoggingError> {
    let format = match env::var(FORMAT_ENV) {
        Ok(value) if !value.trim().is_empty() => value.parse()?,
        _ => LogFormat::default(),
    };
    init_with(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!(matches!(
            "yaml".parse::<LogFormat>(),
            Err(LoggingError::UnknownFormat(f)) if f == "yaml"
        ));
    }

    #[test]
    fn second_install_is_an_error() {
        // The first call may race other tests; only the second must fail.
        let _ = init_with(LogFormat::Compact);
        assert!(matches!(
            init_with(LogFormat::Json),
            Err(LoggingError::Init(_))
        ));
    }
}
