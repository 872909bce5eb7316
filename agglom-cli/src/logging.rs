//! Structured logging for the `agglom` binary.
//!
//! Diagnostics go to `stderr` through a global `tracing` subscriber so the
//! report written to `stdout` stays clean. `log` records from dependencies are
//! bridged into the same subscriber.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FORMAT_ENV: &str = "AGGLOM_LOG_FORMAT";
const DEFAULT_DIRECTIVE: &str = "info";

static INSTALLED: OnceLock<LogFormat> = OnceLock::new();

/// Output format of the diagnostic stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text, one event per line.
    #[default]
    Human,
    /// Newline-delimited JSON with the active span list attached.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }
}

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The format variable held bytes that are not UTF-8.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Variable that was read.
        name: &'static str,
        /// Underlying lookup failure.
        #[source]
        source: env::VarError,
    },
    /// `AGGLOM_LOG_FORMAT` named an unknown format.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Normalised value supplied by the user.
        provided: String,
    },
    /// Another global subscriber was already installed.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing_subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Installs the global subscriber once per process.
///
/// `AGGLOM_LOG_FORMAT` picks `human` (default) or `json`; `RUST_LOG` controls
/// the level filter and defaults to `info`. Later calls return the format
/// chosen by the first successful call.
///
/// # Errors
/// Returns [`LoggingError`] when the format variable is not UTF-8 or names an
/// unknown format. A subscriber installed by someone else is reported on
/// `stderr` and otherwise tolerated.
pub fn init_logging() -> Result<LogFormat, LoggingError> {
    if let Some(format) = INSTALLED.get() {
        return Ok(*format);
    }

    let format = format_from_env()?;
    if let Err(err) = install_subscriber(format) {
        report_existing_subscriber(&err);
    }
    Ok(*INSTALLED.get_or_init(|| format))
}

#[expect(
    clippy::print_stderr,
    reason = "no subscriber of ours is active to carry this message"
)]
fn report_existing_subscriber(err: &LoggingError) {
    eprintln!("structured logging already configured elsewhere: {err}");
}

fn format_from_env() -> Result<LogFormat, LoggingError> {
    match env::var(LOG_FORMAT_ENV) {
        Ok(raw) => raw.parse(),
        Err(env::VarError::NotPresent) => Ok(LogFormat::default()),
        Err(source @ env::VarError::NotUnicode(_)) => Err(LoggingError::InvalidUnicode {
            name: LOG_FORMAT_ENV,
            source,
        }),
    }
}

fn install_subscriber(format: LogFormat) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let layer = match format {
        LogFormat::Human => layer.boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    // A `log` logger may already be registered by an embedding process.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("human", LogFormat::Human)]
    #[case("Text", LogFormat::Human)]
    #[case(" JSON ", LogFormat::Json)]
    fn log_format_parses_supported_values(#[case] raw: &str, #[case] expected: LogFormat) {
        assert_eq!(raw.parse::<LogFormat>().expect("format must parse"), expected);
    }

    #[rstest]
    fn log_format_rejects_unknown_values() {
        let err = "yaml".parse::<LogFormat>().expect_err("yaml is not supported");
        assert!(
            matches!(err, LoggingError::UnsupportedFormat { ref provided } if provided == "yaml"),
            "unexpected error: {err:?}"
        );
    }

    #[rstest]
    fn repeated_initialisation_keeps_the_first_format() {
        let first = init_logging().expect("logging must initialise");
        let second = init_logging().expect("repeat calls must succeed");
        assert_eq!(first, second);
    }
}
