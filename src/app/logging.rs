use clap::ValueEnum;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// HTTP stack crates that are too chatty below warn
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "h2"];

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Default filter: `level` for everything, warn for the HTTP stack.
pub fn build_filter_string(level: LogLevel) -> String {
    let mut filter_parts = Vec::with_capacity(QUIET_TARGETS.len() + 1);
    filter_parts.push(level.as_str().to_string());
    for target in QUIET_TARGETS {
        filter_parts.push(format!("{target}=warn"));
    }
    filter_parts.join(",")
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` replaces the default filter when set. `LOG_FORMAT=json`
/// switches to flattened JSON lines.
pub fn init_tracing(level: LogLevel) -> Result<(), LoggingError> {
    let filter_string =
        std::env::var("RUST_LOG").unwrap_or_else(|_| build_filter_string(level));
    let env_filter = EnvFilter::try_new(&filter_string).map_err(|source| LoggingError::Filter {
        filter: filter_string.clone(),
        source,
    })?;

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}
