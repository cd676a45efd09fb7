#![forbid(unsafe_code)]

//! Structured logging setup.
//!
//! modalkit crates emit `tracing` events and spans unconditionally; nothing
//! is printed until a subscriber is installed. [`init`] installs a
//! `tracing-subscriber` fmt subscriber filtered by the `MODALKIT_LOG`
//! environment variable (standard `EnvFilter` directive syntax), falling
//! back to the directive in [`LogConfig::default_directive`].
//!
//! JSON output requires the `tracing-json` feature.

use std::fmt;

use tracing_subscriber::EnvFilter;

/// Environment variable consulted for filter directives.
pub const LOG_ENV: &str = "MODALKIT_LOG";

/// Output format for the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Output format.
    pub format: LogFormat,
    /// Directive used when `MODALKIT_LOG` is unset or empty.
    pub default_directive: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_directive: "info".to_owned(),
        }
    }
}

impl LogConfig {
    /// Set the output format.
    #[must_use]
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the fallback directive.
    #[must_use]
    pub fn default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }
}

/// Errors from logging setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// A filter directive could not be parsed.
    InvalidFilter(String),
    /// A global subscriber is already installed.
    AlreadyInitialized(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFilter(msg) => write!(f, "invalid log filter: {msg}"),
            Self::AlreadyInitialized(msg) => {
                write!(f, "global subscriber already installed: {msg}")
            }
        }
    }
}

impl std::error::Error for LoggingError {}

/// Build the filter from `env_value` (the `MODALKIT_LOG` contents), falling
/// back to `default_directive` when it is unset or blank.
pub fn build_filter(
    env_value: Option<&str>,
    default_directive: &str,
) -> Result<EnvFilter, LoggingError> {
    let directive = match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => default_directive,
    };
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter(e.to_string()))
}

/// Install the global subscriber described by `config`.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(env_value.as_deref(), &config.default_directive)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        #[cfg(feature = "tracing-json")]
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}
