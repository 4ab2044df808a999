//! Tracing subscriber setup.

use pageturn_core::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding a full filter directive. Takes precedence
/// over the configured level.
pub const LOG_ENV_VAR: &str = "PAGETURN_LOG";

/// Errors from logging setup.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter {directive:?}: {message}")]
    Filter { directive: String, message: String },

    #[error("a global subscriber is already installed")]
    AlreadyInstalled,
}

/// Build the filter: `PAGETURN_LOG` if set and valid, else `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LoggingError::Filter {
        directive: level.to_string(),
        message: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// A second call returns [`LoggingError::AlreadyInstalled`] and leaves the
/// first subscriber in place.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(&config.level)?;
    let registry = Registry::default().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Human => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };
    installed.map_err(|_| LoggingError::AlreadyInstalled)
}

/// Like [`init_logging`], but an existing subscriber is not an error.
pub fn try_init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    match init_logging(config) {
        Err(LoggingError::AlreadyInstalled) => Ok(()),
        other => other,
    }
}

/// Map CLI verbosity onto a level, keeping the configured one at zero.
pub fn level_for_verbosity(configured: &str, verbose: u8) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var_os(LOG_ENV_VAR).is_some() {
            return;
        }
        let err = build_filter("pageturn=loud").unwrap_err();
        assert!(matches!(err, LoggingError::Filter { .. }));
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity("warn", 0), "warn");
        assert_eq!(level_for_verbosity("warn", 1), "debug");
        assert_eq!(level_for_verbosity("warn", 3), "trace");
    }

    #[test]
    fn test_second_init_is_reported() {
        let config = LoggingConfig {
            level: "info".into(),
            format: LogFormat::Json,
        };
        try_init_logging(&config).unwrap();
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::AlreadyInstalled)
        ));
        try_init_logging(&config).unwrap();
    }
}
