//! Structured logging initialisation.
//!
//! Two output formats are supported:
//! - [`LogFormat::Human`]: readable lines for local development.
//! - [`LogFormat::Json`]: newline-delimited JSON for log aggregation.
//!
//! `RUST_LOG` overrides the configured level when set.

use sharepool_types::{Result, ServiceConfig, SharePoolError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        if config.log_json { Self::Json } else { Self::Human }
    }
}

/// Install the global tracing subscriber.
///
/// `level` is an `EnvFilter` directive such as `"info"` or
/// `"debug,sharepool_ledger=trace"`.
///
/// # Errors
/// `Internal` if a global subscriber is already installed.
pub fn init_logging(format: LogFormat, level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let installed = match format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .try_init(),
    };
    installed.map_err(|e| SharePoolError::Internal(format!("logging already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_config() {
        let mut cfg = ServiceConfig::default();
        assert_eq!(LogFormat::from_config(&cfg), LogFormat::Human);
        cfg.log_json = true;
        assert_eq!(LogFormat::from_config(&cfg), LogFormat::Json);
    }

    #[test]
    fn second_init_fails_cleanly() {
        // Another test may have installed a subscriber first; either way the
        // second call in this process must report an error, not panic.
        let _ = init_logging(LogFormat::Json, "warn");
        assert!(init_logging(LogFormat::Human, "info").is_err());
    }
}
