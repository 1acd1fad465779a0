// crates/safenet-server/src/telemetry.rs
// ============================================================================
// Module: Telemetry
// Description: Global tracing subscriber setup.
// Purpose: Route log events to stderr in text or JSON form.
// Dependencies: safenet-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! `RUST_LOG` wins over `logging.filter` when it holds a valid directive.

use safenet_config::LogFormat;
use safenet_config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive does not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// A global subscriber is already installed.
    #[error("tracing init failed: {0}")]
    Install(String),
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber is
/// already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|err| TelemetryError::Filter(err.to_string()))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| TelemetryError::Install(err.to_string()))
}
