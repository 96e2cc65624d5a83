//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};
use crate::error::{Error, Result};

/// Install the global tracing subscriber described by `config`
///
/// Fails if a global subscriber is already installed.
#[mutants::skip] // Installs process-global state; only the error path is unit tested
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.rust_log)
        .map_err(|e| Error::Configuration(format!("Invalid RUST_LOG directives: {}", e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.log_format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| Error::Internal(format!("Failed to install tracing subscriber: {}", e)))?;

    tracing::debug!(format = %config.log_format, "Tracing initialized");
    Ok(())
}
