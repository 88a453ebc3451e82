//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; hosts that want them printed
//! call [`init_logging`] once at startup.

use crate::config::LoggingConfig;
use crate::{ForecastError, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global subscriber for the configured level and format
///
/// `RUST_LOG` takes precedence over the configured level. Fails with a
/// configuration error for an unknown format or when a global subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match config.format.as_str() {
        "json" => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
        "pretty" => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
        other => {
            return Err(ForecastError::config(format!(
                "Invalid log format '{other}'. Must be one of: pretty, json"
            )));
        }
    };
    installed.map_err(|e| ForecastError::config(format!("Failed to initialize logging: {e}")))?;

    info!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}
