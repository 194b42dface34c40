//! Logging setup

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::RuntimeConfig;

/// Install the global subscriber: `RUST_LOG` when set, `level` otherwise
/// (`debug` forces DEBUG). Fails if a subscriber is already installed.
pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string())))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// [`init_logging`] at the level a loaded configuration carries
pub fn init_logging_from_config(config: &RuntimeConfig, debug: bool) -> Result<()> {
    init_logging(&config.log_level, debug)
}
