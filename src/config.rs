//! Runtime configuration
//!
//! YAML file resolution follows the usual order: an explicit path, then
//! `./config/inpage.yaml`, then `<config_dir>/inpage/config.yaml`. A missing
//! file yields the defaults. `INPAGE_*` environment variables override
//! whatever was loaded.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use action_primitives::PrimitiveOptions;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

pub const ENV_FRAME_INTERVAL_MS: &str = "INPAGE_FRAME_INTERVAL_MS";
pub const ENV_STABLE_POLL_INTERVAL_MS: &str = "INPAGE_STABLE_POLL_INTERVAL_MS";
pub const ENV_MIN_FRAME_GAP_MS: &str = "INPAGE_MIN_FRAME_GAP_MS";
pub const ENV_LOG_LEVEL: &str = "INPAGE_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Interval of the timer-driven frame source
    pub frame_interval_ms: u64,
    /// Tick interval of the stable-position wait for a single frame
    pub stable_poll_interval_ms: u64,
    /// Frames closer than this are skipped by multi-frame stability waits
    pub min_frame_gap_ms: u64,
    /// Default tracing filter when `RUST_LOG` is unset; hand the loaded
    /// config to `telemetry::init_logging_from_config`
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            stable_poll_interval_ms: 16,
            min_frame_gap_ms: 15,
            log_level: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn primitive_options(&self) -> PrimitiveOptions {
        PrimitiveOptions {
            stable_poll_interval: Duration::from_millis(self.stable_poll_interval_ms),
            min_frame_gap: Duration::from_millis(self.min_frame_gap_ms),
        }
    }

    /// Apply `INPAGE_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_millis(ENV_FRAME_INTERVAL_MS)? {
            self.frame_interval_ms = value;
        }
        if let Some(value) = env_millis(ENV_STABLE_POLL_INTERVAL_MS)? {
            self.stable_poll_interval_ms = value;
        }
        if let Some(value) = env_millis(ENV_MIN_FRAME_GAP_MS)? {
            self.min_frame_gap_ms = value;
        }
        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            let level = level.trim();
            if !level.is_empty() {
                debug!(level, "log level overridden from environment");
                self.log_level = level.to_string();
            }
        }
        Ok(())
    }

    /// Zero intervals would make the pollers spin
    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            bail!("log_level {:?} is not a tracing level", self.log_level);
        }
        if self.frame_interval_ms == 0 {
            bail!("frame_interval_ms must be greater than zero");
        }
        if self.stable_poll_interval_ms == 0 {
            bail!("stable_poll_interval_ms must be greater than zero");
        }
        Ok(())
    }
}

fn env_millis(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            let value = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {name}: {raw:?}"))?;
            debug!(variable = name, value, "interval overridden from environment");
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}

pub struct LoadedConfig {
    pub config: RuntimeConfig,
    pub path: PathBuf,
}

pub async fn load_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => {
            // Priority: ./config/inpage.yaml > ~/.config/inpage/config.yaml
            let local_config = PathBuf::from("config/inpage.yaml");
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("inpage");
                path.push("config.yaml");
                path
            }
        }
    };

    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;
        let config: RuntimeConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded configuration from: {}", config_path.display());
        config
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        RuntimeConfig::default()
    };

    config.apply_env_overrides()?;
    config.validate()?;
    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}
