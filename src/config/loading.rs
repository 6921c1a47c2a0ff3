//! Configuration loading functionality.
//!
//! Handles locating the configuration file, creating a default one on first use,
//! parsing, validation and defaults.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use super::validation::validate_config;
use crate::common::constants::*;
use crate::common::utils::private_path;

/// Load configuration from `config_dir`, or the default directory when `None`.
///
/// A default configuration file is created if none exists yet.
pub fn load(config_dir: Option<&Path>) -> Result<Config> {
    let config_path = get_config_path(config_dir)?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
    }

    load_from_path(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            private_path(&config_path)
        )
    })
}

/// Load configuration from a specific path.
///
/// Unlike [`load`], a missing file is an error here rather than a reason to create one.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", private_path(path));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    validate_config(&config)?;
    apply_defaults(&mut config);

    Ok(config)
}

/// Get the configuration file path.
pub fn get_config_path(config_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(custom_dir) = config_dir {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Apply default values to configuration fields.
///
/// Coordinates are left alone: a half-specified location is rejected by validation,
/// and no location at all means the manual times are used.
pub(super) fn apply_defaults(config: &mut Config) {
    if config.sunrise.is_none() {
        config.sunrise = Some(DEFAULT_SUNRISE.to_string());
    }
    if config.sunset.is_none() {
        config.sunset = Some(DEFAULT_SUNSET.to_string());
    }
    if config.update_interval.is_none() {
        config.update_interval = Some(DEFAULT_UPDATE_INTERVAL);
    }
    if config.arc_radius.is_none() {
        config.arc_radius = Some(DEFAULT_ARC_RADIUS);
    }
}
