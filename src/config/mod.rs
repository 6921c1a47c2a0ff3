//! Configuration management for skycycle.
//!
//! This module handles loading, validation, and management of the application
//! configuration stored in `skycycle.toml`. The configuration describes *where* and
//! *how* the sun is tracked: manual sunrise/sunset times or geographic coordinates,
//! the refresh interval for `watch`, and the arc geometry used for indicator output.
//! User preferences (temperature unit, theme) are not configuration; they live in the
//! settings store.
//!
//! ## Configuration Location
//!
//! - `$XDG_CONFIG_HOME/skycycle/skycycle.toml` (usually `~/.config/skycycle/`)
//! - `<dir>/skycycle.toml` when `--config <dir>` is given
//!
//! A commented default file is written the first time the configuration is loaded
//! from a location that has none.
//!
//! ## Module Structure
//!
//! - `builder`: Creating default configuration files
//! - `loading`: Loading configurations and applying defaults
//! - `validation`: Rejecting impossible values before they are used

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod builder;
mod loading;
mod validation;


pub use builder::create_default_config;
pub use loading::{get_config_path, load, load_from_path};
pub use validation::validate_config;

use crate::common::constants::*;
use crate::sun::SunWindow;

/// Configuration structure for skycycle.
///
/// Every field is optional in the file. After loading, `apply_defaults` fills in
/// `sunrise`, `sunset`, `update_interval` and `arc_radius`; `latitude` and
/// `longitude` stay unset unless the user provides both.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub sunrise: Option<String>,      // HH:MM:SS
    pub sunset: Option<String>,       // HH:MM:SS
    pub latitude: Option<f64>,        // degrees, -90 to 90
    pub longitude: Option<f64>,       // degrees, -180 to 180
    pub update_interval: Option<u64>, // seconds between refreshes in watch mode
    pub arc_radius: Option<f64>,      // radius used for indicator coordinates
}

impl Config {
    /// Load configuration from the default or a custom directory.
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        load(config_dir)
    }

    /// Load from path using the module's load_from_path function
    pub fn load_from_path(path: &Path) -> Result<Self> {
        load_from_path(path)
    }

    /// Get configuration path using the module's get_config_path function
    pub fn get_config_path(config_dir: Option<&Path>) -> Result<PathBuf> {
        get_config_path(config_dir)
    }

    /// Coordinates, when both are configured.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Sunrise/sunset window to use on `date`.
    ///
    /// Coordinates take precedence over the manual times.
    pub fn sun_window(&self, date: NaiveDate) -> Result<SunWindow> {
        if let Some((latitude, longitude)) = self.coordinates() {
            return SunWindow::for_location(latitude, longitude, date);
        }
        SunWindow::parse(
            self.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE),
            self.sunset.as_deref().unwrap_or(DEFAULT_SUNSET),
        )
    }

    pub fn update_interval(&self) -> u64 {
        self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL)
    }

    pub fn arc_radius(&self) -> f64 {
        self.arc_radius.unwrap_or(DEFAULT_ARC_RADIUS)
    }

    /// Log the effective configuration in the block format.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        match self.coordinates() {
            Some((latitude, longitude)) => {
                log_indented!("Location: {latitude:.4}°, {longitude:.4}°");
            }
            None => {
                log_indented!(
                    "Sunrise: {}",
                    self.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE)
                );
                log_indented!(
                    "Sunset: {}",
                    self.sunset.as_deref().unwrap_or(DEFAULT_SUNSET)
                );
            }
        }
        log_indented!("Update interval: {} seconds", self.update_interval());
        log_indented!("Arc radius: {}", self.arc_radius());
    }
}
