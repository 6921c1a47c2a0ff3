//! Constants shared across the crate.
//!
//! Defaults, validation ranges, file names and persisted key names live here so that
//! the config loader, the settings store and the CLI agree on them.

// # Application identity

/// Directory name used under the XDG config and state homes.
pub const APP_DIR_NAME: &str = "skycycle";

/// Name of the application configuration file.
pub const CONFIG_FILE_NAME: &str = "skycycle.toml";

/// Name of the persisted preferences file inside the state directory.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Lock file guarding writes to the preferences file.
pub const SETTINGS_LOCK_FILE_NAME: &str = "settings.lock";

// # Persisted preference keys

pub const TEMPERATURE_UNIT_KEY: &str = "temperature_unit";
pub const IS_SYSTEM_THEME_KEY: &str = "is_system_theme";
pub const IS_DARK_THEME_KEY: &str = "is_dark_theme";

// # Settings defaults

pub const DEFAULT_IS_SYSTEM_THEME: bool = true;
pub const DEFAULT_IS_DARK_THEME: bool = false;

// # Sun window defaults

pub const DEFAULT_SUNRISE: &str = "06:00:00";
pub const DEFAULT_SUNSET: &str = "19:00:00";

/// Progress reported for windows with no usable daylight or night span.
pub const DEGENERATE_PROGRESS: f32 = 0.5;

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

// # Watch loop

pub const DEFAULT_UPDATE_INTERVAL: u64 = 60; // seconds
pub const MINIMUM_UPDATE_INTERVAL: u64 = 1;
pub const MAXIMUM_UPDATE_INTERVAL: u64 = 3600;

// # Arc geometry

pub const DEFAULT_ARC_RADIUS: f64 = 100.0;

// # Geographic ranges

pub const MINIMUM_LATITUDE: f64 = -90.0;
pub const MAXIMUM_LATITUDE: f64 = 90.0;
pub const MINIMUM_LONGITUDE: f64 = -180.0;
pub const MAXIMUM_LONGITUDE: f64 = 180.0;

// # File watching

/// Debounce window for settings file change events.
pub const WATCH_DEBOUNCE_MS: u64 = 500;

// # Simulation

/// Acceleration used when `simulate` is given no multiplier (one hour per second).
pub const DEFAULT_SIMULATION_MULTIPLIER: f64 = 3600.0;

// # Exit codes

pub const EXIT_FAILURE: i32 = 1;
