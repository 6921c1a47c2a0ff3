//! User display preferences: temperature unit and theme.
//!
//! Preferences are persisted as a flat key-value table:
//!
//! ```toml
//! temperature_unit = "FAHRENHEIT"  # enum name, CELSIUS or FAHRENHEIT
//! is_system_theme = false          # follow the platform theme
//! is_dark_theme = true             # used when not following the platform
//! ```
//!
//! Missing keys fall back to their defaults one field at a time, so files written by
//! older versions (which only knew `temperature_unit`) keep loading. Unknown keys are
//! carried through rewrites untouched.
//!
//! [`store::SettingsStore`] owns the live value and its subscribers,
//! [`storage`] provides the durable backends, and [`watcher`] reloads the store when
//! the settings file is edited by another process.

pub mod storage;
pub mod store;
pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::constants::*;

pub use storage::{FilePreferenceStorage, MemoryPreferenceStorage, PreferenceStorage, Preferences};
pub use store::{SettingsStore, Subscription};
pub use watcher::{SettingsWatcher, WatchGuard};

/// Unit used to display temperatures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Persisted enum name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "CELSIUS",
            TemperatureUnit::Fahrenheit => "FAHRENHEIT",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// Convert a whole-degree Celsius reading into this unit.
    ///
    /// Uses integer arithmetic, truncating toward zero, the way readings are shown.
    pub fn convert(&self, celsius: i32) -> i32 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9 / 5 + 32,
        }
    }

    /// Format a Celsius reading for display, e.g. `72°F`.
    pub fn format(&self, celsius: i32) -> String {
        format!("{}{}", self.convert(celsius), self.symbol())
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "celsius" | "c" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" | "f" => Ok(TemperatureUnit::Fahrenheit),
            other => anyhow::bail!("Invalid temperature unit: {other} (use celsius or fahrenheit)"),
        }
    }
}

/// The complete set of user preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub temperature_unit: TemperatureUnit,
    pub is_system_theme: bool,
    pub is_dark_theme: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::default(),
            is_system_theme: DEFAULT_IS_SYSTEM_THEME,
            is_dark_theme: DEFAULT_IS_DARK_THEME,
        }
    }
}

impl UserSettings {
    /// Build settings from a persisted table, defaulting each missing or malformed key.
    pub fn from_preferences(preferences: &Preferences) -> Self {
        let defaults = Self::default();

        let temperature_unit = match preferences.get(TEMPERATURE_UNIT_KEY) {
            None => defaults.temperature_unit,
            Some(value) => match value.as_str().map(TemperatureUnit::from_str) {
                Some(Ok(unit)) => unit,
                _ => {
                    log_warning!("Ignoring invalid {TEMPERATURE_UNIT_KEY} value: {value}");
                    defaults.temperature_unit
                }
            },
        };

        Self {
            temperature_unit,
            is_system_theme: read_bool(preferences, IS_SYSTEM_THEME_KEY, defaults.is_system_theme),
            is_dark_theme: read_bool(preferences, IS_DARK_THEME_KEY, defaults.is_dark_theme),
        }
    }

    /// Whether the dark palette should be used, given the platform's current theme.
    pub fn uses_dark_theme(&self, platform_is_dark: bool) -> bool {
        if self.is_system_theme {
            platform_is_dark
        } else {
            self.is_dark_theme
        }
    }
}

fn read_bool(preferences: &Preferences, key: &str, default: bool) -> bool {
    match preferences.get(key) {
        None => default,
        Some(toml::Value::Boolean(value)) => *value,
        Some(other) => {
            log_warning!("Ignoring invalid {key} value: {other}");
            default
        }
    }
}

/// A single mutation of the persisted preferences.
///
/// `Theme` writes both theme keys together, as the settings panel does when the
/// "follow system" switch and the dark switch are changed as a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingUpdate {
    TemperatureUnit(TemperatureUnit),
    SystemTheme(bool),
    DarkTheme(bool),
    Theme { is_system: bool, is_dark: bool },
}

impl SettingUpdate {
    /// Parse a `field` / `value` pair as given on the command line.
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        match field {
            TEMPERATURE_UNIT_KEY => Ok(SettingUpdate::TemperatureUnit(value.parse()?)),
            IS_SYSTEM_THEME_KEY => Ok(SettingUpdate::SystemTheme(parse_bool(value)?)),
            IS_DARK_THEME_KEY => Ok(SettingUpdate::DarkTheme(parse_bool(value)?)),
            _ => Err(UnknownFieldError {
                field: field.to_string(),
            }
            .into()),
        }
    }

    /// Write this update into a persisted table, leaving other keys untouched.
    pub fn apply_to(&self, preferences: &mut Preferences) {
        let mut set = |key: &str, value: toml::Value| {
            preferences.insert(key.to_string(), value);
        };
        match *self {
            SettingUpdate::TemperatureUnit(unit) => {
                set(TEMPERATURE_UNIT_KEY, unit.as_str().into());
            }
            SettingUpdate::SystemTheme(is_system) => set(IS_SYSTEM_THEME_KEY, is_system.into()),
            SettingUpdate::DarkTheme(is_dark) => set(IS_DARK_THEME_KEY, is_dark.into()),
            SettingUpdate::Theme { is_system, is_dark } => {
                set(IS_SYSTEM_THEME_KEY, is_system.into());
                set(IS_DARK_THEME_KEY, is_dark.into());
            }
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(anyhow::anyhow!("Must be true or false, got '{other}'")),
    }
}

/// Names of every persisted field, in display order.
pub fn field_names() -> [&'static str; 3] {
    [TEMPERATURE_UNIT_KEY, IS_SYSTEM_THEME_KEY, IS_DARK_THEME_KEY]
}

/// Read one field of `settings` by its persisted name.
pub fn field_value(settings: &UserSettings, field: &str) -> Result<String> {
    match field {
        TEMPERATURE_UNIT_KEY => Ok(settings.temperature_unit.as_str().to_string()),
        IS_SYSTEM_THEME_KEY => Ok(settings.is_system_theme.to_string()),
        IS_DARK_THEME_KEY => Ok(settings.is_dark_theme.to_string()),
        _ => Err(UnknownFieldError {
            field: field.to_string(),
        })
        .context("Cannot read settings field"),
    }
}

/// Error returned for a field name that is not part of the settings schema.
#[derive(Debug)]
pub struct UnknownFieldError {
    pub field: String,
}

impl fmt::Display for UnknownFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown settings field: '{}'", self.field)
    }
}

impl std::error::Error for UnknownFieldError {}

/// The settings could not be written to durable storage.
///
/// The store keeps serving its last known value; callers log this and carry on.
#[derive(Debug)]
pub struct PersistenceUnavailable {
    pub reason: String,
}

impl fmt::Display for PersistenceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Settings persistence unavailable: {}", self.reason)
    }
}

impl std::error::Error for PersistenceUnavailable {}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(content: &str) -> Preferences {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_empty_table_gives_defaults() {
        let settings = UserSettings::from_preferences(&Preferences::new());
        assert_eq!(settings.temperature_unit, TemperatureUnit::Celsius);
        assert!(settings.is_system_theme);
        assert!(!settings.is_dark_theme);
    }

    #[test]
    fn test_fields_default_independently() {
        let settings = UserSettings::from_preferences(&table(
            "temperature_unit = \"FAHRENHEIT\"\nis_dark_theme = \"maybe\"\n",
        ));
        assert_eq!(settings.temperature_unit, TemperatureUnit::Fahrenheit);
        assert!(settings.is_system_theme);
        assert!(!settings.is_dark_theme);

        let settings = UserSettings::from_preferences(&table("temperature_unit = \"KELVIN\""));
        assert_eq!(settings.temperature_unit, TemperatureUnit::Celsius);
    }

    #[test]
    fn test_update_touches_only_its_keys() {
        let mut preferences = table("is_dark_theme = true\nlegacy_key = 3\n");
        SettingUpdate::TemperatureUnit(TemperatureUnit::Fahrenheit).apply_to(&mut preferences);

        assert_eq!(
            preferences.get("temperature_unit").and_then(|v| v.as_str()),
            Some("FAHRENHEIT")
        );
        assert_eq!(preferences.get("is_dark_theme"), Some(&toml::Value::Boolean(true)));
        assert_eq!(preferences.get("legacy_key"), Some(&toml::Value::Integer(3)));
    }

    #[test]
    fn test_theme_update_writes_both_keys() {
        let mut preferences = Preferences::new();
        SettingUpdate::Theme {
            is_system: false,
            is_dark: true,
        }
        .apply_to(&mut preferences);
        let settings = UserSettings::from_preferences(&preferences);
        assert!(!settings.is_system_theme);
        assert!(settings.is_dark_theme);
        assert!(settings.uses_dark_theme(false));
    }

    #[test]
    fn test_parse_update() {
        assert_eq!(
            SettingUpdate::parse("temperature_unit", "F").unwrap(),
            SettingUpdate::TemperatureUnit(TemperatureUnit::Fahrenheit)
        );
        assert_eq!(
            SettingUpdate::parse("is_system_theme", "off").unwrap(),
            SettingUpdate::SystemTheme(false)
        );
        assert!(SettingUpdate::parse("is_dark_theme", "dusk").is_err());

        let err = SettingUpdate::parse("language", "pl").unwrap_err();
        assert!(err.downcast_ref::<UnknownFieldError>().is_some());
    }

    #[test]
    fn test_fahrenheit_conversion_truncates() {
        let unit = TemperatureUnit::Fahrenheit;
        assert_eq!(unit.convert(0), 32);
        assert_eq!(unit.convert(100), 212);
        assert_eq!(unit.convert(22), 71);
        assert_eq!(unit.convert(-40), -40);
        assert_eq!(unit.format(22), "71°F");
        assert_eq!(TemperatureUnit::Celsius.format(22), "22°C");
    }

    #[test]
    fn test_field_value_lookup() {
        let settings = UserSettings::default();
        assert_eq!(field_value(&settings, "temperature_unit").unwrap(), "CELSIUS");
        assert_eq!(field_value(&settings, "is_system_theme").unwrap(), "true");
        assert!(field_value(&settings, "nope").is_err());
    }
}
