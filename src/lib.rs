//! # Skycycle Library
//!
//! Day/night tracking and user preferences behind the `skycycle` binary.
//!
//! This library exists to enable testing of the internals and to keep CLI dispatch
//! (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Sun**: `sun` module turns a wall-clock time and a sunrise/sunset window into a
//!   day/night phase, progress through that phase, and a position on the arc
//! - **Settings**: `settings` module holds the observable, persisted user preferences
//!   (temperature unit, theme) with file storage and hot reload
//! - **Time**: `time_source` abstracts the clock so everything can run on real,
//!   manual or simulated time
//! - **Configuration**: `config` module for the TOML file describing the window and
//!   refresh behavior
//! - **Commands**: `commands` module for CLI subcommands (sun, get, set, watch, simulate)
//! - **Infrastructure**: argument parsing, logging and shared utilities

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod settings;
pub mod sun;
pub mod time_source;

pub use settings::{SettingUpdate, SettingsStore, TemperatureUnit, UserSettings};
pub use sun::{SunPosition, SunWindow, calculate_sun_position};
pub use time_source::TimeSource;
