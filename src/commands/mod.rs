//! Command-line command handlers for skycycle.
//!
//! Each command is implemented in its own submodule. Handlers receive everything they
//! depend on (configuration directory, clock) as arguments.

pub mod get;
pub mod help;
pub mod set;
pub mod simulate;
pub mod sun;
pub mod watch;

use anyhow::Result;
use std::path::Path;

use crate::settings::{FilePreferenceStorage, SettingsStore};

/// Open the settings store belonging to a configuration directory.
pub(crate) fn open_settings_store(config_dir: Option<&Path>) -> Result<SettingsStore> {
    let storage = FilePreferenceStorage::for_config_dir(config_dir)?;
    Ok(SettingsStore::open(Box::new(storage)))
}
