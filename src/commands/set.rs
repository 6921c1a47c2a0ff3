//! Set command implementation for modifying settings fields
//!
//! All values are validated before anything is written. A running `watch` picks the
//! change up through its settings watcher.

use anyhow::Result;
use std::path::Path;

use crate::common::constants::EXIT_FAILURE;
use crate::common::utils::private_path;
use crate::settings::{
    PersistenceUnavailable, SettingUpdate, UnknownFieldError, field_names, field_value,
};

/// Handle the set command - update settings fields
pub fn handle_set_command(config_dir: Option<&Path>, fields: &[(String, String)]) -> Result<()> {
    log_version!();

    // Validate all fields first before making any changes
    let mut updates = Vec::with_capacity(fields.len());
    for (field, value) in fields {
        match SettingUpdate::parse(field, value) {
            Ok(update) => updates.push(update),
            Err(e) => {
                log_pipe!();
                if e.downcast_ref::<UnknownFieldError>().is_some() {
                    log_error!("{e}");
                    log_block_start!("Available fields:");
                    for name in field_names() {
                        log_indented!("{name}");
                    }
                } else {
                    log_error!("Invalid value for field '{field}': {e:#}");
                }
                anyhow::bail!("Settings validation failed");
            }
        }
    }

    let store = super::open_settings_store(config_dir)?;
    let before = store.read();

    for update in combine_updates(updates) {
        if let Err(e) = store.update(update) {
            if let Some(unavailable) = e.downcast_ref::<PersistenceUnavailable>() {
                log_pipe!();
                log_error!("Could not save settings");
                log_indented!("{}", unavailable.reason);
                log_indented!("The previous values remain in effect");
                log_end!();
                std::process::exit(EXIT_FAILURE);
            }
            return Err(e);
        }
    }

    let after = store.read();
    let changed: Vec<&str> = field_names()
        .into_iter()
        .filter(|field| field_value(&before, field).ok() != field_value(&after, field).ok())
        .collect();

    if changed.is_empty() {
        log_block_start!("Settings unchanged");
        if fields.len() == 1 {
            log_indented!(
                "{} is already set to {}",
                fields[0].0,
                field_value(&after, &fields[0].0)?
            );
        } else {
            log_indented!("All fields already have the specified values");
        }
    } else {
        log_block_start!("Updated settings");
        for field in changed {
            log_indented!(
                "{field}: {} → {}",
                field_value(&before, field)?,
                field_value(&after, field)?
            );
        }
        if let Some(path) = store.location() {
            log_indented!("in {}", private_path(&path));
        }
    }

    log_end!();
    Ok(())
}

/// Merge a command line's updates into the writes to perform.
///
/// Later values win over earlier ones for the same field, and the two theme switches
/// are written together when both are given.
pub(crate) fn combine_updates(updates: Vec<SettingUpdate>) -> Vec<SettingUpdate> {
    let mut unit = None;
    let mut is_system = None;
    let mut is_dark = None;

    for update in updates {
        match update {
            SettingUpdate::TemperatureUnit(value) => unit = Some(value),
            SettingUpdate::SystemTheme(value) => is_system = Some(value),
            SettingUpdate::DarkTheme(value) => is_dark = Some(value),
            SettingUpdate::Theme {
                is_system: system,
                is_dark: dark,
            } => {
                is_system = Some(system);
                is_dark = Some(dark);
            }
        }
    }

    let mut combined = Vec::new();
    if let Some(unit) = unit {
        combined.push(SettingUpdate::TemperatureUnit(unit));
    }
    match (is_system, is_dark) {
        (Some(is_system), Some(is_dark)) => {
            combined.push(SettingUpdate::Theme { is_system, is_dark })
        }
        (Some(is_system), None) => combined.push(SettingUpdate::SystemTheme(is_system)),
        (None, Some(is_dark)) => combined.push(SettingUpdate::DarkTheme(is_dark)),
        (None, None) => {}
    }
    combined
}

/// Display detailed help for the set command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("set - Update settings fields");
    log_block_start!("Usage: skycycle set <field>=<value> [<field>=<value>...]");
    log_block_start!("Fields:");
    log_indented!("temperature_unit     celsius (c) or fahrenheit (f)");
    log_indented!("is_system_theme      true/false, follow the platform theme");
    log_indented!("is_dark_theme        true/false, used when not following the platform");
    log_block_start!("Notes:");
    log_indented!("All values are validated before anything is written");
    log_indented!("Setting both theme fields writes them together");
    log_indented!("A running 'skycycle watch' picks up changes automatically");
    log_block_start!("Examples:");
    log_indented!("skycycle set temperature_unit=fahrenheit");
    log_indented!("skycycle set is_system_theme=false is_dark_theme=true");
    log_end!();
}
