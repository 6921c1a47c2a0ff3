//! Default configuration file creation.
//!
//! The default file spells out every option with its default value and an aligned
//! comment, so users can discover settings by reading it.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;
use crate::common::utils::private_path;

/// Create a default config file at `path`, creating parent directories as needed.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let config_content = ConfigBuilder::new()
        .add_section("Manual times")
        .add_setting(
            "sunrise",
            &format!("\"{DEFAULT_SUNRISE}\""),
            "Time the day starts (HH:MM:SS)",
        )
        .add_setting(
            "sunset",
            &format!("\"{DEFAULT_SUNSET}\""),
            "Time the night starts (HH:MM:SS)",
        )
        .add_section("Location")
        .add_commented_setting(
            "latitude",
            "52.2297",
            "Uncomment both to compute sunrise/sunset daily (-90 to 90)",
        )
        .add_commented_setting("longitude", "21.0122", "Degrees east (-180 to 180)")
        .add_section("Display")
        .add_setting(
            "update_interval",
            &DEFAULT_UPDATE_INTERVAL.to_string(),
            &format!(
                "Seconds between refreshes in watch mode ({MINIMUM_UPDATE_INTERVAL}-{MAXIMUM_UPDATE_INTERVAL})"
            ),
        )
        .add_setting(
            "arc_radius",
            &format!("{DEFAULT_ARC_RADIUS:.1}"),
            "Radius of the day/night arc for indicator coordinates",
        )
        .build();

    fs::write(path, config_content)
        .with_context(|| format!("Failed to write default config to {}", private_path(path)))?;

    log_block_start!("Created default configuration:");
    log_indented!("{}", private_path(path));

    Ok(())
}

#[derive(Debug)]
enum EntryType {
    Section,
    Setting { line: String, comment: String },
}

#[derive(Debug)]
struct ConfigEntry {
    content: String,
    entry_type: EntryType,
}

/// Accumulates sections and settings, aligning trailing comments on build.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry {
            content: format!("#[{title}]"),
            entry_type: EntryType::Section,
        });
        self
    }

    fn add_setting(self, key: &str, value: &str, comment: &str) -> Self {
        self.push_setting(format!("{key} = {value}"), comment)
    }

    /// A setting written commented out, to be enabled by hand.
    fn add_commented_setting(self, key: &str, value: &str, comment: &str) -> Self {
        self.push_setting(format!("#{key} = {value}"), comment)
    }

    fn push_setting(mut self, line: String, comment: &str) -> Self {
        self.entries.push(ConfigEntry {
            content: line.clone(),
            entry_type: EntryType::Setting {
                line,
                comment: format!("# {comment}"),
            },
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.entry_type {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section => None,
            })
            .max()
            .unwrap_or(0)
            + 1; // one space between setting and comment

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry.entry_type {
                EntryType::Section => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(entry.content);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        let mut content = result.join("\n");
        content.push('\n');
        content
    }
}
