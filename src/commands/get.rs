//! Get command implementation for reading settings fields
//!
//! Values are read through the settings store, so absent or malformed entries show
//! their defaults exactly as the application would use them.

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use crate::common::constants::EXIT_FAILURE;
use crate::settings::{field_names, field_value};

/// Handle the get command - read settings fields
///
/// # Arguments
/// * `config_dir` - Custom configuration directory, selecting the settings namespace
/// * `fields` - Field names to retrieve, or `all`
/// * `json` - Whether to output in JSON format
pub fn handle_get_command(config_dir: Option<&Path>, fields: &[String], json: bool) -> Result<()> {
    let store = super::open_settings_store(config_dir)?;
    let settings = store.read();

    let all_requested = fields.len() == 1 && fields[0] == "all";
    let fields_to_get: Vec<String> = if all_requested {
        field_names().iter().map(|f| f.to_string()).collect()
    } else {
        fields.to_vec()
    };

    let unknown: Vec<&str> = fields_to_get
        .iter()
        .map(String::as_str)
        .filter(|field| !field_names().contains(field))
        .collect();

    if !unknown.is_empty() {
        let error_msg = if unknown.len() == 1 {
            format!("Unknown field: {}", unknown[0])
        } else {
            format!("Unknown fields: {}", unknown.join(", "))
        };

        if json {
            let error_json = json!({
                "error": error_msg,
                "type": "UnknownField",
                "available": field_names(),
            });
            eprintln!("{}", serde_json::to_string(&error_json)?);
        } else {
            log_pipe!();
            log_error!("{error_msg}");
            log_block_start!("Available fields:");
            log_indented!("all (special: returns all fields)");
            for field in field_names() {
                log_indented!("{field}");
            }
            log_end!();
        }
        std::process::exit(EXIT_FAILURE);
    }

    let mut values = Vec::with_capacity(fields_to_get.len());
    for field in &fields_to_get {
        values.push((field.clone(), field_value(&settings, field)?));
    }

    if json {
        let mut json_obj = serde_json::Map::new();
        for (field, value) in values {
            // Booleans stay booleans in JSON
            let value = match value.as_str() {
                "true" => json!(true),
                "false" => json!(false),
                _ => json!(value),
            };
            json_obj.insert(field, value);
        }
        println!("{}", serde_json::to_string(&json_obj)?);
    } else if values.len() == 1 && !all_requested {
        println!("{}", values[0].1);
    } else {
        for (field, value) in values {
            println!("{field}={value}");
        }
    }

    Ok(())
}

/// Display detailed help for the get command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("get - Read settings fields");
    log_block_start!("Usage: skycycle get [OPTIONS] <field> [<field>...]");
    log_block_start!("Options:");
    log_indented!("-j, --json           Output in JSON format");
    log_block_start!("Special Fields:");
    log_indented!("all                  Get all settings fields");
    log_block_start!("Available Fields:");
    log_indented!("temperature_unit     CELSIUS or FAHRENHEIT");
    log_indented!("is_system_theme      Follow the platform theme (true/false)");
    log_indented!("is_dark_theme        Dark theme when not following the platform");
    log_block_start!("Examples:");
    log_indented!("# Get single field value");
    log_indented!("skycycle get temperature_unit");
    log_indented!("CELSIUS");
    log_pipe!();
    log_indented!("# Get all fields in JSON format");
    log_indented!("skycycle get --json all");
    log_indented!(
        "{{\"temperature_unit\":\"CELSIUS\",\"is_system_theme\":true,\"is_dark_theme\":false}}"
    );
    log_end!();
}
