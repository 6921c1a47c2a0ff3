//! Help command implementation for skycycle.
//!
//! Dispatches to command-specific help, or shows the general command list.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("sun") => super::sun::display_help(),
        Some("get") | Some("g") => super::get::display_help(),
        Some("set") | Some("s") => super::set::display_help(),
        Some("watch") | Some("w") => super::watch::display_help(),
        Some("simulate") | Some("S") => super::simulate::display_help(),
        Some("help") | Some("h") => display_help_help(),
        Some(unknown) => {
            log_warning!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("sun                     Show where the sun is now (default)");
    log_indented!("get, g <field>          Read settings field(s)");
    log_indented!("set, s <field>=<value>  Update settings field(s)");
    log_indented!("watch, w                Follow the sun and settings changes");
    log_indented!("simulate, S <start> <end> [multiplier]");
    log_indented!("                        Replay a time range with a simulated clock");
    log_indented!("help, h [COMMAND]       Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'skycycle help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'skycycle --help' to see all options and general usage.");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: skycycle help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_end!();
}
