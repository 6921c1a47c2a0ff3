//! Main application entry point and command dispatch.
//!
//! Parses the command line with `args`, then hands control to the matching handler in
//! `commands`. Handlers return errors instead of exiting; this module turns an error
//! into the block-formatted message and a non-zero exit code.
//!
//! Commands that print JSON run with logging disabled so stdout stays machine-readable.
//! The clock is created here and passed down, so nothing below reads the host time
//! directly.

use anyhow::Result;
use std::path::PathBuf;

use skycycle::args::{self, CliAction, ParsedArgs};
use skycycle::commands;
use skycycle::common::constants::EXIT_FAILURE;
use skycycle::logger::Log;
use skycycle::time_source::RealTimeSource;
use skycycle::{log_end, log_error_exit, log_indented};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    if let Err(e) = run(parsed_args.action) {
        if Log::is_enabled() {
            log_error_exit!("{e}");
            for cause in e.chain().skip(1) {
                log_indented!("{cause}");
            }
            log_end!();
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(EXIT_FAILURE);
    }
}

fn run(action: CliAction) -> Result<()> {
    let clock = RealTimeSource;

    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Help { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Sun {
            debug_enabled: _,
            config_dir,
            at,
            sunrise,
            sunset,
            json,
        } => {
            if json {
                Log::set_enabled(false);
            }
            let config_dir = config_dir.map(PathBuf::from);
            commands::sun::handle_sun_command(
                config_dir.as_deref(),
                at.as_deref(),
                sunrise.as_deref(),
                sunset.as_deref(),
                json,
                &clock,
            )
        }
        CliAction::Get {
            debug_enabled: _,
            config_dir,
            fields,
            json,
        } => {
            if json {
                Log::set_enabled(false);
            }
            let config_dir = config_dir.map(PathBuf::from);
            commands::get::handle_get_command(config_dir.as_deref(), &fields, json)
        }
        CliAction::Set {
            debug_enabled: _,
            config_dir,
            fields,
        } => {
            let config_dir = config_dir.map(PathBuf::from);
            commands::set::handle_set_command(config_dir.as_deref(), &fields)
        }
        CliAction::Watch {
            debug_enabled,
            config_dir,
        } => {
            let config_dir = config_dir.map(PathBuf::from);
            commands::watch::handle_watch_command(config_dir.as_deref(), debug_enabled, &clock)
        }
        CliAction::Simulate {
            debug_enabled,
            config_dir,
            start_time,
            end_time,
            multiplier,
            fast_forward,
            log_file,
        } => {
            let config_dir = config_dir.map(PathBuf::from);
            commands::simulate::handle_simulate_command(
                config_dir.as_deref(),
                &start_time,
                &end_time,
                multiplier,
                fast_forward,
                log_file,
                debug_enabled,
            )
        }
    }
}
