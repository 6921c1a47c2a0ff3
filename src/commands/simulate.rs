//! Implementation of the simulate command.
//!
//! Replays a time range with an accelerated clock, logging the sun's progress at every
//! refresh step and the moments where day turns into night and back. Every log line is
//! stamped with the simulated time.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::sun::SunReport;
use crate::common::constants::DEFAULT_SIMULATION_MULTIPLIER;
use crate::config::Config;
use crate::logger::Log;
use crate::time_source::{self, SimulatedTimeSource, TimeSource};

/// Handle the simulate command.
///
/// # Arguments
/// * `start_time` - Start time in format "YYYY-MM-DD HH:MM:SS"
/// * `end_time` - End time in format "YYYY-MM-DD HH:MM:SS"
/// * `multiplier` - Time acceleration factor, default one simulated hour per second
/// * `fast_forward` - Jump between steps without waiting
/// * `log_file` - Write output to this file instead of stdout
pub fn handle_simulate_command(
    config_dir: Option<&Path>,
    start_time: &str,
    end_time: &str,
    multiplier: Option<f64>,
    fast_forward: bool,
    log_file: Option<String>,
    debug_enabled: bool,
) -> Result<()> {
    let start = time_source::parse_datetime(start_time)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {}", e))?;
    let end = time_source::parse_datetime(end_time)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {}", e))?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    let config = Config::load(config_dir)?;

    let time_source_multiplier = if fast_forward {
        0.0
    } else {
        multiplier.unwrap_or(DEFAULT_SIMULATION_MULTIPLIER)
    };
    let source = Arc::new(SimulatedTimeSource::new(start, end, time_source_multiplier));

    // Before any logging, so every line carries the simulated time
    Log::set_time_source(source.clone());
    let _log_guard = log_file.map(Log::start_file_logging).transpose()?;

    log_version!();
    log_block_start!("Simulation Mode");

    let duration = end.signed_duration_since(start);
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );

    if source.is_fast_forward() {
        log_indented!("Time acceleration: fast-forward (instant execution)");
    } else {
        let real_duration_secs = duration.num_seconds() as f64 / source.multiplier();
        log_indented!(
            "Time acceleration: {}x (will complete in ~{:.1} seconds)",
            source.multiplier() as u64,
            real_duration_secs
        );
    }

    if debug_enabled {
        config.log_config();
    }

    let steps = run_simulation(&config, source.as_ref())?;

    log_block_start!("Simulation complete after {steps} steps");
    log_end!();

    Ok(())
}

/// Step through the simulated range, returning the number of reports logged.
pub(crate) fn run_simulation(config: &Config, source: &dyn TimeSource) -> Result<usize> {
    let step = Duration::from_secs(config.update_interval());
    let mut last_is_day: Option<bool> = None;
    let mut steps = 0;

    loop {
        let now = source.now();
        let window = config.sun_window(now.date_naive())?;
        let report = SunReport::new(now.time(), &window, config.arc_radius());

        if let Some(was_day) = last_is_day
            && was_day != report.position.is_day
        {
            log_block_start!(
                "{} at {}",
                if report.position.is_day { "Sunrise" } else { "Sunset" },
                now.format("%Y-%m-%d %H:%M:%S")
            );
        }
        last_is_day = Some(report.position.is_day);
        report.log();
        steps += 1;

        if source.is_ended() {
            break;
        }
        source.sleep(step);
    }

    Ok(steps)
}

/// Display detailed help for the simulate command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Replay a time range with a simulated clock");
    log_block_start!("Usage: skycycle simulate <start> <end> [multiplier] [OPTIONS]");
    log_block_start!("Arguments:");
    log_indented!("<start>, <end>      \"YYYY-MM-DD HH:MM:SS\", local time");
    log_indented!("[multiplier]        Simulated seconds per real second (default 3600)");
    log_block_start!("Options:");
    log_indented!("-f, --fast-forward  Jump between steps without waiting");
    log_indented!("--log <file>        Write the output to a file");
    log_block_start!("Examples:");
    log_indented!("skycycle simulate \"2024-06-21 00:00:00\" \"2024-06-22 00:00:00\" --fast-forward");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::parse_datetime;

    #[test]
    fn test_fast_forward_visits_every_step_once() {
        let start = parse_datetime("2024-06-21 00:00:00").unwrap();
        let end = parse_datetime("2024-06-21 01:00:00").unwrap();
        let source = SimulatedTimeSource::new(start, end, 0.0);
        let config = Config {
            update_interval: Some(600),
            ..Config::default()
        };

        // 00:00, 00:10, ... 01:00
        assert_eq!(run_simulation(&config, &source).unwrap(), 7);
        assert!(source.is_ended());
    }
}
