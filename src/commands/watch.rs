//! Watch command: follow the sun and the user's settings until interrupted.
//!
//! The loop wakes up on three things: the refresh interval elapsing, a settings change
//! published by the store (including changes written by another process), and a
//! termination signal.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{RecvTimeoutError, Sender, channel};
use std::thread;
use std::time::Duration;

use super::sun::SunReport;
use crate::config::Config;
use crate::settings::{SettingsWatcher, UserSettings};
use crate::time_source::TimeSource;

/// Messages that interrupt the refresh wait.
#[derive(Debug)]
enum WatchEvent {
    SettingsChanged(UserSettings),
    Shutdown(i32),
}

/// Handle the watch command.
pub fn handle_watch_command(
    config_dir: Option<&Path>,
    debug_enabled: bool,
    time_source: &dyn TimeSource,
) -> Result<()> {
    log_version!();

    let config = Config::load(config_dir)?;
    if debug_enabled {
        config.log_config();
    }

    let store = Arc::new(super::open_settings_store(config_dir)?);
    let _watch_guard = SettingsWatcher::new(Arc::clone(&store), debug_enabled).start()?;

    let (tx, rx) = channel();
    spawn_signal_thread(tx.clone(), debug_enabled)?;

    let subscription = store.subscribe();
    if let Some(initial) = subscription.recv() {
        log_block_start!("Current settings");
        log_settings(&initial);
    }
    thread::spawn(move || {
        while let Some(settings) = subscription.recv() {
            if tx.send(WatchEvent::SettingsChanged(settings)).is_err() {
                break;
            }
        }
    });

    let interval = Duration::from_secs(config.update_interval());
    let mut last_is_day: Option<bool> = None;

    loop {
        let now = time_source.now();
        let window = config.sun_window(now.date_naive())?;
        let report = SunReport::new(now.time(), &window, config.arc_radius());

        if let Some(was_day) = last_is_day
            && was_day != report.position.is_day
        {
            log_block_start!("{} has begun", report.phase());
        }
        last_is_day = Some(report.position.is_day);
        report.log();

        match rx.recv_timeout(interval) {
            Ok(WatchEvent::SettingsChanged(settings)) => {
                log_block_start!("Settings changed");
                log_settings(&settings);
            }
            Ok(WatchEvent::Shutdown(signal)) => {
                log_block_start!("Received {}, shutting down", signal_name(signal));
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log_end!();
    Ok(())
}

fn spawn_signal_thread(tx: Sender<WatchEvent>, debug_enabled: bool) -> Result<()> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            if debug_enabled {
                log_pipe!();
                log_debug!("Signal {signal} received");
            }
            let _ = tx.send(WatchEvent::Shutdown(signal));
        }
    });

    Ok(())
}

fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGINT => "SIGINT (Ctrl+C)",
        SIGTERM => "SIGTERM (termination request)",
        SIGHUP => "SIGHUP (terminal closed)",
        _ => "signal",
    }
}

fn log_settings(settings: &UserSettings) {
    log_indented!(
        "Temperature unit: {} ({})",
        settings.temperature_unit,
        settings.temperature_unit.symbol()
    );
    let theme = if settings.is_system_theme {
        "follow system"
    } else if settings.is_dark_theme {
        "dark"
    } else {
        "light"
    };
    log_indented!("Theme: {theme}");
}

/// Display detailed help for the watch command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("watch - Follow the sun and settings changes");
    log_block_start!("Usage: skycycle watch");
    log_block_start!("Behavior:");
    log_indented!("Prints the sun position every update_interval seconds");
    log_indented!("Announces sunrise and sunset as they happen");
    log_indented!("Reports settings changes made with 'skycycle set' or by hand");
    log_indented!("Stops on Ctrl+C, SIGTERM or SIGHUP");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        assert_eq!(signal_name(SIGINT), "SIGINT (Ctrl+C)");
        assert_eq!(signal_name(SIGTERM), "SIGTERM (termination request)");
        assert_eq!(signal_name(0), "signal");
    }
}
