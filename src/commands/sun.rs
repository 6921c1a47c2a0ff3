//! Sun command: where the sun (or moon) is on the arc right now.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::Serialize;
use std::path::Path;

use crate::common::constants::*;
use crate::common::utils::parse_time_of_day;
use crate::config::Config;
use crate::sun::{ArcPoint, SunPosition, SunWindow, arc_angle, arc_point, calculate_sun_position};
use crate::time_source::TimeSource;

/// Everything a view needs to draw the arc for one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunReport {
    #[serde(serialize_with = "serialize_time")]
    pub time: NaiveTime,
    #[serde(serialize_with = "serialize_time")]
    pub sunrise: NaiveTime,
    #[serde(serialize_with = "serialize_time")]
    pub sunset: NaiveTime,
    pub daylight: String,
    #[serde(flatten)]
    pub position: SunPosition,
    pub angle: f32,
    pub point: ArcPoint,
}

fn serialize_time<S: serde::Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%H:%M:%S"))
}

impl SunReport {
    /// Compute the report for `time` within `window`.
    ///
    /// The arc's center sits at `(radius, radius)`, so every point falls inside a
    /// `2r × r` box anchored at the origin.
    pub fn new(time: NaiveTime, window: &SunWindow, radius: f64) -> Self {
        let position = calculate_sun_position(time, window);
        Self {
            time,
            sunrise: window.sunrise,
            sunset: window.sunset,
            daylight: window.daylight_label(),
            position,
            angle: arc_angle(&position),
            point: arc_point(
                &position,
                ArcPoint {
                    x: radius,
                    y: radius,
                },
                radius,
            ),
        }
    }

    pub fn phase(&self) -> &'static str {
        if self.position.is_day { "Day" } else { "Night" }
    }

    /// Log the report as a block.
    pub fn log(&self) {
        log_block_start!(
            "{} at {}: {:.1}% complete",
            self.phase(),
            self.time.format("%H:%M:%S"),
            self.position.progress * 100.0
        );
        log_indented!(
            "Sunrise {} · Sunset {} · Daylight {}",
            self.sunrise.format("%H:%M:%S"),
            self.sunset.format("%H:%M:%S"),
            self.daylight
        );
        log_indented!(
            "Arc angle {:.1}° at ({:.1}, {:.1})",
            self.angle,
            self.point.x,
            self.point.y
        );
    }
}

/// Handle the sun command.
///
/// # Arguments
/// * `config_dir` - Custom configuration directory, if any
/// * `at` - Time of day to evaluate instead of the clock's current time
/// * `sunrise`, `sunset` - Override the configured window
/// * `json` - Print a single JSON object instead of the log block
/// * `time_source` - Clock supplying the date and, without `at`, the time
pub fn handle_sun_command(
    config_dir: Option<&Path>,
    at: Option<&str>,
    sunrise: Option<&str>,
    sunset: Option<&str>,
    json: bool,
    time_source: &dyn TimeSource,
) -> Result<()> {
    let config = Config::load(config_dir)?;
    let now = time_source.now();

    let time = match at {
        Some(value) => parse_time_of_day(value).context("Invalid --at time")?,
        None => now.time(),
    };

    let window = if sunrise.is_some() || sunset.is_some() {
        SunWindow::parse(
            sunrise.or(config.sunrise.as_deref()).unwrap_or(DEFAULT_SUNRISE),
            sunset.or(config.sunset.as_deref()).unwrap_or(DEFAULT_SUNSET),
        )?
    } else {
        config.sun_window(now.date_naive())?
    };

    let report = SunReport::new(time, &window, config.arc_radius());

    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    log_version!();
    report.log();
    if window.is_degenerate() {
        log_pipe!();
        log_warning!("Sunrise and sunset leave no day or no night; showing the top of the arc");
    }
    log_end!();

    Ok(())
}

/// Display detailed help for the sun command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("sun - Show the position of the sun on the day/night arc");
    log_block_start!("Usage: skycycle sun [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("--at <HH:MM[:SS]>       Evaluate a time of day instead of now");
    log_indented!("--sunrise <HH:MM[:SS]>  Override the configured sunrise");
    log_indented!("--sunset <HH:MM[:SS]>   Override the configured sunset");
    log_indented!("-j, --json              Output in JSON format");
    log_block_start!("Examples:");
    log_indented!("# Where is the sun now?");
    log_indented!("skycycle");
    log_pipe!();
    log_indented!("# Late evening in a long summer day");
    log_indented!("skycycle sun --sunrise 05:00 --sunset 22:31 --at 22:15");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_report_places_indicator_inside_the_box() {
        let window = SunWindow::new(hms(6, 0, 0), hms(18, 0, 0));
        let noon = SunReport::new(hms(12, 0, 0), &window, 100.0);
        assert!(noon.position.is_day);
        assert_eq!(noon.angle, 270.0);
        assert!((noon.point.x - 100.0).abs() < 1e-6);
        assert!(noon.point.y.abs() < 1e-6);
        assert_eq!(noon.daylight, "12h 0m");
    }

    #[test]
    fn test_report_serializes_flat() {
        let window = SunWindow::new(hms(5, 0, 0), hms(22, 31, 0));
        let report = SunReport::new(hms(22, 15, 0), &window, 50.0);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["time"], "22:15:00");
        assert_eq!(value["sunrise"], "05:00:00");
        assert_eq!(value["daylight"], "17h 31m");
        assert_eq!(value["is_day"], true);
        let progress = value["progress"].as_f64().unwrap();
        assert!((progress - 0.9848).abs() < 1e-3);
        assert!(value["point"]["x"].is_number());
    }

    #[test]
    fn test_command_runs_against_a_fixed_clock() {
        use crate::time_source::{ManualTimeSource, parse_datetime};

        let dir = tempfile::tempdir().unwrap();
        let clock = ManualTimeSource::fixed(parse_datetime("2024-06-21 22:15:00").unwrap());
        handle_sun_command(Some(dir.path()), None, Some("05:00"), Some("22:31"), true, &clock)
            .unwrap();
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());

        let err = handle_sun_command(Some(dir.path()), Some("25:00"), None, None, true, &clock)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid --at time"));
    }

    #[test]
    fn test_phase_names() {
        let window = SunWindow::new(hms(6, 0, 0), hms(18, 0, 0));
        assert_eq!(SunReport::new(hms(3, 0, 0), &window, 1.0).phase(), "Night");
        assert_eq!(SunReport::new(hms(6, 0, 0), &window, 1.0).phase(), "Day");
    }
}
