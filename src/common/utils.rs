//! Small helpers shared by the CLI and the library.

use anyhow::{Context, Result};
use chrono::{NaiveTime, TimeDelta};
use std::path::Path;

/// Display a path with the home directory replaced by `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(relative) = path.strip_prefix(&home)
    {
        return format!("~/{}", relative.display());
    }
    path.display().to_string()
}

/// Parse a wall-clock time given as `HH:MM:SS` or `HH:MM`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .with_context(|| format!("Invalid time format: {trimmed} (use HH:MM or HH:MM:SS)"))
}

/// Format a duration as `"{h}h {m}m"`, dropping seconds.
///
/// Negative durations are shown as `0h 0m`.
pub fn format_hours_minutes(duration: TimeDelta) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_of_day_accepts_both_formats() {
        assert_eq!(
            parse_time_of_day("05:00").unwrap(),
            NaiveTime::from_hms_opt(5, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day(" 22:31:15 ").unwrap(),
            NaiveTime::from_hms_opt(22, 31, 15).unwrap()
        );
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("sunrise").is_err());
    }

    #[test]
    fn test_format_hours_minutes() {
        assert_eq!(format_hours_minutes(TimeDelta::minutes(16 * 60 + 27)), "16h 27m");
        assert_eq!(format_hours_minutes(TimeDelta::seconds(59)), "0h 0m");
        assert_eq!(format_hours_minutes(TimeDelta::minutes(-5)), "0h 0m");
    }
}
