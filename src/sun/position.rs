//! Day/night progress calculator.
//!
//! Maps `(now, sunrise, sunset)` to whether it is currently day and how far the
//! current phase has progressed, as a value in `[0, 1]`. Night is measured
//! continuously from sunset through midnight to the next sunrise, so the moon keeps
//! moving across the arc after midnight instead of restarting.
//!
//! Windows whose daylight or night length is not positive (sunrise equal to or later
//! than sunset) cannot be divided through. They resolve to an artificial day with the
//! indicator at its zenith, `progress == 0.5`.

use chrono::{NaiveTime, TimeDelta};
use serde::Serialize;

use super::window::SunWindow;
use crate::common::constants::DEGENERATE_PROGRESS;

/// Where "now" sits in the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunPosition {
    pub is_day: bool,
    /// Elapsed fraction of the current phase, in `[0, 1]`.
    pub progress: f32,
}

impl SunPosition {
    fn degenerate() -> Self {
        Self {
            is_day: true,
            progress: DEGENERATE_PROGRESS,
        }
    }
}

/// Compute the phase and its progress for `now`.
///
/// Both window endpoints count as day: progress is exactly 0 at sunrise and 1 at
/// sunset.
pub fn calculate_sun_position(now: NaiveTime, window: &SunWindow) -> SunPosition {
    if window.is_degenerate() {
        return SunPosition::degenerate();
    }

    let SunWindow { sunrise, sunset } = *window;
    let is_day = sunrise <= now && now <= sunset;

    let progress = if is_day {
        ratio(
            now.signed_duration_since(sunrise),
            window.daylight_duration(),
        )
    } else {
        let elapsed_night = if now > sunset {
            now.signed_duration_since(sunset)
        } else {
            // Past midnight: the rest of yesterday's evening plus today's early hours
            until_midnight(sunset) + now.signed_duration_since(NaiveTime::MIN)
        };
        ratio(elapsed_night, window.night_duration())
    };

    SunPosition { is_day, progress }
}

fn until_midnight(time: NaiveTime) -> TimeDelta {
    TimeDelta::days(1) - time.signed_duration_since(NaiveTime::MIN)
}

fn ratio(elapsed: TimeDelta, total: TimeDelta) -> f32 {
    let total_ms = total.num_milliseconds();
    if total_ms <= 0 {
        return DEGENERATE_PROGRESS;
    }
    (elapsed.num_milliseconds() as f64 / total_ms as f64).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(value: &str) -> NaiveTime {
        crate::common::utils::parse_time_of_day(value).unwrap()
    }

    fn w(sunrise: &str, sunset: &str) -> SunWindow {
        SunWindow::new(t(sunrise), t(sunset))
    }

    #[test]
    fn test_late_evening_before_sunset_is_day() {
        let position = calculate_sun_position(t("22:15"), &w("05:00", "22:31"));
        assert!(position.is_day);
        assert!((position.progress - 1035.0 / 1051.0).abs() < 1e-4);
    }

    #[test]
    fn test_after_midnight_wraps_night() {
        let position = calculate_sun_position(t("02:00"), &w("04:20", "20:47"));
        assert!(!position.is_day);
        // 5h13m of 7h33m of night
        assert!((position.progress - 313.0 / 453.0).abs() < 1e-4);
    }

    #[test]
    fn test_endpoints_are_inclusive_day() {
        let window = w("06:00", "18:00");
        assert_eq!(
            calculate_sun_position(t("06:00"), &window),
            SunPosition {
                is_day: true,
                progress: 0.0
            }
        );
        assert_eq!(
            calculate_sun_position(t("18:00"), &window),
            SunPosition {
                is_day: true,
                progress: 1.0
            }
        );
    }

    #[test]
    fn test_night_progress_just_after_sunset_and_before_sunrise() {
        let window = w("06:00", "18:00");
        let evening = calculate_sun_position(t("18:00:01"), &window);
        assert!(!evening.is_day);
        assert!(evening.progress < 0.001);

        let dawn = calculate_sun_position(t("05:59:59"), &window);
        assert!(!dawn.is_day);
        assert!(dawn.progress > 0.999);
    }

    #[test]
    fn test_midnight_is_halfway_through_a_symmetric_night() {
        let position = calculate_sun_position(t("00:00"), &w("06:00", "18:00"));
        assert!(!position.is_day);
        assert!((position.progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_windows_report_zenith() {
        for window in [w("12:00", "12:00"), w("20:00", "06:00")] {
            for now in ["00:00", "12:00", "19:00", "23:59:59"] {
                assert_eq!(
                    calculate_sun_position(t(now), &window),
                    SunPosition {
                        is_day: true,
                        progress: 0.5
                    }
                );
            }
        }
    }

    #[test]
    fn test_almost_full_day_window_still_has_a_night() {
        let window = w("00:00", "23:59:59");
        let now = NaiveTime::from_hms_milli_opt(23, 59, 59, 500).unwrap();
        let position = calculate_sun_position(now, &window);
        assert!(!position.is_day);
        assert!((0.0..=1.0).contains(&position.progress));
    }
}
