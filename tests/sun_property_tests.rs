use chrono::{NaiveTime, TimeDelta};
use proptest::prelude::*;
use skycycle::sun::{SunWindow, arc_angle, calculate_sun_position};

const DAY_SECS: u32 = 86_400;

fn time(secs: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Non-degenerate windows: sunrise strictly before sunset, at least two seconds of night.
fn window_strategy() -> impl Strategy<Value = SunWindow> {
    (0..DAY_SECS - 3).prop_flat_map(|sunrise| {
        (sunrise + 1..DAY_SECS - 2)
            .prop_map(move |sunset| SunWindow::new(time(sunrise), time(sunset)))
    })
}

fn any_time() -> impl Strategy<Value = NaiveTime> {
    (0..DAY_SECS).prop_map(time)
}

/// Property tests for the progress calculator
#[cfg(test)]
mod progress_properties {
    use super::*;

    proptest! {
        #[test]
        fn progress_stays_in_unit_interval(
            sunrise in any_time(),
            sunset in any_time(),
            now in any_time(),
        ) {
            let position = calculate_sun_position(now, &SunWindow::new(sunrise, sunset));
            prop_assert!((0.0..=1.0).contains(&position.progress));
            let angle = arc_angle(&position);
            prop_assert!((180.0..=360.0).contains(&angle));
        }

        #[test]
        fn day_is_exactly_the_closed_window(window in window_strategy(), now in any_time()) {
            let position = calculate_sun_position(now, &window);
            prop_assert_eq!(position.is_day, window.sunrise <= now && now <= window.sunset);
        }

        #[test]
        fn day_progress_is_monotonic(
            window in window_strategy(),
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            let daylight = window.daylight_duration().num_seconds() as f64;
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let first = window.sunrise + TimeDelta::seconds((early * daylight) as i64);
            let second = window.sunrise + TimeDelta::seconds((late * daylight) as i64);

            let p1 = calculate_sun_position(first, &window);
            let p2 = calculate_sun_position(second, &window);
            prop_assert!(p1.is_day && p2.is_day);
            prop_assert!(p1.progress <= p2.progress);
        }

        #[test]
        fn night_progress_is_monotonic_across_midnight(
            window in window_strategy(),
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            // Offsets strictly inside the night, measured from sunset
            let night = window.night_duration().num_seconds();
            let span = (night - 2) as f64;
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let first = window.sunset + TimeDelta::seconds(1 + (early * span) as i64);
            let second = window.sunset + TimeDelta::seconds(1 + (late * span) as i64);

            let p1 = calculate_sun_position(first, &window);
            let p2 = calculate_sun_position(second, &window);
            prop_assert!(!p1.is_day && !p2.is_day);
            prop_assert!(p1.progress <= p2.progress);
        }

        #[test]
        fn endpoints_pin_day_progress(window in window_strategy()) {
            let at_sunrise = calculate_sun_position(window.sunrise, &window);
            let at_sunset = calculate_sun_position(window.sunset, &window);
            prop_assert!(at_sunrise.is_day && at_sunset.is_day);
            prop_assert_eq!(at_sunrise.progress, 0.0);
            prop_assert_eq!(at_sunset.progress, 1.0);
        }

        #[test]
        fn degenerate_windows_sit_at_the_zenith(
            sunset in 0..DAY_SECS,
            gap in 0..DAY_SECS,
            now in any_time(),
        ) {
            // Sunrise at or after sunset
            let sunrise = (sunset + gap).min(DAY_SECS - 1);
            let window = SunWindow::new(time(sunrise), time(sunset));
            let position = calculate_sun_position(now, &window);
            prop_assert!(position.is_day);
            prop_assert_eq!(position.progress, 0.5);
        }
    }
}

#[test]
fn late_evening_in_a_long_summer_day() {
    let window = SunWindow::new(hm(5, 0), hm(22, 31));
    let position = calculate_sun_position(hm(22, 15), &window);
    assert!(position.is_day);
    assert!((position.progress - 1035.0 / 1051.0).abs() < 1e-4);
}

#[test]
fn two_in_the_morning_after_a_summer_evening() {
    let window = SunWindow::new(hm(4, 20), hm(20, 47));
    let position = calculate_sun_position(hm(2, 0), &window);
    assert!(!position.is_day);
    // 5h13m since sunset out of a 7h33m night
    assert!((position.progress - 313.0 / 453.0).abs() < 1e-4);
}

#[test]
fn midnight_is_halfway_through_a_symmetric_night() {
    let window = SunWindow::new(hm(6, 0), hm(18, 0));
    let position = calculate_sun_position(hm(0, 0), &window);
    assert!(!position.is_day);
    assert!((position.progress - 0.5).abs() < 1e-6);
}
