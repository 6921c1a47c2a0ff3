//! Sunrise/sunset window for a single day.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::common::constants::SECONDS_PER_DAY;
use crate::common::utils::{format_hours_minutes, parse_time_of_day};

/// Wall-clock sunrise and sunset, local time, no date component.
///
/// No ordering is enforced between the two. A window whose sunset is not after its
/// sunrise is *degenerate* and is handled explicitly by the position calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunWindow {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
}

impl SunWindow {
    pub fn new(sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        Self { sunrise, sunset }
    }

    /// Parse a window from `HH:MM[:SS]` strings.
    pub fn parse(sunrise: &str, sunset: &str) -> Result<Self> {
        Ok(Self::new(
            parse_time_of_day(sunrise).context("Invalid sunrise time")?,
            parse_time_of_day(sunset).context("Invalid sunset time")?,
        ))
    }

    /// Compute the window for `date` at the given coordinates.
    ///
    /// Solar events are calculated in UTC and converted to local wall-clock time,
    /// truncated to whole seconds.
    pub fn for_location(latitude: f64, longitude: f64, date: NaiveDate) -> Result<Self> {
        use sunrise::{Coordinates, SolarDay, SolarEvent};

        let coordinates = Coordinates::new(latitude, longitude)
            .with_context(|| format!("Invalid coordinates: {latitude:.4}°, {longitude:.4}°"))?;
        let solar_day = SolarDay::new(coordinates, date);

        let to_local = |event: SolarEvent| {
            let time = solar_day.event_time(event).with_timezone(&Local).time();
            time.with_nanosecond(0).unwrap_or(time)
        };

        Ok(Self::new(
            to_local(SolarEvent::Sunrise),
            to_local(SolarEvent::Sunset),
        ))
    }

    /// Sunset minus sunrise. Zero or negative for degenerate windows.
    pub fn daylight_duration(&self) -> TimeDelta {
        self.sunset.signed_duration_since(self.sunrise)
    }

    /// The rest of the 24 hours once daylight is removed.
    pub fn night_duration(&self) -> TimeDelta {
        TimeDelta::seconds(SECONDS_PER_DAY) - self.daylight_duration()
    }

    /// True when either phase has no positive length.
    pub fn is_degenerate(&self) -> bool {
        self.daylight_duration() <= TimeDelta::zero() || self.night_duration() <= TimeDelta::zero()
    }

    /// Daylight length as shown under the arc, e.g. `16h 27m`.
    pub fn daylight_label(&self) -> String {
        format_hours_minutes(self.daylight_duration())
    }
}
