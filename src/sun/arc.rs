//! Placement of the sun or moon on the day/night arc.
//!
//! The arc is the upper half of a circle whose center sits on the horizon. Angles are
//! in degrees using screen conventions (0° points right, angles grow clockwise, y grows
//! downward), so the visible half spans 180° (left horizon) to 360° (right horizon).
//! The sun travels left to right during the day; the moon travels back right to left
//! during the night.

use serde::Serialize;

use super::position::SunPosition;

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcPoint {
    pub x: f64,
    pub y: f64,
}

/// Angle of the indicator on the arc, in degrees within `[180, 360]`.
pub fn arc_angle(position: &SunPosition) -> f32 {
    if position.is_day {
        180.0 + 180.0 * position.progress
    } else {
        360.0 - 180.0 * position.progress
    }
}

/// Indicator position for an arc of `radius` around `center`.
pub fn arc_point(position: &SunPosition, center: ArcPoint, radius: f64) -> ArcPoint {
    let angle = f64::from(arc_angle(position)).to_radians();
    ArcPoint {
        x: center.x + angle.cos() * radius,
        y: center.y + angle.sin() * radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: ArcPoint = ArcPoint { x: 0.0, y: 0.0 };

    fn assert_close(actual: ArcPoint, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-6 && (actual.y - y).abs() < 1e-6,
            "expected ({x}, {y}), got {actual:?}"
        );
    }

    #[test]
    fn test_sun_rises_left_and_sets_right() {
        let sunrise = SunPosition {
            is_day: true,
            progress: 0.0,
        };
        let noon = SunPosition {
            is_day: true,
            progress: 0.5,
        };
        let sunset = SunPosition {
            is_day: true,
            progress: 1.0,
        };
        assert_eq!(arc_angle(&sunrise), 180.0);
        assert_close(arc_point(&sunrise, ORIGIN, 10.0), -10.0, 0.0);
        assert_close(arc_point(&noon, ORIGIN, 10.0), 0.0, -10.0);
        assert_close(arc_point(&sunset, ORIGIN, 10.0), 10.0, 0.0);
    }

    #[test]
    fn test_moon_travels_back_from_the_right() {
        let dusk = SunPosition {
            is_day: false,
            progress: 0.0,
        };
        let dawn = SunPosition {
            is_day: false,
            progress: 1.0,
        };
        assert_eq!(arc_angle(&dusk), 360.0);
        assert_close(arc_point(&dusk, ArcPoint { x: 50.0, y: 100.0 }, 50.0), 100.0, 100.0);
        assert_close(arc_point(&dawn, ArcPoint { x: 50.0, y: 100.0 }, 50.0), 0.0, 100.0);
    }
}
