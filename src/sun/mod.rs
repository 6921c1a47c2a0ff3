//! Sun-cycle calculations for the day/night arc.
//!
//! - [`window`]: the sunrise/sunset pair for a day, either configured manually or
//!   computed from coordinates.
//! - [`position`]: where "now" falls within the current day or night phase.
//! - [`arc`]: where that phase places the sun or moon on a drawn semicircle.
//!
//! All functions here are pure and may be called from any thread.

pub mod arc;
pub mod position;
pub mod window;

pub use arc::{ArcPoint, arc_angle, arc_point};
pub use position::{SunPosition, calculate_sun_position};
pub use window::SunWindow;
