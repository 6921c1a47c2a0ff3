//! Configuration validation functionality.
//!
//! Rejects values that cannot produce a meaningful sun window or refresh loop.

use anyhow::{Context, Result};

use super::Config;
use crate::common::constants::*;
use crate::common::utils::parse_time_of_day;

/// Validate every configured field, before defaults are applied.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(sunrise) = config.sunrise.as_deref() {
        parse_time_of_day(sunrise).context("Invalid sunrise time format")?;
    }
    if let Some(sunset) = config.sunset.as_deref() {
        parse_time_of_day(sunset).context("Invalid sunset time format")?;
    }

    if let Some(lat) = config.latitude
        && !(MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&lat)
    {
        anyhow::bail!(
            "latitude must be between {} and {} degrees (got {})",
            MINIMUM_LATITUDE,
            MAXIMUM_LATITUDE,
            lat
        );
    }

    if let Some(lon) = config.longitude
        && !(MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between {} and {} degrees (got {})",
            MINIMUM_LONGITUDE,
            MAXIMUM_LONGITUDE,
            lon
        );
    }

    if config.latitude.is_some() != config.longitude.is_some() {
        anyhow::bail!("latitude and longitude must be configured together");
    }

    if let Some(interval) = config.update_interval
        && !(MINIMUM_UPDATE_INTERVAL..=MAXIMUM_UPDATE_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "update_interval ({} seconds) must be between {} and {} seconds",
            interval,
            MINIMUM_UPDATE_INTERVAL,
            MAXIMUM_UPDATE_INTERVAL
        );
    }

    if let Some(radius) = config.arc_radius
        && !(radius.is_finite() && radius > 0.0)
    {
        anyhow::bail!("arc_radius must be a positive number (got {})", radius);
    }

    // Accepted, but the sun is pinned to the top of the arc
    if let (Some(sunrise), Some(sunset)) = (config.sunrise.as_deref(), config.sunset.as_deref())
        && parse_time_of_day(sunset)? <= parse_time_of_day(sunrise)?
    {
        log_pipe!();
        log_warning!("sunset ({sunset}) is not after sunrise ({sunrise}); the sun will not move");
    }

    Ok(())
}
