//! Configuration validation functionality.
//!
//! Rejects values the solar and heading pipelines cannot work with. Each error
//! names the offending field, the accepted range and the value found.

use anyhow::Result;
use chrono_tz::Tz;

use super::Config;
use crate::common::constants::*;

/// Validate every field that is present in `config`.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    if let Some(alt) = config.altitude
        && !(MINIMUM_ALTITUDE..=MAXIMUM_ALTITUDE).contains(&alt)
    {
        anyhow::bail!(
            "altitude must be between {} and {} meters (got {})",
            MINIMUM_ALTITUDE,
            MAXIMUM_ALTITUDE,
            alt
        );
    }

    if let Some(zone) = config.timezone.as_deref()
        && zone.parse::<Tz>().is_err()
    {
        anyhow::bail!(
            "timezone '{}' is not a known IANA timezone (e.g. \"America/Los_Angeles\")",
            zone
        );
    }

    if let Some(threshold) = config.overlap_threshold
        && !(0.0..=180.0).contains(&threshold)
    {
        anyhow::bail!(
            "overlap_threshold must be between 0 and 180 degrees (got {})",
            threshold
        );
    }

    if let Some(interval) = config.refresh_interval
        && !(MINIMUM_REFRESH_INTERVAL..=MAXIMUM_REFRESH_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "refresh_interval ({} s) must be between {} and {} seconds",
            interval,
            MINIMUM_REFRESH_INTERVAL,
            MAXIMUM_REFRESH_INTERVAL
        );
    }

    if let Some(alpha) = config.heading_alpha
        && !(alpha > 0.0 && alpha <= 1.0)
    {
        anyhow::bail!(
            "heading_alpha must be greater than 0 and at most 1 (got {})",
            alpha
        );
    }

    if let Some(quantum) = config.heading_quantum
        && !(quantum > 0.0 && quantum <= MAXIMUM_HEADING_QUANTUM)
    {
        anyhow::bail!(
            "heading_quantum must be greater than 0 and at most {} degrees (got {})",
            MAXIMUM_HEADING_QUANTUM,
            quantum
        );
    }

    if let Some(duration) = config.animation_duration {
        validate_animation_duration(duration)?;
    }

    Ok(())
}

fn validate_animation_duration(duration: f64) -> Result<()> {
    if !(0.0..=MAXIMUM_ANIMATION_DURATION).contains(&duration) {
        anyhow::bail!(
            "animation_duration ({} s) must be between 0 and {} seconds",
            duration,
            MAXIMUM_ANIMATION_DURATION
        );
    }

    if duration > 0.0 && duration < 0.05 {
        log_warning!(
            "animation_duration of {} s is shorter than a frame; use 0 for instant rotations",
            duration
        );
    }

    Ok(())
}
