//! Compass command: one event per type on the azimuth circle, plus the sun.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;

use super::format_instant;
use crate::args::GlobalOptions;
use crate::ephemeris::{Ephemeris, SpaEphemeris};
use crate::error::SolarError;
use crate::geo::{Place, PlaceTime};
use crate::solar::{CompassView, SunMotion, build_compass_view, compute_series};
use crate::time_source::{Clock, clock_for};

/// Compute the compass view for `place` at the clock's current instant.
pub fn query_compass(
    ephemeris: &dyn Ephemeris,
    place: Place,
    clock: &dyn Clock,
    overlap_threshold: f64,
) -> Result<CompassView, SolarError> {
    let now = clock.now();
    let series = compute_series(ephemeris, &PlaceTime::new(place, now))?;
    build_compass_view(ephemeris, &place, &series, now, overlap_threshold)
}

/// Handle the compass command.
pub fn handle_compass_command(
    options: &GlobalOptions,
    at: Option<DateTime<Utc>>,
    json: bool,
) -> Result<()> {
    let (config, _) = if json {
        super::load_config(options)?
    } else {
        log_version!();
        super::load_and_log_config(options)?
    };

    let place = config.place();
    let clock = clock_for(at);
    let view = query_compass(
        &SpaEphemeris::new(),
        place,
        clock.as_ref(),
        config.overlap_threshold(),
    )?;

    if json {
        let output = json!({
            "place": place,
            "now": clock.now(),
            "sun_azimuth": view.sun_azimuth,
            "sun_motion": view.sun_motion,
            "events": view.events,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize compass view")?
        );
        return Ok(());
    }

    print_compass(&view, config.timezone());
    log_end!();
    Ok(())
}

/// Log the compass view as a block.
pub fn print_compass(view: &CompassView, zone: Option<Tz>) {
    let motion = match view.sun_motion {
        SunMotion::Clockwise => "clockwise",
        SunMotion::Counterclockwise => "counterclockwise",
    };
    log_block_start!(
        "Sun at {:.1}° ({}), moving {}",
        view.sun_azimuth,
        cardinal(view.sun_azimuth),
        motion
    );

    for compass_event in &view.events {
        let event = &compass_event.event;
        log_indented!(
            "{}{:<12} {:>5.1}° {:<3} {}{}",
            event.event_type.symbol(),
            event.event_type.display_name(),
            event.azimuth,
            cardinal(event.azimuth),
            format_instant(event.instant, zone),
            if compass_event.inset { "  (inset)" } else { "" }
        );
    }
}

/// Sixteen-point compass label for an azimuth.
pub fn cardinal(azimuth: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let index = (crate::geo::normalize_degrees(azimuth) / 22.5).round() as usize % 16;
    POINTS[index]
}

pub fn display_help() {
    log_version!();
    log_block_start!("compass - Show solar events placed on the compass");
    log_block_start!("Usage: suncompass compass [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-a, --at <instant>  Evaluate at an instant instead of now");
    log_indented!("-j, --json          Output in JSON format");
    log_block_start!("Output:");
    log_indented!("The next sunrise, solar noon, sunset and solar nadir with their");
    log_indented!("azimuths, and the current sun azimuth and direction of motion.");
    log_indented!("When noon and nadir point almost the same way (see overlap_threshold),");
    log_indented!("the later of the two is marked as inset.");
    log_end!();
}
