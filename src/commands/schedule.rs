//! Schedule command: the five events around "now" with the closest one emphasized.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;

use super::format_instant;
use crate::args::GlobalOptions;
use crate::ephemeris::{Ephemeris, SpaEphemeris};
use crate::error::SolarError;
use crate::geo::{Place, PlaceTime};
use crate::solar::{Schedule, build_schedule, compute_series};
use crate::time_source::{Clock, clock_for};

/// Compute the schedule for `place` at the clock's current instant.
pub fn query_schedule(
    ephemeris: &dyn Ephemeris,
    place: Place,
    clock: &dyn Clock,
) -> Result<Schedule, SolarError> {
    let now = clock.now();
    let series = compute_series(ephemeris, &PlaceTime::new(place, now))?;
    Ok(build_schedule(&series, now))
}

/// Handle the schedule command.
///
/// # Arguments
/// * `options` - Global options (config directory, debug)
/// * `at` - Evaluate at this instant instead of now
/// * `json` - Print machine-readable output without decoration
pub fn handle_schedule_command(
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
    let schedule = query_schedule(&SpaEphemeris::new(), place, clock.as_ref())?;

    if json {
        let output = json!({
            "place": place,
            "now": schedule.now,
            "closest_index": schedule.closest_index,
            "events": schedule.entries,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize schedule")?
        );
        return Ok(());
    }

    print_schedule(&schedule, config.timezone(), clock.is_fixed());
    log_end!();
    Ok(())
}

/// Log the schedule as a block, marking the closest event.
pub fn print_schedule(schedule: &Schedule, zone: Option<Tz>, pinned: bool) {
    if pinned {
        log_block_start!("Solar events as of {}", format_instant(schedule.now, zone));
    } else {
        log_block_start!("Solar events");
    }

    for entry in &schedule.entries {
        let marker = if entry.emphasized { "▶" } else { " " };
        log_indented!(
            "{} {}{:<12} {}  az {:>5.1}°  ({})",
            marker,
            entry.event.event_type.symbol(),
            entry.event.event_type.display_name(),
            format_instant(entry.event.instant, zone),
            entry.event.azimuth,
            entry.relative
        );
    }
}

pub fn display_help() {
    log_version!();
    log_block_start!("schedule - Show the surrounding solar events");
    log_block_start!("Usage: suncompass schedule [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-a, --at <instant>  Evaluate at an instant instead of now");
    log_indented!("                    RFC 3339, or YYYY-MM-DD HH:MM:SS in UTC");
    log_indented!("-j, --json          Output in JSON format");
    log_block_start!("Output:");
    log_indented!("The most recent past event followed by the next four events,");
    log_indented!("with the event closest to the evaluation instant highlighted.");
    log_block_start!("Examples:");
    log_indented!("suncompass schedule");
    log_indented!("suncompass schedule --at 2020-05-09T02:30:15Z --json");
    log_end!();
}
