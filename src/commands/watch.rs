//! Watch command: keep the event series current and report what changes.
//!
//! The series is recomputed every `refresh_interval` seconds. Only differences
//! are logged: events that entered or left the window (keyed by weak id) and a
//! change of the closest event. SIGHUP reloads the configuration; a changed
//! location starts over with a full schedule. A failed computation is reported
//! and retried on the next tick.

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::Path;
use std::time::Duration;

use super::schedule::print_schedule;
use super::{format_instant, log_sun_data_unavailable};
use crate::args::GlobalOptions;
use crate::common::utils::private_path;
use crate::config::{self, Config};
use crate::ephemeris::{Ephemeris, SpaEphemeris};
use crate::error::SolarError;
use crate::geo::{Place, PlaceTime};
use crate::logger::Log;
use crate::signals::{SignalMessage, setup_signal_handler};
use crate::solar::{
    EventSeries, SeriesDiff, WeakEventId, build_schedule, compute_series, diff_series, weak_id,
};
use crate::time_source::{Clock, SystemClock};

/// What a refresh changed.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchUpdate {
    pub diff: SeriesDiff,
    /// New closest event id, when it moved.
    pub closest_changed: Option<WeakEventId>,
}

impl WatchUpdate {
    pub fn is_quiet(&self) -> bool {
        self.diff.is_unchanged() && self.closest_changed.is_none()
    }
}

/// The last computed series for one place.
pub struct Watcher {
    place: Place,
    series: EventSeries,
    closest: WeakEventId,
}

impl Watcher {
    pub fn new(
        ephemeris: &dyn Ephemeris,
        place: Place,
        now: DateTime<Utc>,
    ) -> Result<Self, SolarError> {
        let series = compute_series(ephemeris, &PlaceTime::new(place, now))?;
        let closest = closest_id(&series, now);
        Ok(Self {
            place,
            series,
            closest,
        })
    }

    pub fn place(&self) -> Place {
        self.place
    }

    pub fn series(&self) -> &EventSeries {
        &self.series
    }

    /// Recompute at `now` and return what differs from the previous series.
    pub fn refresh(
        &mut self,
        ephemeris: &dyn Ephemeris,
        now: DateTime<Utc>,
    ) -> Result<WatchUpdate, SolarError> {
        let series = compute_series(ephemeris, &PlaceTime::new(self.place, now))?;
        let diff = diff_series(&self.series, &series);

        let closest = closest_id(&series, now);
        let closest_changed = (closest != self.closest).then_some(closest);

        self.series = series;
        self.closest = closest;
        Ok(WatchUpdate {
            diff,
            closest_changed,
        })
    }
}

/// Outcome of one watch tick.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchTick {
    /// A watcher was (re)started; its series is new in full.
    Started,
    Updated(WatchUpdate),
}

/// Bring `watcher` to `now` for `place`, starting over when there is no
/// watcher yet or the place changed.
///
/// On error `watcher` is left as it was, so the next tick retries.
pub fn tick(
    watcher: &mut Option<Watcher>,
    ephemeris: &dyn Ephemeris,
    place: Place,
    now: DateTime<Utc>,
) -> Result<WatchTick, SolarError> {
    match watcher {
        Some(current) if current.place() == place => {
            current.refresh(ephemeris, now).map(WatchTick::Updated)
        }
        _ => {
            *watcher = Some(Watcher::new(ephemeris, place, now)?);
            Ok(WatchTick::Started)
        }
    }
}

fn closest_id(series: &EventSeries, now: DateTime<Utc>) -> WeakEventId {
    let schedule = build_schedule(series, now);
    schedule
        .closest()
        .map(|entry| entry.id)
        .unwrap_or_else(|| weak_id(series.next()))
}

fn log_update(update: &WatchUpdate, series: &EventSeries, zone: Option<Tz>) {
    for event in &update.diff.removed {
        log_decorated!(
            "Passed out of range: {} {}",
            event.event_type.display_name(),
            format_instant(event.instant, zone)
        );
    }
    for event in &update.diff.added {
        log_decorated!(
            "New upcoming event: {} {} (az {:.1}°)",
            event.event_type.display_name(),
            format_instant(event.instant, zone),
            event.azimuth
        );
    }
    if let Some(id) = update.closest_changed
        && let Some(event) = series.iter().find(|e| weak_id(e) == id)
    {
        log_decorated!(
            "Closest event is now {} {}",
            event.event_type.display_name(),
            format_instant(event.instant, zone)
        );
    }
}

/// Handle the watch command. Runs until SIGINT or SIGTERM.
pub fn handle_watch_command(options: &GlobalOptions) -> Result<()> {
    log_version!();
    let (mut config, config_path) = super::load_and_log_config(options)?;
    let signal_state = setup_signal_handler()?;
    Log::set_timestamps(true);

    let ephemeris = SpaEphemeris::new();
    let clock = SystemClock;
    let mut watcher: Option<Watcher> = None;

    while signal_state.is_running() {
        let now = clock.now();
        let interval = config.refresh_interval();

        match tick(&mut watcher, &ephemeris, config.place(), now) {
            Ok(WatchTick::Started) => {
                if let Some(current) = &watcher {
                    print_schedule(
                        &build_schedule(current.series(), now),
                        config.timezone(),
                        false,
                    );
                }
            }
            Ok(WatchTick::Updated(update)) => {
                if let Some(current) = &watcher {
                    if update.is_quiet() {
                        log_debug!("No changes ({} events kept)", update.diff.kept.len());
                    } else {
                        log_update(&update, current.series(), config.timezone());
                    }
                }
            }
            Err(e) if e.is_integrity_violation() => {
                Log::set_timestamps(false);
                return Err(e.into());
            }
            Err(e) => log_sun_data_unavailable(&e, &format!("Retrying in {interval}s")),
        }

        match signal_state.wait(Duration::from_secs(interval)) {
            Some(SignalMessage::Shutdown) => break,
            Some(SignalMessage::Reload) => {
                if let Some(reloaded) = reload_config(&config_path) {
                    config = reloaded;
                    if watcher.as_ref().is_some_and(|w| w.place() != config.place()) {
                        log_block_start!("Location changed to {}", config.place());
                    }
                }
            }
            None => {}
        }
    }

    Log::set_timestamps(false);
    log_block_start!("Stopped watching");
    log_end!();
    Ok(())
}

/// Reload after SIGHUP; an invalid file keeps the running configuration.
fn reload_config(path: &Path) -> Option<Config> {
    match config::load_from_path(path) {
        Ok(config) => {
            config.log_config(&private_path(path));
            Some(config)
        }
        Err(e) => {
            log_warning!("Keeping previous configuration: {:#}", e);
            None
        }
    }
}

pub fn display_help() {
    log_version!();
    log_block_start!("watch - Recompute periodically and report changes");
    log_block_start!("Usage: suncompass watch");
    log_block_start!("Behavior:");
    log_indented!("Prints the schedule once, then recomputes every refresh_interval");
    log_indented!("seconds and logs only the events that entered or left the window");
    log_indented!("and changes of the closest event. When the sun data cannot be");
    log_indented!("determined, the error is shown and retried on the next tick.");
    log_block_start!("Signals:");
    log_indented!("SIGHUP           Reload the configuration");
    log_indented!("SIGINT, SIGTERM  Stop watching");
    log_end!();
}
