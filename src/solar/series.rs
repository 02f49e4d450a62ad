//! The event windowing engine.
//!
//! A series is the most recent past event followed by the upcoming events of one
//! forward window. Two adapter queries are made per series:
//!
//! - a forward window of 36 hours starting at the query instant, which yields the
//!   upcoming events (one per type)
//! - a preceding window starting 13 hours before the query instant and lasting 14
//!   hours, which yields the candidates for the most recent event
//!
//! The preceding window reaches one hour past the query instant, so an event that
//! sits exactly on the query instant is seen by both windows. The candidate that
//! shares its type with the first upcoming event is skipped, which keeps such an
//! event from showing up twice.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::SolarEvent;
use crate::common::constants::{SERIES_LEN, future_limit, preceding_limit, preceding_offset};
use crate::ephemeris::Ephemeris;
use crate::error::SolarError;
use crate::geo::PlaceTime;

/// Time-ordered solar events around a query instant.
///
/// `events()[0]` is strictly before the query instant and `events()[1]` is at or
/// after it. Five entries are produced whenever all four event types occur in the
/// forward window; during polar day or night the absent RISE/SET shortens it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSeries {
    query: DateTime<Utc>,
    events: Vec<SolarEvent>,
}

impl EventSeries {
    pub fn query_instant(&self) -> DateTime<Utc> {
        self.query
    }

    pub fn events(&self) -> &[SolarEvent] {
        &self.events
    }

    /// The most recent event before the query instant.
    pub fn preceding(&self) -> &SolarEvent {
        &self.events[0]
    }

    /// The first event at or after the query instant.
    pub fn next(&self) -> &SolarEvent {
        &self.events[1]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True when every event type was found in the forward window.
    pub fn is_complete(&self) -> bool {
        self.events.len() == SERIES_LEN
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SolarEvent> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a EventSeries {
    type Item = &'a SolarEvent;
    type IntoIter = std::slice::Iter<'a, SolarEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Compute the event series around `place_time`.
///
/// Adapter failures are propagated unchanged. An empty forward window is a query
/// failure. A missing preceding event or a broken ordering invariant is reported
/// as an integrity violation.
pub fn compute_series(
    ephemeris: &dyn Ephemeris,
    place_time: &PlaceTime,
) -> Result<EventSeries, SolarError> {
    let place = place_time.place;
    let query = place_time.instant;

    let future = ephemeris
        .events_in_window(&place, query, future_limit())?
        .sorted_events();
    let Some(next) = future.first().copied() else {
        return Err(SolarError::EmptyWindow { start: query });
    };

    let past_start = query - preceding_offset();
    let past = ephemeris
        .events_in_window(&place, past_start, preceding_limit())?
        .sorted_events();

    let preceding = past
        .iter()
        .rev()
        .find(|e| e.instant < query && e.event_type != next.event_type)
        .copied();
    let Some(preceding) = preceding else {
        return Err(integrity_violation(format!(
            "no event of a type other than {} found before {} in the preceding window",
            next.event_type, query
        )));
    };

    let mut events = Vec::with_capacity(SERIES_LEN);
    events.push(preceding);
    events.extend(future);

    check_invariants(query, &events)?;

    log_debug!(
        "Series at {}: {}",
        query.format("%Y-%m-%dT%H:%M:%SZ"),
        events
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(EventSeries { query, events })
}

fn check_invariants(query: DateTime<Utc>, events: &[SolarEvent]) -> Result<(), SolarError> {
    if !(events[0].instant < query && query <= events[1].instant) {
        return Err(integrity_violation(format!(
            "query {query} is not bracketed by {} and {}",
            events[0], events[1]
        )));
    }

    for pair in events.windows(2) {
        if pair[0].sort_key() > pair[1].sort_key() {
            return Err(integrity_violation(format!(
                "events out of order: {} before {}",
                pair[0], pair[1]
            )));
        }
        if pair[0].same_occurrence(&pair[1]) {
            return Err(integrity_violation(format!("duplicate event {}", pair[0])));
        }
    }

    Ok(())
}

fn integrity_violation(message: String) -> SolarError {
    log_critical!("Solar series integrity violation: {message}");
    SolarError::Integrity(message)
}
