//! Compass projection: one event per type placed on the azimuth circle.
//!
//! Near the tropics solar noon and solar nadir can point the same way (both due
//! north, for example), which would draw two markers on top of each other. When
//! their azimuths are closer than the overlap threshold, the later of the two is
//! drawn inset.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::identity::{WeakEventId, weak_id};
use super::{EventSeries, EventType, SolarEvent};
use crate::common::constants::SUN_MOTION_LOOKAHEAD_SECONDS;
use crate::ephemeris::Ephemeris;
use crate::error::SolarError;
use crate::geo::{Place, arc, distance};

/// Direction the sun currently moves along the compass circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SunMotion {
    Clockwise,
    Counterclockwise,
}

impl SunMotion {
    /// Motion implied by the signed rotation between two azimuth readings.
    pub fn from_rotation(rotation: f64) -> Self {
        if rotation >= 0.0 {
            Self::Clockwise
        } else {
            Self::Counterclockwise
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompassEvent {
    pub id: WeakEventId,
    pub event: SolarEvent,
    pub inset: bool,
}

impl CompassEvent {
    fn new(event: SolarEvent) -> Self {
        Self {
            id: weak_id(&event),
            event,
            inset: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompassView {
    /// One event per type present, in type ordinal order.
    pub events: Vec<CompassEvent>,
    pub sun_azimuth: f64,
    pub sun_motion: SunMotion,
}

impl CompassView {
    pub fn event(&self, event_type: EventType) -> Option<&CompassEvent> {
        self.events.iter().find(|e| e.event.event_type == event_type)
    }
}

/// Reduce a series to its earliest occurrence of each type and resolve the
/// noon/nadir overlap.
pub fn project_compass(
    series: &EventSeries,
    overlap_threshold: f64,
) -> Result<Vec<CompassEvent>, SolarError> {
    let mut earliest: BTreeMap<EventType, SolarEvent> = BTreeMap::new();
    for event in series {
        earliest.entry(event.event_type).or_insert(*event);
    }

    let mut events: Vec<CompassEvent> = earliest.into_values().map(CompassEvent::new).collect();
    resolve_overlap(&mut events, overlap_threshold)?;
    Ok(events)
}

/// Set the inset flags of NOON and NADIR.
///
/// Both flags are always written, so a previously inset event is reset when the
/// overlap goes away.
pub fn resolve_overlap(
    events: &mut [CompassEvent],
    overlap_threshold: f64,
) -> Result<(), SolarError> {
    let noon = position_of(events, EventType::Noon)?;
    let nadir = position_of(events, EventType::Nadir)?;

    let overlapping =
        distance(events[noon].event.azimuth, events[nadir].event.azimuth) < overlap_threshold;
    let nadir_is_later = events[nadir].event.instant > events[noon].event.instant;

    events[noon].inset = overlapping && !nadir_is_later;
    events[nadir].inset = overlapping && nadir_is_later;

    if overlapping {
        log_debug!(
            "Noon and nadir azimuths overlap, insetting {}",
            if nadir_is_later { "nadir" } else { "noon" }
        );
    }

    Ok(())
}

fn position_of(events: &[CompassEvent], event_type: EventType) -> Result<usize, SolarError> {
    events
        .iter()
        .position(|e| e.event.event_type == event_type)
        .ok_or_else(|| {
            let message = format!("{event_type} missing from the compass projection");
            log_critical!("Compass integrity violation: {message}");
            SolarError::Integrity(message)
        })
}

/// Build the compass view for `series` as seen at `now`.
pub fn build_compass_view(
    ephemeris: &dyn Ephemeris,
    place: &Place,
    series: &EventSeries,
    now: DateTime<Utc>,
    overlap_threshold: f64,
) -> Result<CompassView, SolarError> {
    let events = project_compass(series, overlap_threshold)?;

    let sun_azimuth = ephemeris.sun_azimuth(place, now)?;
    let ahead =
        ephemeris.sun_azimuth(place, now + Duration::seconds(SUN_MOTION_LOOKAHEAD_SECONDS))?;
    let sun_motion = SunMotion::from_rotation(arc(sun_azimuth, ahead));

    Ok(CompassView {
        events,
        sun_azimuth,
        sun_motion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::DEFAULT_OVERLAP_THRESHOLD;
    use crate::ephemeris::{EventSample, FixtureEphemeris, MockEphemeris, WindowEvents};
    use crate::geo::PlaceTime;
    use crate::solar::compute_series;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 6, day, hour, minute, 0).unwrap()
    }

    fn santa_monica() -> Place {
        Place::new(34.0, -118.5, 0.0)
    }

    /// Tropical summer: the sun culminates north of the zenith, so noon and
    /// nadir both sit near due north.
    fn tropical_series(noon_azimuth: f64) -> EventSeries {
        let mut mock = MockEphemeris::new();
        mock.expect_events_in_window()
            .returning(move |_, start, _| {
                let table = [
                    (EventType::Noon, at(20, 17, 25), noon_azimuth),
                    (EventType::Set, at(20, 23, 56), 296.0),
                    (EventType::Nadir, at(21, 5, 25), 0.0),
                    (EventType::Rise, at(21, 10, 54), 64.0),
                    (EventType::Noon, at(21, 17, 25), noon_azimuth),
                ];
                let mut window = WindowEvents::default();
                for (event_type, instant, azimuth) in table {
                    if instant >= start && window.get(event_type).is_none() {
                        window.set(event_type, EventSample::new(instant, azimuth));
                    }
                }
                Ok(window)
            });

        let place_time = PlaceTime::new(Place::new(21.3, -157.9, 0.0), at(20, 20, 0));
        compute_series(&mock, &place_time).unwrap()
    }

    #[test]
    fn test_projection_keeps_earliest_occurrence_per_type() {
        let series = tropical_series(180.0);
        let events = project_compass(&series, DEFAULT_OVERLAP_THRESHOLD).unwrap();

        assert_eq!(events.len(), 4);
        let types: Vec<EventType> = events.iter().map(|e| e.event.event_type).collect();
        assert_eq!(
            types,
            vec![EventType::Rise, EventType::Noon, EventType::Set, EventType::Nadir]
        );

        let noon = &events[1];
        assert_eq!(noon.event.instant, at(20, 17, 25));
        assert!(events.iter().all(|e| !e.inset));
    }

    #[test]
    fn test_overlapping_noon_and_nadir_inset_the_later_one() {
        let series = tropical_series(355.0);
        let events = project_compass(&series, DEFAULT_OVERLAP_THRESHOLD).unwrap();

        let noon = events.iter().find(|e| e.event.event_type == EventType::Noon).unwrap();
        let nadir = events.iter().find(|e| e.event.event_type == EventType::Nadir).unwrap();
        assert!(!noon.inset);
        assert!(nadir.inset);
    }

    #[test]
    fn test_resolve_overlap_resets_previous_inset() {
        let series = tropical_series(180.0);
        let mut events = project_compass(&series, DEFAULT_OVERLAP_THRESHOLD).unwrap();
        for event in &mut events {
            event.inset = true;
        }

        resolve_overlap(&mut events, DEFAULT_OVERLAP_THRESHOLD).unwrap();
        assert!(events.iter().all(|e| e.event.event_type == EventType::Rise
            || e.event.event_type == EventType::Set
            || !e.inset));
    }

    #[test]
    fn test_missing_nadir_is_an_integrity_violation() {
        crate::logger::Log::set_enabled(false);
        let noon = SolarEvent::new(EventType::Noon, at(20, 17, 25), 180.0);
        let mut events = vec![CompassEvent::new(noon)];
        let result = resolve_overlap(&mut events, DEFAULT_OVERLAP_THRESHOLD);
        assert!(result.unwrap_err().is_integrity_violation());
    }

    #[test]
    fn test_compass_view_sun_motion() {
        let now = Utc.with_ymd_and_hms(2020, 5, 9, 2, 30, 15).unwrap();
        let ephemeris = FixtureEphemeris::santa_monica_may_2020();
        let series =
            compute_series(&ephemeris, &PlaceTime::new(santa_monica(), now)).unwrap();

        let view =
            build_compass_view(&ephemeris, &santa_monica(), &series, now, DEFAULT_OVERLAP_THRESHOLD)
                .unwrap();

        assert_eq!(view.sun_motion, SunMotion::Clockwise);
        assert!(view.sun_azimuth > 280.0 && view.sun_azimuth < 292.0);
        assert_eq!(view.events.len(), 4);
        assert_eq!(
            view.event(EventType::Set).map(|e| e.event.instant),
            Some(Utc.with_ymd_and_hms(2020, 5, 9, 2, 43, 51).unwrap())
        );
    }

    #[test]
    fn test_counterclockwise_sun() {
        assert_eq!(SunMotion::from_rotation(-0.2), SunMotion::Counterclockwise);
        assert_eq!(SunMotion::from_rotation(0.0), SunMotion::Clockwise);
    }
}
