//! Table-driven ephemeris for tests.
//!
//! Answers window queries from a fixed list of event occurrences, so tests can
//! assert exact series contents. Sun azimuth between two table entries is
//! interpolated along the clockwise sweep from the earlier entry to the later one.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{Ephemeris, EventSample, WindowEvents};
use crate::error::EphemerisError;
use crate::geo::{Place, normalize_degrees};
use crate::solar::{EventType, SolarEvent};

#[derive(Debug, Clone, Default)]
pub struct FixtureEphemeris {
    events: Vec<SolarEvent>,
}

impl FixtureEphemeris {
    pub fn new(mut events: Vec<SolarEvent>) -> Self {
        events.sort_by_key(SolarEvent::sort_key);
        Self { events }
    }

    pub fn events(&self) -> &[SolarEvent] {
        &self.events
    }

    /// Observed events for Santa Monica, CA (34.0, -118.5, 0 m), May 2020.
    ///
    /// Covers 2020-05-08 to 2020-05-10 and 2020-05-17 to 2020-05-20.
    pub fn santa_monica_may_2020() -> Self {
        use EventType::{Nadir, Noon, Rise, Set};

        let table = [
            (Set, (5, 8, 2, 43, 1), 291.2),
            (Nadir, (5, 8, 7, 50, 19), 0.0),
            (Rise, (5, 8, 12, 57, 47), 68.9),
            (Noon, (5, 8, 19, 50, 33), 180.0),
            (Set, (5, 9, 2, 43, 51), 291.4),
            (Nadir, (5, 9, 7, 50, 18), 0.0),
            (Rise, (5, 9, 12, 56, 55), 68.7),
            (Noon, (5, 9, 19, 50, 31), 180.0),
            (Set, (5, 10, 2, 44, 41), 291.6),
            (Nadir, (5, 10, 7, 50, 17), 0.0),
            (Rise, (5, 10, 12, 56, 3), 68.5),
            (Noon, (5, 10, 19, 50, 30), 180.0),
            (Set, (5, 17, 2, 49, 56), 292.9),
            (Nadir, (5, 17, 7, 50, 29), 0.0),
            (Rise, (5, 17, 12, 50, 52), 67.3),
            (Noon, (5, 17, 19, 50, 33), 180.0),
            (Set, (5, 18, 2, 50, 36), 293.1),
            (Nadir, (5, 18, 7, 50, 30), 0.0),
            (Rise, (5, 18, 12, 50, 13), 67.1),
            (Noon, (5, 18, 19, 50, 34), 180.0),
            (Set, (5, 19, 2, 51, 20), 293.2),
            (Nadir, (5, 19, 7, 50, 32), 0.0),
            (Rise, (5, 19, 12, 49, 35), 67.0),
            (Noon, (5, 19, 19, 50, 36), 180.0),
            (Set, (5, 20, 2, 52, 4), 293.4),
        ];

        let events = table
            .iter()
            .filter_map(|&(event_type, (month, day, hour, minute, second), azimuth)| {
                Utc.with_ymd_and_hms(2020, month, day, hour, minute, second)
                    .single()
                    .map(|instant| SolarEvent::new(event_type, instant, azimuth))
            })
            .collect();

        Self::new(events)
    }
}

impl Ephemeris for FixtureEphemeris {
    fn events_in_window(
        &self,
        _place: &Place,
        start: DateTime<Utc>,
        limit: Duration,
    ) -> Result<WindowEvents, EphemerisError> {
        let end = start + limit;
        let mut window = WindowEvents::default();

        for event in self
            .events
            .iter()
            .filter(|e| e.instant >= start && e.instant < end)
        {
            if window.get(event.event_type).is_none() {
                window.set(
                    event.event_type,
                    EventSample::new(event.instant, event.azimuth),
                );
            }
        }

        Ok(window)
    }

    fn sun_azimuth(&self, _place: &Place, instant: DateTime<Utc>) -> Result<f64, EphemerisError> {
        let after = self.events.iter().position(|e| e.instant > instant);
        let (before, after) = match after {
            Some(i) if i > 0 => (&self.events[i - 1], &self.events[i]),
            _ => {
                return Err(EphemerisError::Computation(format!(
                    "{instant} is outside the fixture table"
                )));
            }
        };

        let span = (after.instant - before.instant).num_milliseconds() as f64;
        let elapsed = (instant - before.instant).num_milliseconds() as f64;
        let sweep = normalize_degrees(after.azimuth - before.azimuth);
        Ok(normalize_degrees(before.azimuth + sweep * elapsed / span))
    }
}
