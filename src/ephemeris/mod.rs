//! The solar ephemeris capability.
//!
//! The windowing engine never computes sun positions itself. It asks an
//! [`Ephemeris`] which events happen in a time window and reads the answers
//! through the [`WindowEvents`] dispatch table, so it stays independent of how
//! times and azimuths are actually sourced.
//!
//! [`spa::SpaEphemeris`] is the bundled implementation used by the CLI.

#[cfg(any(test, feature = "testing-support"))]
pub mod fixture;
pub mod spa;

#[cfg(any(test, feature = "testing-support"))]
pub use fixture::FixtureEphemeris;
pub use spa::SpaEphemeris;

use chrono::{DateTime, Duration, Utc};

use crate::error::EphemerisError;
use crate::geo::Place;
use crate::solar::{EventType, SolarEvent};

/// Time and sun azimuth of one event occurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSample {
    pub instant: DateTime<Utc>,
    pub azimuth: f64,
}

impl EventSample {
    pub fn new(instant: DateTime<Utc>, azimuth: f64) -> Self {
        Self { instant, azimuth }
    }
}

/// Per event type, the first occurrence inside a queried window, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowEvents {
    pub rise: Option<EventSample>,
    pub noon: Option<EventSample>,
    pub set: Option<EventSample>,
    pub nadir: Option<EventSample>,
}

impl WindowEvents {
    pub fn get(&self, event_type: EventType) -> Option<EventSample> {
        match event_type {
            EventType::Rise => self.rise,
            EventType::Noon => self.noon,
            EventType::Set => self.set,
            EventType::Nadir => self.nadir,
        }
    }

    pub fn set(&mut self, event_type: EventType, sample: EventSample) {
        let slot = match event_type {
            EventType::Rise => &mut self.rise,
            EventType::Noon => &mut self.noon,
            EventType::Set => &mut self.set,
            EventType::Nadir => &mut self.nadir,
        };
        *slot = Some(sample);
    }

    /// All present events, sorted by `(instant, type ordinal)`.
    pub fn sorted_events(&self) -> Vec<SolarEvent> {
        let mut events: Vec<SolarEvent> = EventType::ALL
            .iter()
            .filter_map(|&event_type| {
                self.get(event_type)
                    .map(|sample| SolarEvent::new(event_type, sample.instant, sample.azimuth))
            })
            .collect();
        events.sort_by_key(SolarEvent::sort_key);
        events
    }

    pub fn is_empty(&self) -> bool {
        EventType::ALL.iter().all(|&t| self.get(t).is_none())
    }
}

/// Source of solar event times and sun azimuths.
///
/// Implementations must be deterministic: identical inputs give identical
/// answers. Calls are synchronous and are never retried by the engine.
#[cfg_attr(test, mockall::automock)]
pub trait Ephemeris: Send + Sync {
    /// First occurrence of each event type in `[start, start + limit)`.
    fn events_in_window(
        &self,
        place: &Place,
        start: DateTime<Utc>,
        limit: Duration,
    ) -> Result<WindowEvents, EphemerisError>;

    /// Sun azimuth at `instant`, degrees clockwise from north in `[0, 360)`.
    fn sun_azimuth(&self, place: &Place, instant: DateTime<Utc>) -> Result<f64, EphemerisError>;
}
