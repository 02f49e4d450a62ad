//! Solar events and the projections built from them.
//!
//! This module turns the answers of an [`Ephemeris`](crate::ephemeris::Ephemeris)
//! into the data the display layer consumes.
//!
//! ## Module Structure
//!
//! - [`series`]: the windowing engine producing the ordered event series
//! - [`identity`]: weak identifiers, closest-event selection, and series diffing
//! - [`schedule`]: the schedule list projection
//! - [`compass`]: the per-type compass projection with overlap inset resolution

pub mod compass;
pub mod identity;
pub mod schedule;
pub mod series;

pub use compass::{CompassEvent, CompassView, SunMotion, build_compass_view};
pub use identity::{SeriesDiff, WeakEventId, closest_event_index, diff_series, weak_id};
pub use schedule::{Schedule, ScheduleEntry, build_schedule};
pub use series::{EventSeries, compute_series};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four solar events tracked each day.
///
/// The declaration order is the ordinal used for identity hashing, tie-breaking
/// and display ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Rise,
    Noon,
    Set,
    Nadir,
}

impl EventType {
    pub const ALL: [EventType; 4] = [Self::Rise, Self::Noon, Self::Set, Self::Nadir];

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Rise => 0,
            Self::Noon => 1,
            Self::Set => 2,
            Self::Nadir => 3,
        }
    }

    /// Returns the display name for this event type.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Rise => "Sunrise",
            Self::Noon => "Solar noon",
            Self::Set => "Sunset",
            Self::Nadir => "Solar nadir",
        }
    }

    /// Returns the icon/symbol for this event type.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Rise => "󰖜 ",
            Self::Noon => "󰖨 ",
            Self::Set => "󰖛 ",
            Self::Nadir => " ",
        }
    }

    /// RISE and SET disappear during polar day and night; NOON and NADIR never do.
    pub fn may_be_absent(self) -> bool {
        matches!(self, Self::Rise | Self::Set)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rise => "RISE",
            Self::Noon => "NOON",
            Self::Set => "SET",
            Self::Nadir => "NADIR",
        };
        f.write_str(name)
    }
}

/// A single occurrence of a solar event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarEvent {
    pub event_type: EventType,
    pub instant: DateTime<Utc>,
    /// Sun azimuth at the event, degrees clockwise from north in `[0, 360)`.
    pub azimuth: f64,
}

impl SolarEvent {
    pub fn new(event_type: EventType, instant: DateTime<Utc>, azimuth: f64) -> Self {
        Self {
            event_type,
            instant,
            azimuth,
        }
    }

    /// Total ordering key: time first, type ordinal breaks ties.
    pub fn sort_key(&self) -> (DateTime<Utc>, EventType) {
        (self.instant, self.event_type)
    }

    /// Same type at the same instant.
    pub fn same_occurrence(&self, other: &SolarEvent) -> bool {
        self.event_type == other.event_type && self.instant == other.instant
    }
}

impl fmt::Display for SolarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({:.1}°)",
            self.event_type,
            self.instant.format("%Y-%m-%dT%H:%M:%SZ"),
            self.azimuth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_type_ordinals_follow_declaration() {
        let ordinals: Vec<u8> = EventType::ALL.iter().map(|t| t.ordinal()).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
        assert!(EventType::Rise < EventType::Nadir);
    }

    #[test]
    fn test_sort_key_breaks_ties_by_type() {
        let instant = Utc.with_ymd_and_hms(2020, 5, 9, 0, 0, 0).unwrap();
        let mut events = [
            SolarEvent::new(EventType::Nadir, instant, 0.0),
            SolarEvent::new(EventType::Rise, instant, 60.0),
        ];
        events.sort_by_key(SolarEvent::sort_key);
        assert_eq!(events[0].event_type, EventType::Rise);
    }

    #[test]
    fn test_display() {
        let instant = Utc.with_ymd_and_hms(2020, 5, 9, 2, 43, 51).unwrap();
        let event = SolarEvent::new(EventType::Set, instant, 293.44);
        assert_eq!(event.to_string(), "SET@2020-05-09T02:43:51Z (293.4°)");
    }
}
