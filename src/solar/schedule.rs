//! Schedule list projection of an event series.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::identity::{WeakEventId, closest_event_index, weak_id};
use super::{EventSeries, SolarEvent};
use crate::common::utils::relative_to;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub id: WeakEventId,
    pub event: SolarEvent,
    /// The event nearest to "now", highlighted in the list.
    pub emphasized: bool,
    /// Human offset from "now", e.g. `in 2h 13m`.
    pub relative: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub now: DateTime<Utc>,
    pub closest_index: usize,
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn closest(&self) -> Option<&ScheduleEntry> {
        self.entries.get(self.closest_index)
    }
}

/// Build the schedule list for `series` as seen at `now`.
pub fn build_schedule(series: &EventSeries, now: DateTime<Utc>) -> Schedule {
    let closest_index = closest_event_index(series, now);

    let entries = series
        .iter()
        .enumerate()
        .map(|(index, event)| ScheduleEntry {
            id: weak_id(event),
            event: *event,
            emphasized: index == closest_index,
            relative: relative_to(event.instant, now),
        })
        .collect();

    Schedule {
        now,
        closest_index,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::FixtureEphemeris;
    use crate::geo::{Place, PlaceTime};
    use crate::solar::{EventType, compute_series};
    use chrono::TimeZone;

    #[test]
    fn test_schedule_emphasizes_closest_event() {
        let now = Utc.with_ymd_and_hms(2020, 5, 9, 2, 30, 15).unwrap();
        let place_time = PlaceTime::new(Place::new(34.0, -118.5, 0.0), now);
        let series =
            compute_series(&FixtureEphemeris::santa_monica_may_2020(), &place_time).unwrap();

        let schedule = build_schedule(&series, now);
        assert_eq!(schedule.entries.len(), 5);
        assert_eq!(schedule.closest_index, 1);

        let emphasized: Vec<bool> = schedule.entries.iter().map(|e| e.emphasized).collect();
        assert_eq!(emphasized, vec![false, true, false, false, false]);

        let closest = schedule.closest().unwrap();
        assert_eq!(closest.event.event_type, EventType::Set);
        assert_eq!(closest.relative, "in 13m");
        assert_eq!(schedule.entries[0].relative, "6h 39m ago");
        assert_eq!(closest.id, weak_id(&closest.event));
    }
}
