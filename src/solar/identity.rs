//! Stable identifiers for solar events across recomputation.
//!
//! A weak ID is the event instant truncated to a 2^14 second bucket (about 4.55
//! hours) plus the type ordinal. Recomputing the same real event yields the same
//! ID unless its computed time jitters across a bucket edge. Distinct same-type
//! events are about a day apart and never share a bucket. IDs are a diffing key
//! for display, not a uniqueness guarantee.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use super::{EventSeries, SolarEvent};
use crate::common::constants::WEAK_ID_BUCKET_BITS;

const BUCKET_MASK: i64 = (1 << WEAK_ID_BUCKET_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WeakEventId(i64);

impl WeakEventId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for WeakEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

pub fn weak_id(event: &SolarEvent) -> WeakEventId {
    let bucket = event.instant.timestamp() & !BUCKET_MASK;
    WeakEventId(bucket + i64::from(event.event_type.ordinal()))
}

/// Index of the series event nearest in time to `now`: 0 before the midpoint of
/// the first two events, 1 from the midpoint on.
pub fn closest_event_index(series: &EventSeries, now: DateTime<Utc>) -> usize {
    let preceding = series.preceding().instant;
    let next = series.next().instant;
    let midpoint = preceding + (next - preceding) / 2;
    if now < midpoint { 0 } else { 1 }
}

/// Events that appeared, disappeared and stayed between two series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesDiff {
    pub added: Vec<SolarEvent>,
    pub removed: Vec<SolarEvent>,
    pub kept: Vec<SolarEvent>,
}

impl SeriesDiff {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare two series by weak ID. Kept events are taken from `new`.
pub fn diff_series(old: &EventSeries, new: &EventSeries) -> SeriesDiff {
    let old_ids: HashSet<WeakEventId> = old.iter().map(weak_id).collect();
    let new_ids: HashSet<WeakEventId> = new.iter().map(weak_id).collect();

    let mut diff = SeriesDiff::default();
    for event in new {
        if old_ids.contains(&weak_id(event)) {
            diff.kept.push(*event);
        } else {
            diff.added.push(*event);
        }
    }
    diff.removed = old
        .iter()
        .filter(|e| !new_ids.contains(&weak_id(e)))
        .copied()
        .collect();

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::FixtureEphemeris;
    use crate::geo::{Place, PlaceTime};
    use crate::solar::{EventType, compute_series};
    use chrono::{Duration, TimeZone};

    fn series_at(instant: DateTime<Utc>) -> EventSeries {
        let ephemeris = FixtureEphemeris::santa_monica_may_2020();
        let place_time = PlaceTime::new(Place::new(34.0, -118.5, 0.0), instant);
        compute_series(&ephemeris, &place_time).unwrap()
    }

    #[test]
    fn test_weak_id_buckets_and_ordinal() {
        let base = Utc.timestamp_opt(1 << 30, 0).unwrap();
        let noon = SolarEvent::new(EventType::Noon, base, 180.0);
        assert_eq!(weak_id(&noon).value(), (1 << 30) + 1);

        let jittered = SolarEvent::new(EventType::Noon, base + Duration::seconds(90), 180.0);
        assert_eq!(weak_id(&noon), weak_id(&jittered));

        let nadir = SolarEvent::new(EventType::Nadir, base, 0.0);
        assert_ne!(weak_id(&noon), weak_id(&nadir));

        let next_day = SolarEvent::new(EventType::Noon, base + Duration::days(1), 180.0);
        assert_ne!(weak_id(&noon), weak_id(&next_day));
    }

    #[test]
    fn test_closest_event_index_switches_at_midpoint() {
        let series = series_at(Utc.with_ymd_and_hms(2020, 5, 9, 2, 30, 15).unwrap());
        assert_eq!(closest_event_index(&series, series.query_instant()), 1);

        let preceding = series.preceding().instant;
        let midpoint = preceding + (series.next().instant - preceding) / 2;
        assert_eq!(closest_event_index(&series, midpoint - Duration::seconds(1)), 0);
        assert_eq!(closest_event_index(&series, midpoint), 1);
    }

    #[test]
    fn test_closest_event_index_right_after_an_event() {
        let series = series_at(Utc.with_ymd_and_hms(2020, 5, 18, 2, 50, 50).unwrap());
        assert_eq!(closest_event_index(&series, series.query_instant()), 0);
    }

    #[test]
    fn test_diff_across_an_event_boundary() {
        let set = Utc.with_ymd_and_hms(2020, 5, 9, 2, 43, 51).unwrap();
        let before = series_at(set);
        let after = series_at(set + Duration::seconds(1));

        let diff = diff_series(&before, &after);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.kept.len(), 4);
        assert_eq!(diff.removed[0].event_type, EventType::Noon);
        assert_eq!(diff.added[0].event_type, EventType::Set);
    }

    #[test]
    fn test_diff_of_identical_series_is_unchanged() {
        let instant = Utc.with_ymd_and_hms(2020, 5, 9, 2, 30, 15).unwrap();
        let diff = diff_series(&series_at(instant), &series_at(instant));
        assert!(diff.is_unchanged());
        assert_eq!(diff.kept.len(), 5);
    }
}
