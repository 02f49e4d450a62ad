//! Ephemeris backed by the NREL Solar Position Algorithm (`solar-positioning`).
//!
//! The crate answers per UTC day: sunrise, transit and sunset (or only the
//! transit during polar day and night), plus the sun position at any instant.
//! This adapter turns those daily answers into window queries:
//!
//! - NOON is the transit, RISE / SET the standard -0.833° horizon crossings
//! - NADIR is the midpoint between two consecutive transits
//! - every instant is rounded to the whole second
//!
//! Each window is answered from the days around it, so one physical event can be
//! reported by two neighbouring days. Such duplicates are merged, keeping the
//! answer of the day the event falls on. The same event therefore gets the same
//! instant whichever window finds it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, SubsecRound, Utc};
use solar_positioning::time::DeltaT;
use solar_positioning::{Horizon, RefractionCorrection, SunriseResult, spa};

use super::{Ephemeris, EventSample, WindowEvents};
use crate::error::EphemerisError;
use crate::geo::{Place, normalize_degrees};
use crate::solar::EventType;

/// Days queried on each side of a window.
const DAY_MARGIN: i64 = 2;

/// Answers closer than this for the same event type describe one event.
const DUPLICATE_SPAN_HOURS: i64 = 6;

/// Standard atmosphere for the refraction correction (hPa, °C).
const PRESSURE: f64 = 1013.25;
const TEMPERATURE: f64 = 15.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpaEphemeris;

impl SpaEphemeris {
    pub fn new() -> Self {
        Self
    }
}

impl Ephemeris for SpaEphemeris {
    fn events_in_window(
        &self,
        place: &Place,
        start: DateTime<Utc>,
        limit: Duration,
    ) -> Result<WindowEvents, EphemerisError> {
        check_place(place)?;
        let end = start + limit;
        let mut window = WindowEvents::default();
        if end <= start {
            return Ok(window);
        }

        let first_day = (start - Duration::days(DAY_MARGIN)).date_naive();
        let last_day = (end + Duration::days(DAY_MARGIN)).date_naive();

        let mut answers = Vec::new();
        for day in first_day.iter_days().take_while(|day| *day <= last_day) {
            answers.extend(daily_answers(place, day)?);
        }

        let transits = merge_duplicates(of_type(&answers, EventType::Noon));
        let nadirs: Vec<DateTime<Utc>> = transits
            .windows(2)
            .map(|pair| (pair[0] + (pair[1] - pair[0]) / 2).round_subsecs(0))
            .collect();

        for event_type in EventType::ALL {
            let instants = match event_type {
                EventType::Noon => transits.clone(),
                EventType::Nadir => nadirs.clone(),
                EventType::Rise | EventType::Set => {
                    merge_duplicates(of_type(&answers, event_type))
                }
            };

            if let Some(instant) = instants.into_iter().find(|t| *t >= start && *t < end) {
                let azimuth = sun_azimuth_at(place, instant)?;
                window.set(event_type, EventSample::new(instant, azimuth));
            }
        }

        Ok(window)
    }

    fn sun_azimuth(&self, place: &Place, instant: DateTime<Utc>) -> Result<f64, EphemerisError> {
        check_place(place)?;
        sun_azimuth_at(place, instant)
    }
}

/// One event reported by the daily query for `day`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DailyAnswer {
    event_type: EventType,
    instant: DateTime<Utc>,
    day: NaiveDate,
}

fn check_place(place: &Place) -> Result<(), EphemerisError> {
    if place.is_valid() {
        Ok(())
    } else {
        Err(EphemerisError::InvalidPlace {
            latitude: place.latitude,
            longitude: place.longitude,
        })
    }
}

fn computation(error: impl std::fmt::Display) -> EphemerisError {
    EphemerisError::Computation(error.to_string())
}

fn delta_t(instant: DateTime<Utc>) -> Result<f64, EphemerisError> {
    DeltaT::estimate_from_date(instant.year(), instant.month()).map_err(computation)
}

fn sun_azimuth_at(place: &Place, instant: DateTime<Utc>) -> Result<f64, EphemerisError> {
    let position = spa::solar_position(
        instant,
        place.latitude,
        place.longitude,
        place.altitude,
        delta_t(instant)?,
        Some(RefractionCorrection::new(PRESSURE, TEMPERATURE).map_err(computation)?),
    )
    .map_err(computation)?;

    Ok(normalize_degrees(position.azimuth()))
}

/// Rise, transit and set for the UTC day `day`; only the transit when the sun
/// stays above or below the horizon all day.
fn daily_answers(place: &Place, day: NaiveDate) -> Result<Vec<DailyAnswer>, EphemerisError> {
    let midnight = day.and_time(NaiveTime::MIN).and_utc();
    let result = spa::sunrise_sunset_for_horizon(
        midnight,
        place.latitude,
        place.longitude,
        delta_t(midnight)?,
        Horizon::SunriseSunset,
    )
    .map_err(computation)?;

    let answer = |event_type, instant: DateTime<Utc>| DailyAnswer {
        event_type,
        instant: instant.round_subsecs(0),
        day,
    };

    Ok(match result {
        SunriseResult::RegularDay {
            sunrise,
            transit,
            sunset,
        } => vec![
            answer(EventType::Rise, sunrise),
            answer(EventType::Noon, transit),
            answer(EventType::Set, sunset),
        ],
        SunriseResult::AllDay { transit } | SunriseResult::AllNight { transit } => {
            vec![answer(EventType::Noon, transit)]
        }
    })
}

fn of_type(answers: &[DailyAnswer], event_type: EventType) -> Vec<DailyAnswer> {
    answers
        .iter()
        .filter(|a| a.event_type == event_type)
        .copied()
        .collect()
}

/// One instant per physical event, sorted.
///
/// Within a group of duplicates the answer of the day the event falls on wins,
/// then the earliest queried day.
fn merge_duplicates(mut answers: Vec<DailyAnswer>) -> Vec<DateTime<Utc>> {
    answers.sort_by_key(|a| (a.instant, a.day));

    let mut groups: Vec<Vec<DailyAnswer>> = Vec::new();
    for answer in answers {
        match groups.last_mut() {
            Some(group)
                if answer.instant - group[0].instant < Duration::hours(DUPLICATE_SPAN_HOURS) =>
            {
                group.push(answer)
            }
            _ => groups.push(vec![answer]),
        }
    }

    groups
        .iter()
        .filter_map(|group| {
            group
                .iter()
                .find(|a| a.instant.date_naive() == a.day)
                .or_else(|| group.iter().min_by_key(|a| a.day))
                .map(|a| a.instant)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::arc;
    use chrono::TimeZone;

    fn santa_monica() -> Place {
        Place::new(34.0, -118.5, 0.0)
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn within(actual: DateTime<Utc>, expected: DateTime<Utc>, seconds: i64) -> bool {
        (actual - expected).num_seconds().abs() <= seconds
    }

    #[test]
    fn test_noon_azimuth_is_south_at_mid_northern_latitude() {
        let window = SpaEphemeris
            .events_in_window(&santa_monica(), utc(2020, 5, 9, 12, 0, 0), Duration::hours(24))
            .unwrap();

        let noon = window.noon.unwrap();
        assert!(within(noon.instant, utc(2020, 5, 9, 19, 50, 31), 30));
        assert!((noon.azimuth - 180.0).abs() < 1.0);

        let nadir = window.nadir.unwrap();
        assert!(arc(0.0, nadir.azimuth).abs() < 1.0);
    }

    #[test]
    fn test_reference_set_and_rise() {
        let window = SpaEphemeris
            .events_in_window(&santa_monica(), utc(2020, 5, 9, 2, 30, 15), Duration::hours(36))
            .unwrap();

        let set = window.set.unwrap();
        assert!(within(set.instant, utc(2020, 5, 9, 2, 43, 51), 120));
        assert!(set.azimuth > 270.0 && set.azimuth < 310.0);

        let rise = window.rise.unwrap();
        assert!(within(rise.instant, utc(2020, 5, 9, 12, 56, 55), 120));
        assert!(rise.azimuth > 50.0 && rise.azimuth < 90.0);
    }

    #[test]
    fn test_instants_are_whole_seconds() {
        let window = SpaEphemeris
            .events_in_window(&santa_monica(), utc(2020, 5, 9, 2, 30, 15), Duration::hours(36))
            .unwrap();
        for event in window.sorted_events() {
            assert_eq!(event.instant.timestamp_subsec_nanos(), 0);
        }
    }

    #[test]
    fn test_nadir_lies_between_transits() {
        let window = SpaEphemeris
            .events_in_window(&santa_monica(), utc(2020, 5, 9, 12, 0, 0), Duration::hours(36))
            .unwrap();
        let noon = window.noon.unwrap().instant;
        let nadir = window.nadir.unwrap().instant;

        let half_day = (nadir - noon).num_seconds();
        assert!((half_day - 43_200).abs() < 60, "nadir {half_day}s after noon");
    }

    #[test]
    fn test_same_event_from_different_window_starts() {
        let place = santa_monica();
        let first = SpaEphemeris
            .events_in_window(&place, utc(2020, 5, 8, 13, 30, 15), Duration::hours(14))
            .unwrap();
        let second = SpaEphemeris
            .events_in_window(&place, utc(2020, 5, 9, 0, 7, 42), Duration::hours(36))
            .unwrap();

        assert!(first.set.is_some());
        assert_eq!(first.set.map(|s| s.instant), second.set.map(|s| s.instant));
    }

    #[test]
    fn test_window_bounds_are_half_open() {
        let place = santa_monica();
        let set = SpaEphemeris
            .events_in_window(&place, utc(2020, 5, 9, 0, 0, 0), Duration::hours(12))
            .unwrap()
            .set
            .unwrap()
            .instant;

        let at_set = SpaEphemeris
            .events_in_window(&place, set, Duration::hours(1))
            .unwrap();
        assert_eq!(at_set.set.map(|s| s.instant), Some(set));

        let ending_at_set = SpaEphemeris
            .events_in_window(&place, set - Duration::hours(1), Duration::hours(1))
            .unwrap();
        assert!(ending_at_set.set.is_none());
    }

    #[test]
    fn test_polar_day_has_no_rise_or_set() {
        // Longyearbyen around the June solstice
        let place = Place::new(78.22, 15.65, 0.0);
        let window = SpaEphemeris
            .events_in_window(&place, utc(2020, 6, 21, 0, 0, 0), Duration::hours(36))
            .unwrap();

        assert!(window.rise.is_none());
        assert!(window.set.is_none());
        assert!(window.noon.is_some());
        assert!(window.nadir.is_some());
    }

    #[test]
    fn test_invalid_place_is_an_adapter_error() {
        let place = Place::new(95.0, 0.0, 0.0);
        let start = utc(2020, 5, 9, 0, 0, 0);
        let result = SpaEphemeris.events_in_window(&place, start, Duration::hours(1));
        assert!(matches!(result, Err(EphemerisError::InvalidPlace { .. })));
        assert!(SpaEphemeris.sun_azimuth(&place, start).is_err());
    }

    #[test]
    fn test_duplicates_keep_the_answer_of_their_own_day() {
        let may_8 = NaiveDate::from_ymd_opt(2020, 5, 8).unwrap();
        let may_9 = NaiveDate::from_ymd_opt(2020, 5, 9).unwrap();
        let answers = vec![
            DailyAnswer {
                event_type: EventType::Set,
                instant: utc(2020, 5, 9, 2, 43, 47),
                day: may_8,
            },
            DailyAnswer {
                event_type: EventType::Set,
                instant: utc(2020, 5, 9, 2, 43, 51),
                day: may_9,
            },
            DailyAnswer {
                event_type: EventType::Set,
                instant: utc(2020, 5, 10, 2, 44, 41),
                day: may_9,
            },
        ];

        assert_eq!(
            merge_duplicates(answers),
            vec![utc(2020, 5, 9, 2, 43, 51), utc(2020, 5, 10, 2, 44, 41)]
        );
    }
}
