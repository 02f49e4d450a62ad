//! Observer location and the `(place, instant)` query key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observer location. Latitude and longitude in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Place {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Whether the coordinates are inside the valid geographic ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.altitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}°{ns}, {:.4}°{ew}",
            self.latitude.abs(),
            self.longitude.abs()
        )?;
        if self.altitude != 0.0 {
            write!(f, " ({:.0} m)", self.altitude)?;
        }
        Ok(())
    }
}

/// The sole query key of the windowing engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceTime {
    pub place: Place,
    pub instant: DateTime<Utc>,
}

impl PlaceTime {
    pub fn new(place: Place, instant: DateTime<Utc>) -> Self {
        Self { place, instant }
    }
}
