//! Configuration system for suncompass.
//!
//! Settings live in `suncompass.toml`, searched in `$XDG_CONFIG_HOME/suncompass/`
//! unless a directory is given with `--config`. A commented default file is
//! generated on first use.
//!
//! ```toml
//! #[Location]
//! latitude = 34.0                # Geographic latitude (-90 to 90)
//! longitude = -118.5             # Geographic longitude (-180 to 180)
//! altitude = 0                   # Observer altitude in meters (-500 to 10000)
//!
//! #[Display]
//! # timezone = "America/Los_Angeles"  # IANA zone for displayed times (default: system)
//! overlap_threshold = 20         # Noon/nadir azimuth distance that triggers inset (0-180)°
//! refresh_interval = 60          # Seconds between recomputations in watch mode (1-3600)
//!
//! #[Compass]
//! heading_alpha = 0.15           # Heading smoothing factor (0-1], larger = more responsive
//! heading_quantum = 0.5          # Heading redraw step in degrees (0-45]
//! animation_duration = 0.4       # Lock/unlock rotation in seconds (0-10 | 0 = instant)
//! ```
//!
//! An optional `geo.toml` next to the main file overrides the coordinates, so the
//! main file can be shared without revealing a location.
//!
//! Every field is optional; missing values fall back to the defaults in
//! [`crate::common::constants`]. Values are validated after the geo override is
//! merged, see [`validation::validate_config`].

pub mod builder;
pub mod loading;
pub mod validation;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::common::constants::*;
use crate::geo::Place;

pub use builder::{create_default_config, update_place};
pub use loading::{get_config_path, get_geo_path, load, load_from_path};

/// Coordinates kept apart from the main configuration file.
#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct GeoConfig {
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
    pub(crate) altitude: Option<f64>,
}

/// Settings loaded from `suncompass.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>, // meters
    /// IANA timezone for displayed times. Absent means the system local zone.
    pub timezone: Option<String>,
    pub overlap_threshold: Option<f64>, // degrees
    pub refresh_interval: Option<u64>,  // seconds, watch mode
    pub heading_alpha: Option<f64>,
    pub heading_quantum: Option<f64>,     // degrees
    pub animation_duration: Option<f64>,  // seconds
}

impl Config {
    pub fn place(&self) -> Place {
        Place::new(
            self.latitude.unwrap_or(DEFAULT_LATITUDE),
            self.longitude.unwrap_or(DEFAULT_LONGITUDE),
            self.altitude.unwrap_or(DEFAULT_ALTITUDE),
        )
    }

    /// Parsed display timezone. Invalid names are rejected by validation.
    pub fn timezone(&self) -> Option<Tz> {
        self.timezone.as_deref().and_then(|name| name.parse().ok())
    }

    pub fn overlap_threshold(&self) -> f64 {
        self.overlap_threshold.unwrap_or(DEFAULT_OVERLAP_THRESHOLD)
    }

    pub fn refresh_interval(&self) -> u64 {
        self.refresh_interval.unwrap_or(DEFAULT_REFRESH_INTERVAL)
    }

    pub fn heading_alpha(&self) -> f64 {
        self.heading_alpha.unwrap_or(DEFAULT_HEADING_ALPHA)
    }

    pub fn heading_quantum(&self) -> f64 {
        self.heading_quantum.unwrap_or(DEFAULT_HEADING_QUANTUM)
    }

    pub fn animation_duration(&self) -> f64 {
        self.animation_duration
            .unwrap_or(DEFAULT_ANIMATION_DURATION)
    }

    pub fn log_config(&self, source: &str) {
        log_block_start!("Loaded configuration from {}", source);
        log_indented!("Location: {}", self.place());
        match &self.timezone {
            Some(zone) => log_indented!("Timezone: {zone}"),
            None => log_indented!("Timezone: system local"),
        }
        log_indented!("Overlap threshold: {}°", self.overlap_threshold());
        log_indented!(
            "Heading filter: alpha {} @ {}° steps",
            self.heading_alpha(),
            self.heading_quantum()
        );

        let duration = self.animation_duration();
        if duration > 0.0 {
            let label = if duration == 1.0 { "second" } else { "seconds" };
            log_indented!("Rotation duration: {} {}", duration, label);
        } else {
            log_indented!("Rotation duration: instant");
        }
    }
}
