//! Application-wide constants.
//!
//! Window sizes for the event windowing engine, identity bucket sizing, heading
//! filter defaults, configuration ranges, and process exit codes.

use chrono::Duration;

// # Event windowing

/// Forward window searched for upcoming events, in hours.
///
/// Near the equinoxes consecutive same-type events can be more than 24 h apart,
/// and some types can be absent from a 24 h window but present in 36 h.
pub const FUTURE_LIMIT_HOURS: i64 = 36;

/// How far before the query instant the preceding window starts, in hours.
pub const PRECEDING_OFFSET_HOURS: i64 = 13;

/// Length of the preceding window, in hours. Must equal the offset plus one hour
/// of slack so the window always reaches past the query instant.
pub const PRECEDING_LIMIT_HOURS: i64 = 14;

pub fn future_limit() -> Duration {
    Duration::hours(FUTURE_LIMIT_HOURS)
}

pub fn preceding_offset() -> Duration {
    Duration::hours(PRECEDING_OFFSET_HOURS)
}

pub fn preceding_limit() -> Duration {
    Duration::hours(PRECEDING_LIMIT_HOURS)
}

/// Number of events in a complete series (1 preceding + 4 upcoming).
pub const SERIES_LEN: usize = 5;

// # Event identity

/// Weak id bucket width as a power of two: 2^14 s ≈ 4.55 h.
///
/// Smaller buckets lower the chance of two real events sharing an id but raise the
/// chance that recomputation jitter moves one event into a new bucket.
pub const WEAK_ID_BUCKET_BITS: u32 = 14;

// # Compass projection

/// NOON and NADIR azimuths closer than this are drawn with the later one inset.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 20.0;

/// Look-ahead used to decide whether the sun azimuth is increasing.
pub const SUN_MOTION_LOOKAHEAD_SECONDS: i64 = 60;

// # Heading filter

/// Exponential smoothing factor applied to each raw heading sample.
pub const DEFAULT_HEADING_ALPHA: f64 = 0.15;

/// Quantization step of the displayed heading, degrees.
pub const DEFAULT_HEADING_QUANTUM: f64 = 0.5;

/// Heading shown when locked with north at the top.
pub const NORTH_UP_HEADING: f64 = 0.0;

/// Heading shown when locked with south at the top.
pub const SOUTH_UP_HEADING: f64 = 180.0;

/// Duration of the lock/unlock rotation animation, seconds.
pub const DEFAULT_ANIMATION_DURATION: f64 = 0.4;

/// Frame interval of the rotation animation, milliseconds.
pub const ANIMATION_FRAME_MS: u64 = 16;

// # Configuration defaults and ranges

pub const DEFAULT_LATITUDE: f64 = 34.0;
pub const DEFAULT_LONGITUDE: f64 = -118.5;
pub const DEFAULT_ALTITUDE: f64 = 0.0;
pub const DEFAULT_REFRESH_INTERVAL: u64 = 60;

pub const MINIMUM_ALTITUDE: f64 = -500.0;
pub const MAXIMUM_ALTITUDE: f64 = 10_000.0;
pub const MAXIMUM_HEADING_QUANTUM: f64 = 45.0;
pub const MAXIMUM_ANIMATION_DURATION: f64 = 10.0;
pub const MINIMUM_REFRESH_INTERVAL: u64 = 1;
pub const MAXIMUM_REFRESH_INTERVAL: u64 = 3600;

pub const CONFIG_FILE_NAME: &str = "suncompass.toml";
pub const PREFERENCES_FILE_NAME: &str = "preferences.toml";
pub const APP_DIR_NAME: &str = "suncompass";

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
