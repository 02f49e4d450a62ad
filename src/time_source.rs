//! Time source abstraction for real and pinned time.
//!
//! Commands receive a [`Clock`] explicitly instead of reading the system time
//! directly. This lets `--at <RFC3339>` queries and tests evaluate the solar
//! schedule for an arbitrary instant without touching any global state.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Trait for abstracting "now".
pub trait Clock: Send + Sync {
    /// Get the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Whether this clock is pinned to a fixed instant.
    fn is_fixed(&self) -> bool {
        false
    }
}

/// Clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn is_fixed(&self) -> bool {
        true
    }
}

/// Build the clock for a command: pinned when `at` is given, system time otherwise.
pub fn clock_for(at: Option<DateTime<Utc>>) -> Arc<dyn Clock> {
    match at {
        Some(instant) => Arc::new(FixedClock::new(instant)),
        None => Arc::new(SystemClock),
    }
}

/// Parse an instant given on the command line.
///
/// Accepts RFC 3339 (`2020-05-09T02:30:15Z`, offsets allowed) and the
/// space-separated `YYYY-MM-DD HH:MM:SS` form, which is interpreted as UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    use chrono::NaiveDateTime;

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            format!("Invalid instant '{s}': {e}. Use RFC 3339 or YYYY-MM-DD HH:MM:SS (UTC)")
        })
}
