//! Typed errors of the solar and heading core.
//!
//! The core distinguishes environment failures (the ephemeris or a sensor is
//! unavailable) from internal invariant violations (a bug in the windowing
//! logic). Commands wrap both in `anyhow` with context.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure of the ephemeris capability itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("invalid place: latitude {latitude}, longitude {longitude}")]
    InvalidPlace { latitude: f64, longitude: f64 },

    #[error("ephemeris computation failed: {0}")]
    Computation(String),
}

/// Failure of a solar event query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolarError {
    /// The ephemeris capability failed; propagated, never defaulted.
    #[error(transparent)]
    Adapter(#[from] EphemerisError),

    /// The forward window produced no event at all.
    #[error("no solar events found in the window starting {start}")]
    EmptyWindow { start: DateTime<Utc> },

    /// An invariant the algorithm guarantees did not hold.
    #[error("data integrity violation: {0}")]
    Integrity(String),
}

impl SolarError {
    /// True for invariant violations, which indicate a bug rather than an
    /// environment problem.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

/// Failure of the orientation sensor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensorError {
    /// Permission denied or no hardware: the session degrades to locked.
    #[error("orientation sensor unavailable: {0}")]
    Unavailable(String),

    /// A passing fault; handled by resubscribing.
    #[error("transient orientation sensor error: {0}")]
    Transient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_is_distinct_from_adapter_failure() {
        let adapter: SolarError = EphemerisError::Computation("boom".into()).into();
        assert!(!adapter.is_integrity_violation());
        assert_eq!(adapter.to_string(), "ephemeris computation failed: boom");

        let integrity = SolarError::Integrity("no preceding event".into());
        assert!(integrity.is_integrity_violation());
    }
}
