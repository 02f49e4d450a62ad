//! Orientation sensor capability.
//!
//! A sensor pushes raw heading samples into the session channel for as long as
//! the returned [`SensorSubscription`] is alive. Dropping the subscription
//! releases the sensor, so every exit path of the session (re-lock, error,
//! shutdown, panic unwinding) stops the sample stream.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use super::session::SessionInput;
use crate::error::SensorError;

/// Scoped sensor registration, released on drop.
pub struct SensorSubscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SensorSubscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for SensorSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for SensorSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorSubscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait OrientationSensor: Send {
    /// Start delivering samples into `sink` until the subscription is dropped.
    fn subscribe(&mut self, sink: Sender<SessionInput>) -> Result<SensorSubscription, SensorError>;
}

type SharedSink = Arc<Mutex<Option<Sender<SessionInput>>>>;

/// Sensor fed by hand through a [`SensorFeed`], e.g. from stdin.
#[derive(Debug, Clone, Default)]
pub struct ManualSensor {
    sink: SharedSink,
}

impl ManualSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer side of the sensor.
    pub fn feed(&self) -> SensorFeed {
        SensorFeed {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl OrientationSensor for ManualSensor {
    fn subscribe(&mut self, sink: Sender<SessionInput>) -> Result<SensorSubscription, SensorError> {
        let mut slot = self
            .sink
            .lock()
            .map_err(|_| SensorError::Unavailable("sensor state poisoned".into()))?;
        *slot = Some(sink);

        let shared = Arc::clone(&self.sink);
        Ok(SensorSubscription::new(move || {
            if let Ok(mut slot) = shared.lock() {
                *slot = None;
            }
        }))
    }
}

/// Pushes samples and faults into the session while a subscription is active.
#[derive(Debug, Clone)]
pub struct SensorFeed {
    sink: SharedSink,
}

impl SensorFeed {
    pub fn is_subscribed(&self) -> bool {
        self.sink.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Deliver a raw heading. Returns false when nobody is subscribed.
    pub fn push(&self, raw: f64) -> bool {
        self.send(SessionInput::Sample(raw))
    }

    /// Report a sensor fault to the subscriber.
    pub fn fail(&self, error: SensorError) -> bool {
        self.send(SessionInput::SensorFailed(error))
    }

    fn send(&self, input: SessionInput) -> bool {
        match self.sink.lock() {
            Ok(slot) => slot.as_ref().is_some_and(|tx| tx.send(input).is_ok()),
            Err(_) => false,
        }
    }
}

/// Sensor that is never available, for hosts without orientation hardware.
#[derive(Debug, Clone, Default)]
pub struct UnavailableSensor {
    reason: String,
}

impl UnavailableSensor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl OrientationSensor for UnavailableSensor {
    fn subscribe(&mut self, _sink: Sender<SessionInput>) -> Result<SensorSubscription, SensorError> {
        Err(SensorError::Unavailable(self.reason.clone()))
    }
}
