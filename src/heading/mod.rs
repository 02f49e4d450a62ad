//! Device heading pipeline of the compass display.
//!
//! Raw orientation samples are smoothed and quantized by [`filter`], gated by
//! the lock state machine in [`lock`], and applied by the single-consumer
//! [`session`] actor, which also owns the [`sensor`] subscription and the
//! [`animation`] of lock/unlock rotations.

pub mod animation;
pub mod filter;
pub mod lock;
pub mod sensor;
pub mod session;

pub use animation::{AnimationHandle, Animator, ThreadAnimator};
pub use filter::{HeadingFilter, quantize, smooth};
pub use lock::{CompassController, CompassLockState, Effect, Rotation};
pub use sensor::{ManualSensor, OrientationSensor, SensorFeed, SensorSubscription};
pub use session::{CompassDisplay, CompassSession, SessionInput};

use std::time::Duration;

use crate::config::Config;

/// Tuning of the heading pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSettings {
    /// Smoothing factor in `(0, 1]`; larger follows faster and jitters more.
    pub alpha: f64,
    /// Quantization step in degrees.
    pub quantum: f64,
    pub animation_duration: Duration,
}

impl HeadingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            alpha: config.heading_alpha(),
            quantum: config.heading_quantum(),
            animation_duration: Duration::from_secs_f64(config.animation_duration()),
        }
    }
}
