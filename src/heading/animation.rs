//! Animated display rotations.
//!
//! An [`Animator`] plays a [`Rotation`] and reports back through the session
//! channel: intermediate angles as `AnimationFrame`, then exactly one of
//! `AnimationFinished` or `AnimationCancelled`. The session stays the only
//! writer of display state; the animator never touches the display directly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::lock::Rotation;
use super::session::SessionInput;
use crate::common::constants::ANIMATION_FRAME_MS;
use crate::geo::normalize_degrees;

/// Handle of a running rotation. Dropping it cancels the rotation.
#[derive(Debug)]
pub struct AnimationHandle {
    id: u64,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl AnimationHandle {
    pub fn new(id: u64, cancel: Arc<AtomicBool>, worker: Option<JoinHandle<()>>) -> Self {
        Self { id, cancel, worker }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Request cancellation. The animator still posts `AnimationCancelled`.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Cancel and wait for the worker to exit.
    pub fn cancel_and_join(mut self) {
        self.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub trait Animator: Send {
    fn start(&mut self, rotation: Rotation, sink: Sender<SessionInput>) -> AnimationHandle;
}

/// Cubic ease-in-out over `t` in `[0, 1]`.
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Angle of `rotation` at eased progress `t`.
pub fn angle_at(rotation: &Rotation, t: f64) -> f64 {
    normalize_degrees(rotation.from + rotation.delta * ease_in_out(t))
}

/// Plays rotations on a worker thread at a fixed frame interval.
#[derive(Debug, Clone)]
pub struct ThreadAnimator {
    duration: Duration,
    frame: Duration,
}

impl ThreadAnimator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            frame: Duration::from_millis(ANIMATION_FRAME_MS),
        }
    }
}

impl Animator for ThreadAnimator {
    fn start(&mut self, rotation: Rotation, sink: Sender<SessionInput>) -> AnimationHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);
        let duration = self.duration;
        let frame = self.frame;

        let worker = thread::spawn(move || {
            let started = Instant::now();
            let mut angle = rotation.from;

            loop {
                if cancel_flag.load(Ordering::SeqCst) {
                    let _ = sink.send(SessionInput::AnimationCancelled {
                        id: rotation.id,
                        at: angle,
                    });
                    return;
                }

                let elapsed = started.elapsed();
                if elapsed >= duration {
                    break;
                }

                angle = angle_at(&rotation, elapsed.as_secs_f64() / duration.as_secs_f64());
                if sink
                    .send(SessionInput::AnimationFrame {
                        id: rotation.id,
                        angle,
                    })
                    .is_err()
                {
                    return;
                }
                thread::sleep(frame);
            }

            let _ = sink.send(SessionInput::AnimationFinished {
                id: rotation.id,
                at: rotation.to,
            });
        });

        AnimationHandle::new(rotation.id, cancel, Some(worker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn rotation(from: f64, to: f64) -> Rotation {
        Rotation {
            id: 7,
            from,
            to,
            delta: crate::geo::arc(from, to),
        }
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_angle_takes_the_short_way() {
        let r = rotation(350.0, 10.0);
        let mid = angle_at(&r, 0.5);
        assert!((mid - 0.0).abs() < 1e-9 || (mid - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let (tx, rx) = channel();
        let handle = ThreadAnimator::new(Duration::ZERO).start(rotation(0.0, 90.0), tx);

        match rx.recv().unwrap() {
            SessionInput::AnimationFinished { id, at } => {
                assert_eq!(id, 7);
                assert_eq!(at, 90.0);
            }
            other => panic!("unexpected input {other:?}"),
        }
        handle.cancel_and_join();
    }

    #[test]
    fn test_cancel_reports_cancellation() {
        let (tx, rx) = channel();
        let handle = ThreadAnimator::new(Duration::from_secs(30)).start(rotation(0.0, 90.0), tx);
        handle.cancel_and_join();

        let outcome = rx
            .iter()
            .find(|input| !matches!(input, SessionInput::AnimationFrame { .. }));
        assert!(matches!(
            outcome,
            Some(SessionInput::AnimationCancelled { id: 7, .. })
        ));
    }
}
