//! Compass display session actor.
//!
//! The session owns the lock controller, the sensor subscription, the running
//! animation, the display sink and the preference store. Everything that can
//! change compass state arrives as a [`SessionInput`] on one channel and is
//! applied on the session thread in arrival order, which keeps the heading
//! filter's "previous" reference consistent.
//!
//! The sensor subscription and the animation handle are dropped on every exit
//! path of [`CompassSession::run`], releasing the sensor.

use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::time::Duration;

use super::HeadingSettings;
use super::animation::{AnimationHandle, Animator};
use super::filter::HeadingFilter;
use super::lock::{CompassController, CompassLockState, Effect};
use super::sensor::{OrientationSensor, SensorSubscription};
use crate::error::SensorError;
use crate::state::PreferenceStore;

/// How often a running session checks its external stop flag.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    /// Raw device heading in degrees.
    Sample(f64),
    Lock,
    Unlock,
    SetSouthAtTop(bool),
    AnimationFrame { id: u64, angle: f64 },
    AnimationFinished { id: u64, at: f64 },
    AnimationCancelled { id: u64, at: f64 },
    SensorFailed(SensorError),
    Shutdown,
}

/// Where the session draws.
pub trait CompassDisplay: Send {
    fn show_heading(&mut self, heading: f64);
    fn show_state(&mut self, state: CompassLockState);
    fn show_degraded(&mut self, reason: &str);
}

pub struct CompassSession {
    controller: CompassController,
    sensor: Box<dyn OrientationSensor>,
    subscription: Option<SensorSubscription>,
    animator: Box<dyn Animator>,
    animation: Option<AnimationHandle>,
    display: Box<dyn CompassDisplay>,
    store: Box<dyn PreferenceStore>,
    tx: Sender<SessionInput>,
    rx: Receiver<SessionInput>,
}

impl CompassSession {
    /// Create a session, reading the initial preferences from `store`.
    pub fn new(
        settings: HeadingSettings,
        sensor: Box<dyn OrientationSensor>,
        animator: Box<dyn Animator>,
        display: Box<dyn CompassDisplay>,
        store: Box<dyn PreferenceStore>,
    ) -> Result<Self> {
        let preferences = store.load()?;
        let filter = HeadingFilter::new(settings.alpha, settings.quantum);
        let (tx, rx) = channel();

        Ok(Self {
            controller: CompassController::new(preferences, filter),
            sensor,
            subscription: None,
            animator,
            animation: None,
            display,
            store,
            tx,
            rx,
        })
    }

    /// Sender for user actions and sensor samples.
    pub fn sender(&self) -> Sender<SessionInput> {
        self.tx.clone()
    }

    pub fn state(&self) -> CompassLockState {
        self.controller.state()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn displayed(&self) -> f64 {
        self.controller.displayed()
    }

    /// Draw the initial state and acquire the sensor if the session starts unlocked.
    pub fn start(&mut self) {
        self.display.show_state(self.controller.state());
        let effects = self.controller.start();
        self.apply(effects);
    }

    /// Process inputs until `Shutdown`, a closed channel, or `running` turning false.
    pub fn run(mut self, running: &AtomicBool) {
        self.start();

        while running.load(Ordering::SeqCst) {
            match self.rx.recv_timeout(STOP_POLL_INTERVAL) {
                Ok(input) => {
                    if !self.handle(input) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.stop();
    }

    /// Apply every input already queued, without blocking.
    pub fn drain(&mut self) {
        while let Ok(input) = self.rx.try_recv() {
            if !self.handle(input) {
                break;
            }
        }
    }

    /// Apply one input. Returns false when the session should stop.
    pub fn handle(&mut self, input: SessionInput) -> bool {
        let before = self.controller.state();

        let effects = match input {
            SessionInput::Sample(raw) => self.controller.sample(raw),
            SessionInput::Lock => self.controller.lock(),
            SessionInput::Unlock => self.controller.unlock(),
            SessionInput::SetSouthAtTop(south) => self.controller.set_south_at_top(south),
            SessionInput::AnimationFrame { id, angle } => {
                if self.animation.as_ref().is_some_and(|a| a.id() == id) {
                    self.display.show_heading(angle);
                }
                self.controller.animation_frame(id, angle);
                Vec::new()
            }
            SessionInput::AnimationFinished { id, at } => {
                self.release_animation(id, at);
                self.controller.animation_finished(id, at)
            }
            SessionInput::AnimationCancelled { id, at } => {
                self.release_animation(id, at);
                self.controller.animation_cancelled(id, at)
            }
            SessionInput::SensorFailed(error) => self.controller.sensor_error(&error),
            SessionInput::Shutdown => return false,
        };

        self.apply(effects);

        let after = self.controller.state();
        if after != before {
            log_debug!("Compass {before} -> {after}");
            self.display.show_state(after);
        }
        true
    }

    /// Release the sensor and stop any running rotation.
    pub fn stop(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.cancel_and_join();
        }
        self.subscription = None;
    }

    fn release_animation(&mut self, id: u64, at: f64) {
        if self.animation.as_ref().is_some_and(|a| a.id() == id) {
            self.animation = None;
            self.display.show_heading(at);
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Subscribe => {
                    if self.subscription.is_none()
                        && let Err(error) = self.subscribe()
                    {
                        queue.extend(self.controller.sensor_error(&error));
                    }
                }
                Effect::Unsubscribe => {
                    self.subscription = None;
                }
                Effect::Resubscribe => {
                    self.subscription = None;
                    if let Err(error) = self.subscribe() {
                        queue.extend(self.controller.sensor_error(&error));
                    }
                }
                Effect::Animate(rotation) => {
                    if let Some(previous) = self.animation.take() {
                        previous.cancel();
                    }
                    let handle = self.animator.start(rotation, self.tx.clone());
                    self.animation = Some(handle);
                }
                Effect::CancelAnimation => {
                    if let Some(animation) = &self.animation {
                        animation.cancel();
                    }
                }
                Effect::SetHeading(heading) => self.display.show_heading(heading),
                Effect::Degraded(reason) => {
                    log_warning!("Orientation sensor unavailable, compass locked: {reason}");
                    self.display.show_degraded(&reason);
                }
                Effect::PersistPreferences(preferences) => {
                    if let Err(e) = self.store.save(&preferences) {
                        log_warning!("Failed to save compass preferences: {e}");
                    }
                }
            }
        }
    }

    fn subscribe(&mut self) -> Result<(), SensorError> {
        let subscription = self.sensor.subscribe(self.tx.clone())?;
        self.subscription = Some(subscription);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::sensor::{ManualSensor, MockOrientationSensor, SensorFeed};
    use crate::heading::lock::Rotation;
    use crate::state::{MemoryPreferenceStore, Preferences};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Drawn {
        Heading(f64),
        State(CompassLockState),
        Degraded(String),
    }

    #[derive(Clone, Default)]
    struct RecordingDisplay {
        drawn: Arc<Mutex<Vec<Drawn>>>,
    }

    impl RecordingDisplay {
        fn take(&self) -> Vec<Drawn> {
            std::mem::take(&mut *self.drawn.lock().unwrap())
        }
    }

    impl CompassDisplay for RecordingDisplay {
        fn show_heading(&mut self, heading: f64) {
            self.drawn.lock().unwrap().push(Drawn::Heading(heading));
        }

        fn show_state(&mut self, state: CompassLockState) {
            self.drawn.lock().unwrap().push(Drawn::State(state));
        }

        fn show_degraded(&mut self, reason: &str) {
            self.drawn
                .lock()
                .unwrap()
                .push(Drawn::Degraded(reason.to_string()));
        }
    }

    /// Records rotations; the test decides when they end.
    #[derive(Clone, Default)]
    struct ManualAnimator {
        started: Arc<Mutex<Vec<Rotation>>>,
    }

    impl Animator for ManualAnimator {
        fn start(&mut self, rotation: Rotation, _sink: Sender<SessionInput>) -> AnimationHandle {
            self.started.lock().unwrap().push(rotation);
            AnimationHandle::new(rotation.id, Arc::new(AtomicBool::new(false)), None)
        }
    }

    struct Fixture {
        session: CompassSession,
        feed: SensorFeed,
        display: RecordingDisplay,
        animator: ManualAnimator,
        store: MemoryPreferenceStore,
    }

    fn settings() -> HeadingSettings {
        HeadingSettings {
            alpha: 0.15,
            quantum: 0.5,
            animation_duration: Duration::ZERO,
        }
    }

    fn fixture(locked: bool) -> Fixture {
        let sensor = ManualSensor::new();
        let feed = sensor.feed();
        let display = RecordingDisplay::default();
        let animator = ManualAnimator::default();
        let store = MemoryPreferenceStore::new(Preferences {
            locked,
            south_at_top: false,
        });

        let mut session = CompassSession::new(
            settings(),
            Box::new(sensor),
            Box::new(animator.clone()),
            Box::new(display.clone()),
            Box::new(store.clone()),
        )
        .unwrap();
        session.start();

        Fixture {
            session,
            feed,
            display,
            animator,
            store,
        }
    }

    fn last_rotation(animator: &ManualAnimator) -> Rotation {
        *animator.started.lock().unwrap().last().unwrap()
    }

    #[test]
    fn test_locked_session_does_not_hold_the_sensor() {
        let f = fixture(true);
        assert_eq!(f.session.state(), CompassLockState::Locked);
        assert!(!f.session.is_subscribed());
        assert!(!f.feed.is_subscribed());
        assert_eq!(
            f.display.take(),
            vec![Drawn::State(CompassLockState::Locked), Drawn::Heading(0.0)]
        );
    }

    #[test]
    fn test_full_unlock_and_relock_cycle() {
        let mut f = fixture(true);
        f.display.take();

        f.session.handle(SessionInput::Unlock);
        assert_eq!(f.session.state(), CompassLockState::UnlockPending);
        assert!(f.feed.is_subscribed());
        assert!(!f.store.current().locked);

        assert!(f.feed.push(270.0));
        f.session.drain();
        assert_eq!(f.session.state(), CompassLockState::Unlocking);
        let rotation = last_rotation(&f.animator);
        assert_eq!((rotation.from, rotation.to, rotation.delta), (0.0, 270.0, -90.0));

        f.session.handle(SessionInput::AnimationFinished {
            id: rotation.id,
            at: 270.0,
        });
        assert_eq!(f.session.state(), CompassLockState::Unlocked);

        f.display.take();
        f.feed.push(280.0);
        f.session.drain();
        assert_eq!(f.display.take(), vec![Drawn::Heading(271.5)]);

        f.session.handle(SessionInput::Lock);
        assert_eq!(f.session.state(), CompassLockState::Locked);
        assert!(!f.feed.is_subscribed());
        assert!(f.store.current().locked);
        assert_eq!(last_rotation(&f.animator).to, 0.0);
    }

    #[test]
    fn test_relock_while_unlocking_cancels_and_stays_locked() {
        let mut f = fixture(true);
        f.session.handle(SessionInput::Unlock);
        f.feed.push(90.0);
        f.session.drain();
        let unlock = last_rotation(&f.animator);

        f.session.handle(SessionInput::Lock);
        f.session.handle(SessionInput::AnimationCancelled {
            id: unlock.id,
            at: 30.0,
        });

        assert_eq!(f.session.state(), CompassLockState::Locked);
        assert!(!f.session.is_subscribed());
    }

    #[test]
    fn test_unavailable_sensor_degrades_to_locked() {
        let display = RecordingDisplay::default();
        let mut sensor = MockOrientationSensor::new();
        sensor
            .expect_subscribe()
            .times(1)
            .returning(|_| Err(SensorError::Unavailable("permission denied".into())));

        let mut session = CompassSession::new(
            settings(),
            Box::new(sensor),
            Box::new(ManualAnimator::default()),
            Box::new(display.clone()),
            Box::new(MemoryPreferenceStore::default()),
        )
        .unwrap();
        session.start();
        session.handle(SessionInput::Unlock);

        assert_eq!(session.state(), CompassLockState::Locked);
        assert!(
            display
                .take()
                .contains(&Drawn::Degraded("permission denied".into()))
        );
    }

    #[test]
    fn test_transient_errors_resubscribe() {
        let mut sensor = MockOrientationSensor::new();
        sensor
            .expect_subscribe()
            .times(3)
            .returning(|_| Ok(SensorSubscription::new(|| {})));

        let mut session = CompassSession::new(
            settings(),
            Box::new(sensor),
            Box::new(ManualAnimator::default()),
            Box::new(RecordingDisplay::default()),
            Box::new(MemoryPreferenceStore::new(Preferences {
                locked: false,
                south_at_top: false,
            })),
        )
        .unwrap();
        session.start();

        let glitch = SensorError::Transient("glitch".into());
        session.handle(SessionInput::SensorFailed(glitch.clone()));
        session.handle(SessionInput::SensorFailed(glitch));

        assert_eq!(session.state(), CompassLockState::Unlocked);
        assert!(session.is_subscribed());
    }

    #[test]
    fn test_stale_frames_are_not_drawn() {
        let mut f = fixture(true);
        f.display.take();
        f.session.handle(SessionInput::AnimationFrame { id: 99, angle: 12.0 });
        assert!(f.display.take().is_empty());
    }

    #[test]
    fn test_shutdown_releases_sensor() {
        let f = fixture(false);
        assert!(f.feed.is_subscribed());

        let tx = f.session.sender();
        tx.send(SessionInput::Shutdown).unwrap();
        f.session.run(&AtomicBool::new(true));

        assert!(!f.feed.is_subscribed());
    }
}
