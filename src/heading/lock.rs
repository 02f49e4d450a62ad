//! Lock/unlock state machine of the compass display.
//!
//! [`CompassController`] is a pure state machine: every input returns the list
//! of [`Effect`]s the owner must carry out (sensor subscription changes,
//! rotations, redraws, preference writes). It never performs I/O itself.
//!
//! ```text
//!            unlock                 first sample             animation ends
//!  LOCKED ───────────▶ UNLOCK_PENDING ───────────▶ UNLOCKING ───────────────▶ UNLOCKED
//!    ▲                      │                          │                         │
//!    └──────────────────────┴───────── lock ───────────┴─────────────────────────┘
//! ```
//!
//! While LOCKED or UNLOCKING, samples only warm the filter. While UNLOCKED each
//! sample that changes the quantized heading redraws the display. Unlocking
//! clears the filter, so the first live sample seeds it at the angle the unlock
//! rotation targets.

use serde::Serialize;
use std::fmt;

use super::filter::HeadingFilter;
use crate::common::constants::{NORTH_UP_HEADING, SOUTH_UP_HEADING};
use crate::error::SensorError;
use crate::geo::{arc, normalize_degrees};
use crate::state::Preferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompassLockState {
    Locked,
    UnlockPending,
    Unlocking,
    Unlocked,
}

impl CompassLockState {
    /// Whether the orientation sensor should be subscribed in this state.
    pub fn wants_sensor(self) -> bool {
        !matches!(self, Self::Locked)
    }
}

impl fmt::Display for CompassLockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Locked => "LOCKED",
            Self::UnlockPending => "UNLOCK_PENDING",
            Self::Unlocking => "UNLOCKING",
            Self::Unlocked => "UNLOCKED",
        };
        f.write_str(name)
    }
}

/// An animated shortest-path rotation of the display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rotation {
    pub id: u64,
    pub from: f64,
    pub to: f64,
    /// Signed shortest rotation from `from` to `to`, in `(-180, 180]`.
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Subscribe,
    Unsubscribe,
    /// Drop the current subscription and subscribe again.
    Resubscribe,
    Animate(Rotation),
    CancelAnimation,
    SetHeading(f64),
    /// The sensor is unusable; the session fell back to locked.
    Degraded(String),
    PersistPreferences(Preferences),
}

#[derive(Debug, Clone)]
pub struct CompassController {
    state: CompassLockState,
    preferences: Preferences,
    filter: HeadingFilter,
    displayed: f64,
    /// Angle currently drawn, trailing `displayed` while a rotation plays.
    on_screen: f64,
    next_animation_id: u64,
    running_animation: Option<u64>,
    unlock_animation: Option<u64>,
    degraded_reported: bool,
}

impl CompassController {
    pub fn new(preferences: Preferences, filter: HeadingFilter) -> Self {
        let state = if preferences.locked {
            CompassLockState::Locked
        } else {
            CompassLockState::Unlocked
        };

        let displayed = locked_heading(&preferences);
        Self {
            state,
            preferences,
            filter,
            displayed,
            on_screen: displayed,
            next_animation_id: 1,
            running_animation: None,
            unlock_animation: None,
            degraded_reported: false,
        }
    }

    pub fn state(&self) -> CompassLockState {
        self.state
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    /// Angle the display shows, or will show once the running rotation ends.
    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn filter(&self) -> &HeadingFilter {
        &self.filter
    }

    /// Effects that bring a fresh display in line with the initial state.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::SetHeading(self.displayed)];
        if self.state.wants_sensor() {
            effects.push(Effect::Subscribe);
        }
        effects
    }

    pub fn lock(&mut self) -> Vec<Effect> {
        if self.state == CompassLockState::Locked {
            return Vec::new();
        }

        self.preferences.locked = true;
        let mut effects = self.fall_back_to_locked();
        effects.push(Effect::PersistPreferences(self.preferences));
        effects
    }

    pub fn unlock(&mut self) -> Vec<Effect> {
        if self.state != CompassLockState::Locked {
            return Vec::new();
        }

        self.preferences.locked = false;
        self.state = CompassLockState::UnlockPending;
        self.filter.reset();
        vec![
            Effect::Subscribe,
            Effect::PersistPreferences(self.preferences),
        ]
    }

    /// Switch between north-up (0°) and south-up (180°) for the locked display.
    pub fn set_south_at_top(&mut self, south_at_top: bool) -> Vec<Effect> {
        if self.preferences.south_at_top == south_at_top {
            return Vec::new();
        }

        self.preferences.south_at_top = south_at_top;
        let mut effects = Vec::new();
        if self.state == CompassLockState::Locked {
            effects.push(self.rotate_to(locked_heading(&self.preferences)));
        }
        effects.push(Effect::PersistPreferences(self.preferences));
        effects
    }

    /// Apply a raw heading sample in arrival order.
    pub fn sample(&mut self, raw: f64) -> Vec<Effect> {
        if self.filter.push(raw).is_none() {
            return Vec::new();
        }

        match self.state {
            CompassLockState::Locked | CompassLockState::Unlocking => Vec::new(),
            CompassLockState::UnlockPending => {
                self.state = CompassLockState::Unlocking;
                let rotation = self.rotate_to(normalize_degrees(raw));
                if let Effect::Animate(r) = &rotation {
                    self.unlock_animation = Some(r.id);
                }
                vec![rotation]
            }
            CompassLockState::Unlocked => self.follow_filter(),
        }
    }

    /// A rotation drew an intermediate angle.
    pub fn animation_frame(&mut self, id: u64, angle: f64) {
        if self.running_animation == Some(id) {
            self.on_screen = normalize_degrees(angle);
        }
    }

    /// A rotation reached its target.
    pub fn animation_finished(&mut self, id: u64, at: f64) -> Vec<Effect> {
        self.animation_ended(id, at)
    }

    /// A rotation was stopped at `at` before reaching its target.
    pub fn animation_cancelled(&mut self, id: u64, at: f64) -> Vec<Effect> {
        self.animation_ended(id, at)
    }

    pub fn sensor_error(&mut self, error: &SensorError) -> Vec<Effect> {
        match error {
            SensorError::Transient(_) if self.state.wants_sensor() => vec![Effect::Resubscribe],
            SensorError::Transient(_) => Vec::new(),
            SensorError::Unavailable(reason) => {
                let mut effects = Vec::new();
                if !self.degraded_reported {
                    self.degraded_reported = true;
                    effects.push(Effect::Degraded(reason.clone()));
                }
                if self.state != CompassLockState::Locked {
                    effects.extend(self.fall_back_to_locked());
                }
                effects
            }
        }
    }

    fn animation_ended(&mut self, id: u64, at: f64) -> Vec<Effect> {
        if self.running_animation == Some(id) {
            self.running_animation = None;
            self.on_screen = normalize_degrees(at);
        }
        if self.unlock_animation != Some(id) {
            return Vec::new();
        }

        self.unlock_animation = None;
        self.displayed = normalize_degrees(at);
        if self.state != CompassLockState::Unlocking {
            return Vec::new();
        }

        self.state = CompassLockState::Unlocked;
        self.follow_filter()
    }

    fn fall_back_to_locked(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state == CompassLockState::Unlocking {
            effects.push(Effect::CancelAnimation);
        }
        self.unlock_animation = None;
        if self.state.wants_sensor() {
            effects.push(Effect::Unsubscribe);
        }
        self.state = CompassLockState::Locked;
        effects.push(self.rotate_to(locked_heading(&self.preferences)));
        effects
    }

    fn follow_filter(&mut self) -> Vec<Effect> {
        match self.filter.quantized() {
            Some(heading) if heading != self.displayed => {
                self.displayed = heading;
                self.on_screen = heading;
                vec![Effect::SetHeading(heading)]
            }
            _ => Vec::new(),
        }
    }

    fn rotate_to(&mut self, target: f64) -> Effect {
        let id = self.next_animation_id;
        self.next_animation_id += 1;

        let rotation = Rotation {
            id,
            from: self.on_screen,
            to: target,
            delta: arc(self.on_screen, target),
        };
        self.displayed = target;
        self.running_animation = Some(id);
        Effect::Animate(rotation)
    }
}

/// Fixed heading of the locked display.
pub fn locked_heading(preferences: &Preferences) -> f64 {
    if preferences.south_at_top {
        SOUTH_UP_HEADING
    } else {
        NORTH_UP_HEADING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(locked: bool) -> CompassController {
        CompassController::new(
            Preferences {
                locked,
                south_at_top: false,
            },
            HeadingFilter::new(0.15, 0.5),
        )
    }

    fn rotation_of(effects: &[Effect]) -> Rotation {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Animate(r) => Some(*r),
                _ => None,
            })
            .expect("no rotation")
    }

    #[test]
    fn test_initial_state_follows_preference() {
        assert_eq!(controller(true).state(), CompassLockState::Locked);
        assert_eq!(controller(false).state(), CompassLockState::Unlocked);

        assert_eq!(controller(true).start(), vec![Effect::SetHeading(0.0)]);
        assert_eq!(
            controller(false).start(),
            vec![Effect::SetHeading(0.0), Effect::Subscribe]
        );
    }

    #[test]
    fn test_unlock_path() {
        let mut c = controller(true);

        let effects = c.unlock();
        assert_eq!(c.state(), CompassLockState::UnlockPending);
        assert_eq!(effects[0], Effect::Subscribe);
        assert!(matches!(effects[1], Effect::PersistPreferences(p) if !p.locked));

        let effects = c.sample(300.0);
        assert_eq!(c.state(), CompassLockState::Unlocking);
        let rotation = rotation_of(&effects);
        assert_eq!(rotation.from, 0.0);
        assert_eq!(rotation.to, 300.0);
        assert_eq!(rotation.delta, -60.0);

        // Gated while the rotation plays
        assert!(c.sample(310.0).is_empty());
        assert_eq!(c.state(), CompassLockState::Unlocking);

        c.animation_finished(rotation.id, 300.0);
        assert_eq!(c.state(), CompassLockState::Unlocked);
    }

    #[test]
    fn test_catch_up_after_unlock_animation() {
        let mut c = controller(true);
        c.unlock();
        let rotation = rotation_of(&c.sample(300.0));
        c.sample(310.0);

        // Filter moved to 301.5 during the rotation
        let effects = c.animation_finished(rotation.id, 300.0);
        assert_eq!(effects, vec![Effect::SetHeading(301.5)]);
    }

    #[test]
    fn test_cancelled_unlock_animation_still_unlocks() {
        let mut c = controller(true);
        c.unlock();
        let rotation = rotation_of(&c.sample(90.0));

        c.animation_cancelled(rotation.id, 40.0);
        assert_eq!(c.state(), CompassLockState::Unlocked);
    }

    #[test]
    fn test_relock_during_unlocking_ends_locked() {
        let mut c = controller(true);
        c.unlock();
        let rotation = rotation_of(&c.sample(90.0));
        c.animation_frame(rotation.id, 70.0);

        let effects = c.lock();
        assert_eq!(c.state(), CompassLockState::Locked);
        assert_eq!(effects[0], Effect::CancelAnimation);
        assert_eq!(effects[1], Effect::Unsubscribe);
        let back = rotation_of(&effects);
        assert_eq!(back.from, 70.0);
        assert_eq!(back.to, 0.0);
        assert!(matches!(effects.last(), Some(Effect::PersistPreferences(p)) if p.locked));

        // The cancellation notice of the old rotation arrives late
        assert!(c.animation_cancelled(rotation.id, 45.0).is_empty());
        assert_eq!(c.state(), CompassLockState::Locked);
    }

    #[test]
    fn test_stale_lock_rotation_does_not_finish_unlock() {
        let mut c = controller(false);
        let back = rotation_of(&c.lock());
        c.unlock();
        c.sample(120.0);

        assert!(c.animation_finished(back.id, 0.0).is_empty());
        assert_eq!(c.state(), CompassLockState::Unlocking);
    }

    #[test]
    fn test_relock_then_unlock_follows_the_new_heading() {
        let mut c = controller(false);
        c.sample(50.0);
        let back = rotation_of(&c.lock());
        c.animation_finished(back.id, 0.0);

        c.unlock();
        let rotation = rotation_of(&c.sample(300.0));
        assert_eq!(rotation.to, 300.0);

        assert!(c.animation_finished(rotation.id, 300.0).is_empty());
        assert_eq!(c.state(), CompassLockState::Unlocked);
        assert_eq!(c.displayed(), 300.0);

        // Smoothing continues from the unlock target
        assert_eq!(c.sample(310.0), vec![Effect::SetHeading(301.5)]);
    }

    #[test]
    fn test_rotation_starts_from_the_angle_on_screen() {
        let mut c = controller(false);
        c.sample(100.0);
        let back = rotation_of(&c.lock());
        assert_eq!((back.from, back.to), (100.0, 0.0));

        // Unlock while the lock rotation is still on its way to north
        c.animation_frame(back.id, 60.0);
        c.unlock();
        let rotation = rotation_of(&c.sample(200.0));
        assert_eq!(rotation.from, 60.0);
        assert_eq!(rotation.delta, 140.0);

        // The superseded rotation no longer moves the on-screen angle
        c.animation_frame(back.id, 30.0);
        let effects = c.lock();
        assert_eq!(rotation_of(&effects).from, 60.0);
    }

    #[test]
    fn test_unlocked_samples_redraw_on_quantum_change() {
        let mut c = controller(false);
        assert_eq!(c.sample(100.0), vec![Effect::SetHeading(100.0)]);
        // 100 + 0.15 * 1 = 100.15 quantizes back to 100.0
        assert!(c.sample(101.0).is_empty());
        assert_eq!(c.sample(110.0), vec![Effect::SetHeading(101.5)]);
    }

    #[test]
    fn test_locked_samples_keep_filter_warm() {
        let mut c = controller(true);
        assert!(c.sample(50.0).is_empty());
        assert_eq!(c.filter().smoothed(), Some(50.0));
        assert_eq!(c.displayed(), 0.0);
    }

    #[test]
    fn test_south_toggle_rotates_locked_display() {
        let mut c = controller(true);
        let effects = c.set_south_at_top(true);
        let rotation = rotation_of(&effects);
        assert_eq!(rotation.to, 180.0);
        assert_eq!(rotation.delta, 180.0);
        assert!(c.set_south_at_top(true).is_empty());
    }

    #[test]
    fn test_unavailable_sensor_degrades_once() {
        let mut c = controller(true);
        c.unlock();

        let error = SensorError::Unavailable("permission denied".into());
        let effects = c.sensor_error(&error);
        assert_eq!(effects[0], Effect::Degraded("permission denied".into()));
        assert!(effects.contains(&Effect::Unsubscribe));
        assert_eq!(c.state(), CompassLockState::Locked);

        c.unlock();
        let effects = c.sensor_error(&error);
        assert!(!effects.iter().any(|e| matches!(e, Effect::Degraded(_))));
        assert_eq!(c.state(), CompassLockState::Locked);
    }

    #[test]
    fn test_transient_error_resubscribes_only_when_subscribed() {
        let error = SensorError::Transient("glitch".into());
        assert!(controller(true).sensor_error(&error).is_empty());
        assert_eq!(
            controller(false).sensor_error(&error),
            vec![Effect::Resubscribe]
        );
    }

    #[test]
    fn test_non_finite_sample_is_ignored() {
        let mut c = controller(true);
        c.unlock();
        assert!(c.sample(f64::NAN).is_empty());
        assert_eq!(c.state(), CompassLockState::UnlockPending);
    }
}
