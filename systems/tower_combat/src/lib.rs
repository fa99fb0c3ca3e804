#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick firing state machine that tracks a target and respects cooldowns.
//!
//! A [`FireControl`] is either unlocked (no valid target) or locked onto a
//! target. Cooldown is not a separate state; it is a timer that accumulates
//! every tick and is checked while locked. The held target is a [`Weak`]
//! reference so the machine never keeps an enemy alive and never observes a
//! destroyed one.

use std::{
    fmt,
    sync::{Arc, Weak},
    time::Duration,
};

use tracing::debug;
use turret_defence_core::{Enemy, WorldPoint};
use turret_defence_system_tower_targeting::TargetAcquisition;

/// Static parameters of the tower evaluated during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Engagement {
    /// Position the tower measures range and bearing from.
    pub origin: WorldPoint,
    /// Per-axis engagement range.
    pub range: f32,
    /// Minimum time that must elapse between two shots.
    pub firing_period: Duration,
}

/// Summary of the decisions taken during a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// A roster scan ran during this tick.
    pub scanned: bool,
    /// The scan produced a new target.
    pub acquired: bool,
    /// The fire action was invoked.
    pub fired: bool,
    /// The "has target" flag was cleared at the end of the tick.
    pub released: bool,
}

/// Targeting and cooldown state owned by a single tower.
pub struct FireControl<E> {
    target: Option<Weak<E>>,
    locked: bool,
    since_last_shot: Duration,
    facing_degrees: f32,
}

impl<E> Default for FireControl<E> {
    fn default() -> Self {
        Self {
            target: None,
            locked: false,
            since_last_shot: Duration::ZERO,
            facing_degrees: 0.0,
        }
    }
}

impl<E> fmt::Debug for FireControl<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FireControl")
            .field("holds_reference", &self.target.is_some())
            .field("locked", &self.locked)
            .field("since_last_shot", &self.since_last_shot)
            .field("facing_degrees", &self.facing_degrees)
            .finish()
    }
}

impl<E: Enemy> FireControl<E> {
    /// Creates an unlocked fire control with a zeroed cooldown timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether a valid target is currently held.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Resolves the held target reference, if it still exists.
    ///
    /// The reference outlives the "has target" flag by up to one tick: once
    /// the target stops being alive the flag is cleared but the reference is
    /// only replaced by the next acquisition.
    #[must_use]
    pub fn target(&self) -> Option<Arc<E>> {
        self.target.as_ref().and_then(Weak::upgrade)
    }

    /// Time accumulated since the last shot.
    #[must_use]
    pub const fn since_last_shot(&self) -> Duration {
        self.since_last_shot
    }

    /// Facing angle in degrees, offset so that zero points "up".
    #[must_use]
    pub const fn facing_degrees(&self) -> f32 {
        self.facing_degrees
    }

    /// Runs one tick of the state machine.
    ///
    /// `roster` is only invoked when a scan is required, so callers can hand
    /// over the most recently published roster lazily. `fire` is invoked at
    /// most once per tick and only while locked onto a live target.
    pub fn step<R, F>(
        &mut self,
        engagement: Engagement,
        dt: Duration,
        roster: R,
        mut fire: F,
    ) -> TickReport
    where
        R: FnOnce() -> Arc<[Arc<E>]>,
        F: FnMut(&Arc<E>),
    {
        let mut report = TickReport::default();

        match self.target() {
            Some(target) if self.locked && target.health() >= 0.0 => {
                self.facing_degrees = engagement.origin.bearing_degrees(target.position());
                if self.since_last_shot > engagement.firing_period {
                    debug!(
                        facing = self.facing_degrees,
                        waited = ?self.since_last_shot,
                        "firing at held target"
                    );
                    fire(&target);
                    self.since_last_shot = Duration::ZERO;
                    report.fired = true;
                }
            }
            _ => {
                report.scanned = true;
                let roster = roster();
                let policy = TargetAcquisition::new(engagement.origin, engagement.range);
                let selected = policy.select(roster.iter());
                self.target = selected.map(Arc::downgrade);
                if selected.is_some() {
                    debug!(candidates = roster.len(), "target acquired");
                    self.locked = true;
                    report.acquired = true;
                }
            }
        }

        let still_alive = self.target().is_some_and(|target| target.is_alive());
        if !still_alive && self.locked {
            debug!("target lost");
            self.locked = false;
            report.released = true;
        }

        self.since_last_shot += dt;
        report
    }
}
