//! Tower weapon variants and the projectiles they launch.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use turret_defence_core::{Enemy, Projectile, WorldPoint};

use crate::projectiles::Projectiles;

/// Attack behaviour of a concrete tower variant.
///
/// Implementations only produce projectiles into the owning tower's
/// sequence; they must never mutate the target or the roster.
pub trait Weapon: fmt::Debug {
    /// Launches one volley from `muzzle` at `target`.
    fn fire(&mut self, muzzle: WorldPoint, target: &dyn Enemy, projectiles: &mut Projectiles);
}

/// Projectile that flies in a straight line until it has covered its reach.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shell {
    position: Vec2,
    velocity: Vec2,
    travel_left: f32,
}

impl Shell {
    /// Creates a shell leaving `from` in `direction` at `speed` world units
    /// per second.
    ///
    /// A zero direction or a speed that is not positive and finite produces
    /// a shell that is finished immediately.
    #[must_use]
    pub fn launch(from: WorldPoint, direction: Vec2, speed: f32, reach: f32) -> Self {
        let direction = direction.normalize_or_zero();
        let moving = direction != Vec2::ZERO && speed.is_finite() && speed > 0.0;
        let travel_left = if moving { reach } else { 0.0 };
        Self {
            position: to_vec2(from),
            velocity: direction * speed,
            travel_left,
        }
    }

    /// Velocity of the shell in world units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Distance the shell may still travel.
    #[must_use]
    pub const fn travel_left(&self) -> f32 {
        self.travel_left
    }
}

impl Projectile for Shell {
    fn advance(&mut self, dt: Duration) {
        if self.travel_left <= 0.0 {
            return;
        }

        let step = self.velocity * dt.as_secs_f32();
        let length = step.length();
        if length >= self.travel_left {
            self.position += step * (self.travel_left / length);
            self.travel_left = 0.0;
        } else {
            self.position += step;
            self.travel_left -= length;
        }
    }

    fn position(&self) -> WorldPoint {
        WorldPoint::new(self.position.x, self.position.y)
    }

    fn is_finished(&self) -> bool {
        self.travel_left <= 0.0
    }
}

/// Single-barrel weapon that fires one shell straight at the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cannon {
    speed: f32,
    reach: f32,
}

impl Cannon {
    /// Creates a cannon firing shells at `speed` that travel up to `reach`.
    ///
    /// Shells fired with a speed that is not positive never leave the muzzle
    /// and report themselves finished straight away.
    #[must_use]
    pub const fn new(speed: f32, reach: f32) -> Self {
        Self { speed, reach }
    }
}

impl Weapon for Cannon {
    fn fire(&mut self, muzzle: WorldPoint, target: &dyn Enemy, projectiles: &mut Projectiles) {
        let direction = to_vec2(target.position()) - to_vec2(muzzle);
        projectiles.push(Box::new(Shell::launch(
            muzzle,
            direction,
            self.speed,
            self.reach,
        )));
    }
}

/// Multi-barrel weapon that fans several shells around the bearing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scatter {
    speed: f32,
    reach: f32,
    pellets: u32,
    spread_degrees: f32,
}

impl Scatter {
    /// Creates a scatter gun firing `pellets` shells spread evenly across
    /// `spread_degrees`, centred on the target.
    ///
    /// Like [`Cannon::new`], a speed that is not positive yields shells that
    /// are finished on launch.
    #[must_use]
    pub const fn new(speed: f32, reach: f32, pellets: u32, spread_degrees: f32) -> Self {
        Self {
            speed,
            reach,
            pellets,
            spread_degrees,
        }
    }
}

impl Weapon for Scatter {
    fn fire(&mut self, muzzle: WorldPoint, target: &dyn Enemy, projectiles: &mut Projectiles) {
        let aim = (to_vec2(target.position()) - to_vec2(muzzle)).normalize_or_zero();
        let spread = self.spread_degrees.to_radians();
        let gaps = self.pellets.saturating_sub(1).max(1) as f32;

        for pellet in 0..self.pellets {
            let offset = if self.pellets == 1 {
                0.0
            } else {
                -spread / 2.0 + spread * pellet as f32 / gaps
            };
            let direction = Vec2::from_angle(offset).rotate(aim);
            projectiles.push(Box::new(Shell::launch(
                muzzle,
                direction,
                self.speed,
                self.reach,
            )));
        }
    }
}

/// Declarative weapon selection as it appears in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeaponConfig {
    /// Single shell per shot.
    Cannon {
        /// Shell speed in world units per second.
        speed: f32,
        /// Maximum shell travel distance.
        reach: f32,
    },
    /// Fan of shells per shot.
    Scatter {
        /// Shell speed in world units per second.
        speed: f32,
        /// Maximum shell travel distance.
        reach: f32,
        /// Number of shells per volley.
        pellets: u32,
        /// Total fan angle in degrees.
        spread_degrees: f32,
    },
}

impl WeaponConfig {
    /// Validates the configuration and builds the weapon it describes.
    pub fn build(self) -> Result<Box<dyn Weapon>, WeaponError> {
        match self {
            Self::Cannon { speed, reach } => {
                validate_ballistics(speed, reach)?;
                Ok(Box::new(Cannon::new(speed, reach)))
            }
            Self::Scatter {
                speed,
                reach,
                pellets,
                spread_degrees,
            } => {
                validate_ballistics(speed, reach)?;
                if pellets == 0 {
                    return Err(WeaponError::NoPellets);
                }
                if !spread_degrees.is_finite() {
                    return Err(WeaponError::InvalidSpread(spread_degrees));
                }
                Ok(Box::new(Scatter::new(speed, reach, pellets, spread_degrees)))
            }
        }
    }
}

/// Reasons a weapon configuration may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WeaponError {
    /// Shell speed must be a positive finite number.
    #[error("shell speed must be positive and finite, got {0}")]
    InvalidSpeed(f32),
    /// Shell reach must be a positive finite number.
    #[error("shell reach must be positive and finite, got {0}")]
    InvalidReach(f32),
    /// A scatter gun needs at least one pellet.
    #[error("scatter weapons need at least one pellet")]
    NoPellets,
    /// Spread angle must be finite.
    #[error("spread angle must be finite, got {0}")]
    InvalidSpread(f32),
}

fn validate_ballistics(speed: f32, reach: f32) -> Result<(), WeaponError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(WeaponError::InvalidSpeed(speed));
    }
    if !reach.is_finite() || reach <= 0.0 {
        return Err(WeaponError::InvalidReach(reach));
    }
    Ok(())
}

pub(crate) fn to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

#[cfg(test)]
mod tests {
    use super::{Cannon, Scatter, Shell, Weapon, WeaponConfig, WeaponError};
    use crate::projectiles::Projectiles;
    use glam::Vec2;
    use std::time::Duration;
    use turret_defence_core::{Enemy, Projectile, WorldPoint};

    struct Marker(WorldPoint);

    impl Enemy for Marker {
        fn position(&self) -> WorldPoint {
            self.0
        }

        fn health(&self) -> f32 {
            1.0
        }

        fn is_alive(&self) -> bool {
            true
        }
    }

    fn close(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-3
    }

    #[test]
    fn shell_stops_exactly_at_its_reach() {
        let mut shell = Shell::launch(WorldPoint::new(0.0, 0.0), Vec2::X, 10.0, 15.0);

        shell.advance(Duration::from_secs(1));
        assert!(close(shell.position().x(), 10.0));
        assert!(!shell.is_finished());

        shell.advance(Duration::from_secs(1));
        assert!(close(shell.position().x(), 15.0));
        assert!(shell.is_finished());

        shell.advance(Duration::from_secs(1));
        assert!(close(shell.position().x(), 15.0));
    }

    #[test]
    fn shell_without_direction_is_finished_immediately() {
        let shell = Shell::launch(WorldPoint::new(3.0, 3.0), Vec2::ZERO, 10.0, 15.0);
        assert!(shell.is_finished());
    }

    #[test]
    fn stalled_shells_are_finished_on_launch() {
        let mut cannon = Cannon::new(0.0, 100.0);
        let mut projectiles = Projectiles::new();

        cannon.fire(
            WorldPoint::new(0.0, 0.0),
            &Marker(WorldPoint::new(10.0, 0.0)),
            &mut projectiles,
        );

        assert_eq!(projectiles.len(), 1);
        assert!(projectiles.iter().all(|shell| shell.is_finished()));
        assert_eq!(projectiles.compact(), 1);
        assert!(Shell::launch(WorldPoint::new(0.0, 0.0), Vec2::X, -3.0, 10.0).is_finished());
    }

    #[test]
    fn cannon_aims_one_shell_at_the_target() {
        let mut cannon = Cannon::new(5.0, 100.0);
        let mut projectiles = Projectiles::new();

        cannon.fire(
            WorldPoint::new(0.0, 0.0),
            &Marker(WorldPoint::new(0.0, 20.0)),
            &mut projectiles,
        );
        projectiles.advance_all(Duration::from_secs(2));

        let positions: Vec<WorldPoint> = projectiles.iter().map(|shell| shell.position()).collect();
        assert_eq!(positions.len(), 1);
        assert!(close(positions[0].x(), 0.0));
        assert!(close(positions[0].y(), 10.0));
    }

    #[test]
    fn scatter_fans_shells_symmetrically() {
        let mut scatter = Scatter::new(1.0, 100.0, 3, 90.0);
        let mut projectiles = Projectiles::new();

        scatter.fire(
            WorldPoint::new(0.0, 0.0),
            &Marker(WorldPoint::new(10.0, 0.0)),
            &mut projectiles,
        );
        projectiles.advance_all(Duration::from_secs(1));

        let positions: Vec<WorldPoint> = projectiles.iter().map(|shell| shell.position()).collect();
        assert_eq!(positions.len(), 3);
        let half = std::f32::consts::FRAC_1_SQRT_2;
        assert!(close(positions[0].x(), half) && close(positions[0].y(), -half));
        assert!(close(positions[1].x(), 1.0) && close(positions[1].y(), 0.0));
        assert!(close(positions[2].x(), half) && close(positions[2].y(), half));
    }

    #[test]
    fn invalid_weapon_configurations_are_rejected() {
        let scatter = WeaponConfig::Scatter {
            speed: 1.0,
            reach: 1.0,
            pellets: 0,
            spread_degrees: 10.0,
        };
        assert_eq!(scatter.build().unwrap_err(), WeaponError::NoPellets);

        let cannon = WeaponConfig::Cannon {
            speed: 0.0,
            reach: 1.0,
        };
        assert_eq!(cannon.build().unwrap_err(), WeaponError::InvalidSpeed(0.0));
    }
}
