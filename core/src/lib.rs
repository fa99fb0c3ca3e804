#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Turret Defence combat engine.
//!
//! This crate defines the vocabulary that connects the authoritative tower
//! state, the pure targeting and combat systems, and the adapters. Enemies are
//! external collaborators that towers only ever read through the [`Enemy`]
//! trait, towers are configured from immutable [`TowerType`] descriptors, and
//! presentation is requested through the [`Renderer`] trait without the core
//! owning any render state.

use std::{fmt, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position expressed in world-space floating point coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the point.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Reports whether `other` lies inside the square engagement window of
    /// the provided range centred on this point.
    ///
    /// Both the horizontal and the vertical separation must be strictly less
    /// than `range`; a separation equal to the range on either axis is out of
    /// range. The window is square, not circular.
    #[must_use]
    pub fn within_square_range(self, range: f32, other: WorldPoint) -> bool {
        let x_distance = (other.x - self.x).abs();
        let y_distance = (other.y - self.y).abs();
        x_distance < range && y_distance < range
    }

    /// Computes the Manhattan distance between two points.
    ///
    /// Only used as a ranking key when choosing between targets.
    #[must_use]
    pub fn manhattan_distance(self, other: WorldPoint) -> f32 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }

    /// Bearing from this point towards `target` in degrees.
    ///
    /// The angle is offset by -90 degrees because turret sprites face "up"
    /// rather than along the positive x axis.
    #[must_use]
    pub fn bearing_degrees(self, target: WorldPoint) -> f32 {
        let radians = f64::from(target.y - self.y).atan2(f64::from(target.x - self.x));
        radians.to_degrees() as f32 - 90.0
    }
}

/// Size of a tower footprint measured in whole world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    width: u32,
    height: u32,
}

impl Footprint {
    /// Creates a new footprint with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the footprint.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the footprint.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Read-only view of a hostile mover.
///
/// Towers never mutate enemies. Every accessor is called on each tick for the
/// held target and during acquisition scans for every roster member.
pub trait Enemy {
    /// Current world-space position of the enemy.
    fn position(&self) -> WorldPoint;

    /// Remaining health. Compared by sign only.
    fn health(&self) -> f32;

    /// Reports whether the enemy should still be treated as alive.
    ///
    /// This is deliberately distinct from the sign of [`Enemy::health`].
    fn is_alive(&self) -> bool;
}

impl<E: Enemy + ?Sized> Enemy for Arc<E> {
    fn position(&self) -> WorldPoint {
        (**self).position()
    }

    fn health(&self) -> f32 {
        (**self).health()
    }

    fn is_alive(&self) -> bool {
        (**self).is_alive()
    }
}

/// Opaque identity of a visual asset handed to the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteKey(String);

impl SpriteKey {
    /// Creates a sprite key from the provided asset name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Asset name carried by the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receives draw requests produced by towers once per tick.
pub trait Renderer {
    /// Draws an unrotated quad textured with `sprite`.
    fn draw_quad(&mut self, sprite: &SpriteKey, origin: WorldPoint, footprint: Footprint);

    /// Draws a quad textured with `sprite` rotated by `angle_degrees`.
    fn draw_quad_rotated(
        &mut self,
        sprite: &SpriteKey,
        origin: WorldPoint,
        footprint: Footprint,
        angle_degrees: f32,
    );

    /// Draws an in-flight projectile centred on `position`.
    fn draw_projectile(&mut self, position: WorldPoint);
}

/// In-flight shot owned by the tower that fired it.
pub trait Projectile: fmt::Debug {
    /// Advances the projectile by one tick of `dt` simulated time.
    fn advance(&mut self, dt: Duration);

    /// Current world-space position of the projectile.
    fn position(&self) -> WorldPoint;

    /// Reports whether the projectile has completed its flight and may be
    /// discarded by its owner.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Immutable descriptor that configures a tower at placement time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TowerTypeConfig", into = "TowerTypeConfig")]
pub struct TowerType {
    name: String,
    range: f32,
    cost: u32,
    firing_period: Duration,
    primary_sprite: SpriteKey,
    overlay_sprites: Vec<SpriteKey>,
}

impl TowerType {
    /// Creates a validated tower type.
    ///
    /// The first sprite is the primary visual; every further sprite is an
    /// overlay rotated to the tower's facing angle.
    pub fn new(
        name: impl Into<String>,
        range: f32,
        cost: u32,
        firing_period: Duration,
        sprites: Vec<SpriteKey>,
    ) -> Result<Self, TowerTypeError> {
        if !range.is_finite() || range < 0.0 {
            return Err(TowerTypeError::InvalidRange(range));
        }
        let mut sprites = sprites.into_iter();
        let Some(primary_sprite) = sprites.next() else {
            return Err(TowerTypeError::MissingSprites);
        };

        Ok(Self {
            name: name.into(),
            range,
            cost,
            firing_period,
            primary_sprite,
            overlay_sprites: sprites.collect(),
        })
    }

    /// Human readable name of the tower type.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum engagement distance per axis.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Placement price of the tower.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Minimum time that must elapse between two shots.
    #[must_use]
    pub const fn firing_period(&self) -> Duration {
        self.firing_period
    }

    /// Unrotated base visual of the tower.
    #[must_use]
    pub const fn primary_sprite(&self) -> &SpriteKey {
        &self.primary_sprite
    }

    /// Overlays rotated to the tower's facing angle, in drawing order.
    #[must_use]
    pub fn overlay_sprites(&self) -> &[SpriteKey] {
        &self.overlay_sprites
    }
}

/// Serialised form of a [`TowerType`] as it appears in configuration files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerTypeConfig {
    /// Human readable name of the tower type.
    pub name: String,
    /// Maximum engagement distance per axis.
    pub range: f32,
    /// Placement price of the tower.
    pub cost: u32,
    /// Cooldown between shots expressed in seconds.
    pub firing_speed_secs: f32,
    /// Visual assets, primary sprite first.
    pub sprites: Vec<SpriteKey>,
}

impl TryFrom<TowerTypeConfig> for TowerType {
    type Error = TowerTypeError;

    fn try_from(config: TowerTypeConfig) -> Result<Self, Self::Error> {
        let firing_period = Duration::try_from_secs_f32(config.firing_speed_secs)
            .map_err(|_| TowerTypeError::InvalidFiringPeriod(config.firing_speed_secs))?;
        Self::new(
            config.name,
            config.range,
            config.cost,
            firing_period,
            config.sprites,
        )
    }
}

impl From<TowerType> for TowerTypeConfig {
    fn from(tower_type: TowerType) -> Self {
        Self {
            name: tower_type.name,
            range: tower_type.range,
            cost: tower_type.cost,
            firing_speed_secs: tower_type.firing_period.as_secs_f32(),
            sprites: std::iter::once(tower_type.primary_sprite)
                .chain(tower_type.overlay_sprites)
                .collect(),
        }
    }
}

/// Reasons a tower type descriptor may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TowerTypeError {
    /// The range is negative or not a finite number.
    #[error("tower range must be a finite, non-negative number, got {0}")]
    InvalidRange(f32),
    /// The firing period is negative or not a finite number.
    #[error("firing period must be a finite, non-negative number of seconds, got {0}")]
    InvalidFiringPeriod(f32),
    /// No sprite was supplied for the primary visual.
    #[error("tower type requires at least one sprite")]
    MissingSprites,
}

/// Programmer errors raised by the combat core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CombatError {
    /// A fire action was requested while no live target was supplied.
    #[error("shoot invoked without a target")]
    MissingTarget,
}
