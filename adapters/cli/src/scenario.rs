//! Scenario files describing the towers and enemies of a headless run.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use turret_defence_core::TowerType;
use turret_defence_world::WeaponConfig;

const BUILTIN_SCENARIO: &str = include_str!("../scenarios/default.toml");

/// Complete description of a simulation run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct Scenario {
    /// Simulated time per tick in milliseconds.
    pub(crate) dt_ms: u64,
    /// Number of ticks to run.
    pub(crate) ticks: u32,
    /// Side length of a placement tile in world units.
    pub(crate) tile_length: f32,
    /// Width and height of the board; enemies leaving it are removed.
    pub(crate) board: [f32; 2],
    /// Tower descriptors available for placement.
    pub(crate) tower_types: Vec<TowerType>,
    /// Towers placed before the first tick.
    pub(crate) towers: Vec<TowerPlan>,
    /// Enemies present before the first tick.
    #[serde(default)]
    pub(crate) enemies: Vec<EnemyPlan>,
    /// Optional wave that replaces the roster mid-run.
    #[serde(default)]
    pub(crate) wave: Option<WavePlan>,
}

/// Placement of a single tower.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct TowerPlan {
    /// Name of the tower type to build.
    pub(crate) tower_type: String,
    /// Column and row of the anchor tile.
    pub(crate) tile: [u32; 2],
    /// Attack behaviour of the tower.
    pub(crate) weapon: WeaponConfig,
}

/// Initial state of a single enemy.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub(crate) struct EnemyPlan {
    /// Starting position in world units.
    pub(crate) position: [f32; 2],
    /// Constant velocity in world units per second.
    pub(crate) velocity: [f32; 2],
    /// Health reported to the towers.
    pub(crate) health: f32,
}

/// Seeded batch of enemies spawned at a fixed tick.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct WavePlan {
    /// Tick at which the wave is published.
    pub(crate) at_tick: u32,
    /// Number of enemies in the wave.
    pub(crate) count: u32,
    /// Seed that makes the wave reproducible.
    pub(crate) seed: u64,
    /// Lower corner of the spawn area.
    pub(crate) spawn_min: [f32; 2],
    /// Upper corner of the spawn area.
    pub(crate) spawn_max: [f32; 2],
    /// Inclusive range of eastward speeds.
    pub(crate) speed: [f32; 2],
    /// Health of every spawned enemy.
    pub(crate) health: f32,
}

impl WavePlan {
    /// Generates the enemies of the wave deterministically from its seed.
    pub(crate) fn generate(&self) -> Vec<EnemyPlan> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..self.count)
            .map(|_| {
                let x = rng.gen_range(self.spawn_min[0]..=self.spawn_max[0]);
                let y = rng.gen_range(self.spawn_min[1]..=self.spawn_max[1]);
                let speed = rng.gen_range(self.speed[0]..=self.speed[1]);
                EnemyPlan {
                    position: [x, y],
                    velocity: [speed, 0.0],
                    health: self.health,
                }
            })
            .collect()
    }

    fn normalise(&mut self) {
        for axis in 0..2 {
            if self.spawn_min[axis] > self.spawn_max[axis] {
                warn!(axis, "wave spawn area corners were swapped");
                std::mem::swap(&mut self.spawn_min[axis], &mut self.spawn_max[axis]);
            }
        }
        if self.speed[0] > self.speed[1] {
            warn!("wave speed bounds were swapped");
            self.speed.swap(0, 1);
        }
    }
}

/// Semantic problems found in an otherwise well-formed scenario.
#[derive(Clone, Debug, PartialEq, Error)]
pub(crate) enum ScenarioError {
    /// A tower references a tower type that was never declared.
    #[error("tower at tile {tile:?} references unknown tower type '{name}'")]
    UnknownTowerType {
        /// Name that failed to resolve.
        name: String,
        /// Tile of the offending tower.
        tile: [u32; 2],
    },
    /// Tiles must have a positive, whole side length that fits a footprint.
    #[error("tile length must be a positive whole number no larger than {max}, got {0}", max = u16::MAX)]
    InvalidTileLength(f32),
    /// The board must have positive, finite dimensions.
    #[error("board dimensions must be positive and finite, got {0:?}")]
    InvalidBoard([f32; 2]),
}

impl Scenario {
    /// Parses the scenario bundled with the binary.
    pub(crate) fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_SCENARIO).context("built-in scenario is invalid")
    }

    /// Loads and validates a scenario file from disk.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Parses and validates scenario TOML.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let mut scenario: Self =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Resolves a tower type by name.
    pub(crate) fn tower_type(&self, plan: &TowerPlan) -> Result<&TowerType, ScenarioError> {
        self.tower_types
            .iter()
            .find(|tower_type| tower_type.name() == plan.tower_type)
            .ok_or_else(|| ScenarioError::UnknownTowerType {
                name: plan.tower_type.clone(),
                tile: plan.tile,
            })
    }

    fn validate(&mut self) -> Result<(), ScenarioError> {
        if !self.tile_length.is_finite()
            || self.tile_length <= 0.0
            || self.tile_length.fract() != 0.0
            || self.tile_length > f32::from(u16::MAX)
        {
            return Err(ScenarioError::InvalidTileLength(self.tile_length));
        }
        if self
            .board
            .iter()
            .any(|side| !side.is_finite() || *side <= 0.0)
        {
            return Err(ScenarioError::InvalidBoard(self.board));
        }
        for plan in &self.towers {
            let _ = self.tower_type(plan)?;
        }
        if let Some(wave) = self.wave.as_mut() {
            wave.normalise();
        }
        Ok(())
    }
}
