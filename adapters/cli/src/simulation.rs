//! Headless driver that moves enemies and ticks every tower.

use std::{cell::Cell, io::Write, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, info};
use turret_defence_core::{Enemy, Footprint, WorldPoint};
use turret_defence_rendering::FrameRecorder;
use turret_defence_world::{Placement, Roster, Tower};

use crate::scenario::{EnemyPlan, Scenario};

/// Enemy that walks in a straight line at constant velocity.
#[derive(Debug)]
pub(crate) struct Marcher {
    position: Cell<Vec2>,
    velocity: Vec2,
    health: f32,
}

impl Marcher {
    fn from_plan(plan: &EnemyPlan) -> Arc<Self> {
        Arc::new(Self {
            position: Cell::new(Vec2::from(plan.position)),
            velocity: Vec2::from(plan.velocity),
            health: plan.health,
        })
    }

    fn walk(&self, dt: Duration) {
        self.position
            .set(self.position.get() + self.velocity * dt.as_secs_f32());
    }

    fn on_board(&self, board: Vec2) -> bool {
        let position = self.position.get();
        position.x <= board.x && position.y >= 0.0 && position.y <= board.y
    }
}

impl Enemy for Marcher {
    fn position(&self) -> WorldPoint {
        let position = self.position.get();
        WorldPoint::new(position.x, position.y)
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct TowerStats {
    acquisitions: u32,
    shots: u32,
    expired_projectiles: usize,
}

/// Towers and enemies of a running scenario.
#[derive(Debug)]
pub(crate) struct Simulation {
    board: Vec2,
    roster: Arc<Roster<Marcher>>,
    towers: Vec<Tower<Marcher>>,
    stats: Vec<TowerStats>,
    pending_wave: Option<(u32, Vec<EnemyPlan>)>,
    tick_index: u32,
}

impl Simulation {
    /// Builds the towers and the initial roster described by `scenario`.
    pub(crate) fn new(scenario: &Scenario) -> Result<Self> {
        let roster = Arc::new(Roster::from_members(
            scenario.enemies.iter().map(Marcher::from_plan).collect(),
        ));

        let mut towers = Vec::with_capacity(scenario.towers.len());
        for plan in &scenario.towers {
            let tower_type = scenario.tower_type(plan)?.clone();
            let weapon = plan
                .weapon
                .build()
                .with_context(|| format!("invalid weapon for tower at tile {:?}", plan.tile))?;
            let side = scenario.tile_length;
            // Whole and bounded, checked by `Scenario::validate`.
            let extent = side as u32;
            let placement = Placement::new(
                WorldPoint::new(plan.tile[0] as f32 * side, plan.tile[1] as f32 * side),
                Footprint::new(extent, extent),
            );
            info!(
                tower = tower_type.name(),
                x = placement.origin.x(),
                y = placement.origin.y(),
                cost = tower_type.cost(),
                "tower placed"
            );
            towers.push(Tower::new(tower_type, placement, Arc::clone(&roster), weapon));
        }

        let pending_wave = scenario
            .wave
            .as_ref()
            .map(|wave| (wave.at_tick, wave.generate()));

        Ok(Self {
            board: Vec2::from(scenario.board),
            roster,
            stats: vec![TowerStats::default(); towers.len()],
            towers,
            pending_wave,
            tick_index: 0,
        })
    }

    /// Advances enemies and towers by one tick, recording draw requests.
    pub(crate) fn tick(&mut self, dt: Duration, recorder: &mut FrameRecorder) {
        self.publish_due_wave();

        for enemy in self.roster.snapshot().iter() {
            enemy.walk(dt);
        }
        let board = self.board;
        let departed = self.roster.retain(|enemy| enemy.on_board(board));
        if departed > 0 {
            debug!(departed, "enemies left the board");
        }

        for (tower, stats) in self.towers.iter_mut().zip(&mut self.stats) {
            let report = tower.update(dt, recorder);
            stats.acquisitions += u32::from(report.acquired);
            stats.shots += u32::from(report.fired);
            stats.expired_projectiles += tower.compact_projectiles();
        }

        self.tick_index += 1;
    }

    fn publish_due_wave(&mut self) {
        let due = matches!(&self.pending_wave, Some((at_tick, _)) if *at_tick <= self.tick_index);
        if !due {
            return;
        }
        let Some((_, plans)) = self.pending_wave.take() else {
            return;
        };

        let mut members: Vec<Arc<Marcher>> = self.roster.snapshot().to_vec();
        members.extend(plans.iter().map(Marcher::from_plan));
        let roster = Arc::new(Roster::from_members(members));
        info!(
            tick = self.tick_index,
            spawned = plans.len(),
            members = roster.len(),
            "wave published"
        );

        for tower in &mut self.towers {
            tower.replace_roster(Arc::clone(&roster));
        }
        self.roster = roster;
    }

    /// Summarises the run so far.
    pub(crate) fn report(&self) -> Report {
        Report {
            ticks: self.tick_index,
            enemies_remaining: self.roster.len(),
            towers: self
                .towers
                .iter()
                .zip(&self.stats)
                .map(|(tower, stats)| TowerReport {
                    name: tower.tower_type().name().to_owned(),
                    cost: tower.cost(),
                    position: [tower.x(), tower.y()],
                    acquisitions: stats.acquisitions,
                    shots: stats.shots,
                    projectiles_in_flight: tower.projectiles().len(),
                    expired_projectiles: stats.expired_projectiles,
                    has_target: tower.has_target(),
                    facing_degrees: tower.angle(),
                })
                .collect(),
        }
    }
}

/// Outcome of a headless run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Report {
    ticks: u32,
    enemies_remaining: usize,
    towers: Vec<TowerReport>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct TowerReport {
    name: String,
    cost: u32,
    position: [f32; 2],
    acquisitions: u32,
    shots: u32,
    projectiles_in_flight: usize,
    expired_projectiles: usize,
    has_target: bool,
    facing_degrees: f32,
}

impl Report {
    /// Writes a human readable summary.
    pub(crate) fn write_text<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "{} ticks, {} enemies remaining",
            self.ticks, self.enemies_remaining
        )?;
        for tower in &self.towers {
            writeln!(
                out,
                "{} (cost {}) at ({:.0}, {:.0}): {} shots, {} acquisitions, {} in flight, {} expired, {}",
                tower.name,
                tower.cost,
                tower.position[0],
                tower.position[1],
                tower.shots,
                tower.acquisitions,
                tower.projectiles_in_flight,
                tower.expired_projectiles,
                if tower.has_target {
                    format!("tracking at {:.1} deg", tower.facing_degrees)
                } else {
                    "idle".to_owned()
                },
            )?;
        }
        Ok(())
    }

    /// Total shots fired by every tower.
    pub(crate) fn total_shots(&self) -> u32 {
        self.towers.iter().map(|tower| tower.shots).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::Simulation;
    use crate::scenario::Scenario;
    use std::time::Duration;
    use turret_defence_rendering::FrameRecorder;

    const DUEL: &str = r#"
        dt_ms = 100
        ticks = 40
        tile_length = 10.0
        board = [400.0, 100.0]

        [[tower_types]]
        name = "cannon"
        range = 100.0
        cost = 5
        firing_speed_secs = 1.0
        sprites = ["base", "gun"]

        [[towers]]
        tower_type = "cannon"
        tile = [5, 5]
        weapon = { kind = "cannon", speed = 200.0, reach = 50.0 }

        [[enemies]]
        position = [60.0, 50.0]
        velocity = [0.0, 0.0]
        health = 3.0
    "#;

    #[test]
    fn stationary_enemy_is_engaged_once_per_period() {
        let scenario = Scenario::parse(DUEL).expect("scenario");
        let mut simulation = Simulation::new(&scenario).expect("simulation");
        let mut recorder = FrameRecorder::new();
        let mut projectile_markers = 0;

        for _ in 0..scenario.ticks {
            simulation.tick(Duration::from_millis(scenario.dt_ms), &mut recorder);
            let frame = recorder.finish_frame();
            assert_eq!(frame.commands().len(), 2);
            projectile_markers += frame.projectiles().len();
        }

        let report = simulation.report();
        // Locked on tick 0, first shot once more than a second accumulated.
        assert_eq!(report.total_shots(), 3);
        assert_eq!(report.towers[0].acquisitions, 1);
        assert!(report.towers[0].has_target);
        assert!(report.towers[0].expired_projectiles >= 2);
        assert!(projectile_markers >= 3);
    }

    #[test]
    fn wave_replaces_the_roster_for_every_tower() {
        let source = format!(
            "{DUEL}\n[wave]\nat_tick = 2\ncount = 3\nseed = 9\nspawn_min = [10.0, 10.0]\nspawn_max = [20.0, 20.0]\nspeed = [0.0, 0.0]\nhealth = 1.0\n"
        );
        let scenario = Scenario::parse(&source).expect("scenario");
        let mut simulation = Simulation::new(&scenario).expect("simulation");
        let mut recorder = FrameRecorder::new();

        for _ in 0..3 {
            simulation.tick(Duration::from_millis(100), &mut recorder);
        }

        assert_eq!(simulation.report().enemies_remaining, 4);
    }
}
