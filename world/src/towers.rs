//! Authoritative tower state: placement, targeting, firing and presentation.

use std::{fmt, sync::Arc, time::Duration};

use tracing::{debug, error};
use turret_defence_core::{CombatError, Enemy, Footprint, Renderer, TowerType, WorldPoint};
use turret_defence_system_tower_combat::{Engagement, FireControl, TickReport};

use crate::{projectiles::Projectiles, roster::Roster, weapons::Weapon};

/// Position and footprint supplied by the tile layout at construction time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    /// World-space position of the tower's anchor tile.
    pub origin: WorldPoint,
    /// Size of the anchor tile.
    pub footprint: Footprint,
}

impl Placement {
    /// Creates a placement anchored at `origin` with the given footprint.
    #[must_use]
    pub const fn new(origin: WorldPoint, footprint: Footprint) -> Self {
        Self { origin, footprint }
    }
}

/// A single placed defensive unit.
pub struct Tower<E> {
    tower_type: TowerType,
    position: WorldPoint,
    footprint: Footprint,
    roster: Arc<Roster<E>>,
    fire_control: FireControl<E>,
    weapon: Box<dyn Weapon>,
    projectiles: Projectiles,
}

impl<E: Enemy> Tower<E> {
    /// Places a tower of `tower_type` reading enemies from `roster`.
    #[must_use]
    pub fn new(
        tower_type: TowerType,
        placement: Placement,
        roster: Arc<Roster<E>>,
        weapon: Box<dyn Weapon>,
    ) -> Self {
        Self {
            tower_type,
            position: placement.origin,
            footprint: placement.footprint,
            roster,
            fire_control: FireControl::new(),
            weapon,
            projectiles: Projectiles::new(),
        }
    }

    /// Runs one simulation tick.
    ///
    /// The firing decision happens first, then every owned projectile is
    /// advanced (including any fired during this tick), then the tower is
    /// drawn.
    pub fn update(&mut self, dt: Duration, renderer: &mut dyn Renderer) -> TickReport {
        let engagement = Engagement {
            origin: self.position,
            range: self.tower_type.range(),
            firing_period: self.tower_type.firing_period(),
        };
        let muzzle = self.muzzle();
        let roster = &self.roster;
        let weapon = &mut self.weapon;
        let projectiles = &mut self.projectiles;

        let report = self.fire_control.step(
            engagement,
            dt,
            || roster.snapshot(),
            |target| weapon.fire(muzzle, &**target, projectiles),
        );

        self.projectiles.advance_all(dt);
        self.draw(renderer);
        report
    }

    /// Fires the tower's weapon at `target` immediately, bypassing cooldown.
    pub fn shoot(&mut self, target: Option<&Arc<E>>) -> Result<(), CombatError> {
        let Some(target) = target else {
            error!(tower = self.tower_type.name(), "shoot invoked without a target");
            return Err(CombatError::MissingTarget);
        };

        let muzzle = self.muzzle();
        self.weapon.fire(muzzle, &**target, &mut self.projectiles);
        Ok(())
    }

    /// Replaces the roster consulted by the next acquisition.
    pub fn replace_roster(&mut self, roster: Arc<Roster<E>>) {
        debug!(
            tower = self.tower_type.name(),
            members = roster.len(),
            "enemy roster replaced"
        );
        self.roster = roster;
    }

    /// Issues the draw requests for this tower and its projectiles.
    ///
    /// The primary sprite is drawn as-is and every overlay is rotated to the
    /// current facing angle. Owned projectiles follow in launch order.
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.draw_quad(self.tower_type.primary_sprite(), self.position, self.footprint);
        let angle = self.fire_control.facing_degrees();
        for overlay in self.tower_type.overlay_sprites() {
            renderer.draw_quad_rotated(overlay, self.position, self.footprint, angle);
        }
        for projectile in self.projectiles.iter() {
            renderer.draw_projectile(projectile.position());
        }
    }

    /// Drops finished projectiles and returns how many were removed.
    pub fn compact_projectiles(&mut self) -> usize {
        self.projectiles.compact()
    }

    /// Projectiles fired by this tower in launch order.
    #[must_use]
    pub fn projectiles(&self) -> &Projectiles {
        &self.projectiles
    }

    /// Currently held target reference, if the enemy still exists.
    #[must_use]
    pub fn target(&self) -> Option<Arc<E>> {
        self.fire_control.target()
    }

    /// Reports whether the tower considers itself locked onto a target.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.fire_control.is_locked()
    }

    /// Time accumulated since the tower last fired.
    #[must_use]
    pub fn since_last_shot(&self) -> Duration {
        self.fire_control.since_last_shot()
    }

    /// Facing angle in degrees.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.fire_control.facing_degrees()
    }
}

impl<E> Tower<E> {
    /// Descriptor the tower was built from.
    #[must_use]
    pub const fn tower_type(&self) -> &TowerType {
        &self.tower_type
    }

    /// Placement price.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.tower_type.cost()
    }

    /// Per-axis engagement range.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.tower_type.range()
    }

    /// Cooldown between shots.
    #[must_use]
    pub const fn firing_period(&self) -> Duration {
        self.tower_type.firing_period()
    }

    /// World-space position of the tower.
    #[must_use]
    pub const fn position(&self) -> WorldPoint {
        self.position
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.position.x()
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.position.y()
    }

    /// Moves the tower horizontally.
    pub fn set_x(&mut self, x: f32) {
        self.position = WorldPoint::new(x, self.position.y());
    }

    /// Moves the tower vertically.
    pub fn set_y(&mut self, y: f32) {
        self.position = WorldPoint::new(self.position.x(), y);
    }

    /// Footprint of the tower.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Footprint width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.footprint.width()
    }

    /// Footprint height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.footprint.height()
    }

    /// Resizes the footprint horizontally.
    pub fn set_width(&mut self, width: u32) {
        self.footprint = Footprint::new(width, self.footprint.height());
    }

    /// Resizes the footprint vertically.
    pub fn set_height(&mut self, height: u32) {
        self.footprint = Footprint::new(self.footprint.width(), height);
    }

    fn muzzle(&self) -> WorldPoint {
        WorldPoint::new(
            self.position.x() + self.footprint.width() as f32 / 2.0,
            self.position.y() + self.footprint.height() as f32 / 2.0,
        )
    }
}

impl<E> fmt::Debug for Tower<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tower")
            .field("tower_type", &self.tower_type.name())
            .field("position", &self.position)
            .field("footprint", &self.footprint)
            .field("roster", &self.roster)
            .field("fire_control", &self.fire_control)
            .field("weapon", &self.weapon)
            .field("projectiles", &self.projectiles.len())
            .finish()
    }
}
