use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    sync::Arc,
    time::Duration,
};

use turret_defence_core::{Enemy, Footprint, Projectile, Renderer, SpriteKey, TowerType, WorldPoint};
use turret_defence_world::{Placement, Projectiles, Roster, Tower, Weapon};

#[derive(Debug)]
struct Walker {
    position: Cell<WorldPoint>,
    health: Cell<f32>,
}

impl Walker {
    fn at(x: f32, y: f32) -> Arc<Self> {
        Arc::new(Self {
            position: Cell::new(WorldPoint::new(x, y)),
            health: Cell::new(3.0),
        })
    }
}

impl Enemy for Walker {
    fn position(&self) -> WorldPoint {
        self.position.get()
    }

    fn health(&self) -> f32 {
        self.health.get()
    }

    fn is_alive(&self) -> bool {
        self.health.get() > 0.0
    }
}

type Log = Rc<RefCell<Vec<String>>>;

#[derive(Debug)]
struct Dart {
    label: String,
    log: Log,
}

impl Projectile for Dart {
    fn advance(&mut self, _dt: Duration) {
        self.log.borrow_mut().push(self.label.clone());
    }

    fn position(&self) -> WorldPoint {
        WorldPoint::default()
    }
}

#[derive(Debug)]
struct DartLauncher {
    volleys: u32,
    log: Log,
}

impl Weapon for DartLauncher {
    fn fire(&mut self, _muzzle: WorldPoint, _target: &dyn Enemy, projectiles: &mut Projectiles) {
        self.volleys += 1;
        self.log.borrow_mut().push(format!("fire {}", self.volleys));
        projectiles.push(Box::new(Dart {
            label: format!("dart {}", self.volleys),
            log: Rc::clone(&self.log),
        }));
    }
}

#[derive(Debug, Default)]
struct Recorder {
    quads: Vec<(String, Option<f32>)>,
    projectiles: usize,
}

impl Renderer for Recorder {
    fn draw_quad(&mut self, sprite: &SpriteKey, _origin: WorldPoint, _footprint: Footprint) {
        self.quads.push((sprite.to_string(), None));
    }

    fn draw_quad_rotated(
        &mut self,
        sprite: &SpriteKey,
        _origin: WorldPoint,
        _footprint: Footprint,
        angle_degrees: f32,
    ) {
        self.quads.push((sprite.to_string(), Some(angle_degrees)));
    }

    fn draw_projectile(&mut self, _position: WorldPoint) {
        self.quads.push(("projectile".to_owned(), None));
        self.projectiles += 1;
    }
}

fn tower_type(period: Duration) -> TowerType {
    TowerType::new(
        "dart",
        50.0,
        10,
        period,
        vec![SpriteKey::new("base"), SpriteKey::new("turret")],
    )
    .expect("valid tower type")
}

fn dart_tower(roster: Arc<Roster<Walker>>, log: &Log, period: Duration) -> Tower<Walker> {
    Tower::new(
        tower_type(period),
        Placement::new(WorldPoint::new(0.0, 0.0), Footprint::new(1, 1)),
        roster,
        Box::new(DartLauncher {
            volleys: 0,
            log: Rc::clone(log),
        }),
    )
}

#[test]
fn projectiles_fired_this_tick_are_advanced_in_launch_order() {
    let log: Log = Rc::default();
    let roster = Arc::new(Roster::from_members(vec![Walker::at(5.0, 5.0)]));
    let mut tower = dart_tower(roster, &log, Duration::ZERO);
    let mut renderer = Recorder::default();

    let dt = Duration::from_millis(100);
    let acquired = tower.update(dt, &mut renderer);
    assert!(acquired.acquired);
    assert!(log.borrow().is_empty());

    let first = tower.update(dt, &mut renderer);
    let second = tower.update(dt, &mut renderer);
    assert!(first.fired && second.fired);

    assert_eq!(
        *log.borrow(),
        vec!["fire 1", "dart 1", "fire 2", "dart 1", "dart 2"],
    );
    assert_eq!(tower.projectiles().len(), 2);
}

#[test]
fn swapped_roster_is_the_only_one_scanned() {
    let log: Log = Rc::default();
    let doomed = Walker::at(1.0, 1.0);
    let bystander = Walker::at(2.0, 2.0);
    let old_roster = Arc::new(Roster::from_members(vec![
        Arc::clone(&doomed),
        Arc::clone(&bystander),
    ]));
    let mut tower = dart_tower(Arc::clone(&old_roster), &log, Duration::from_secs(10));
    let mut renderer = Recorder::default();

    let _ = tower.update(Duration::from_millis(16), &mut renderer);
    assert!(Arc::ptr_eq(&tower.target().expect("target"), &doomed));

    let newcomer = Walker::at(30.0, 30.0);
    tower.replace_roster(Arc::new(Roster::from_members(vec![Arc::clone(&newcomer)])));
    doomed.health.set(-1.0);

    let report = tower.update(Duration::from_millis(16), &mut renderer);
    assert!(report.scanned);
    assert!(Arc::ptr_eq(&tower.target().expect("target"), &newcomer));
}

#[test]
fn removing_the_target_from_the_roster_releases_it() {
    let log: Log = Rc::default();
    let roster = Arc::new(Roster::from_members(vec![Walker::at(4.0, 0.0)]));
    let mut tower = dart_tower(Arc::clone(&roster), &log, Duration::from_secs(10));
    let mut renderer = Recorder::default();

    let _ = tower.update(Duration::from_millis(16), &mut renderer);
    assert!(tower.has_target());

    assert_eq!(roster.retain(|_| false), 1);
    let report = tower.update(Duration::from_millis(16), &mut renderer);

    assert!(report.scanned);
    assert!(!report.fired);
    assert!(!tower.has_target());
    assert!(tower.target().is_none());
}

#[test]
fn draw_emits_base_then_rotated_overlays() {
    let log: Log = Rc::default();
    let roster = Arc::new(Roster::from_members(vec![Walker::at(10.0, 0.0)]));
    let mut tower = dart_tower(roster, &log, Duration::from_secs(10));
    let mut renderer = Recorder::default();

    let _ = tower.update(Duration::from_millis(16), &mut renderer);
    let _ = tower.update(Duration::from_millis(16), &mut renderer);

    let last_frame = &renderer.quads[2..];
    assert_eq!(last_frame.len(), 2);
    assert_eq!(renderer.projectiles, 0);
    assert_eq!(last_frame[0], ("base".to_owned(), None));
    assert_eq!(last_frame[1].0, "turret");
    let angle = last_frame[1].1.expect("rotated overlay");
    assert!((angle + 90.0).abs() < 1e-4);
}

#[test]
fn projectiles_are_drawn_after_the_tower_in_launch_order() {
    let log: Log = Rc::default();
    let roster = Arc::new(Roster::from_members(vec![Walker::at(5.0, 5.0)]));
    let mut tower = dart_tower(roster, &log, Duration::ZERO);
    let mut renderer = Recorder::default();

    for _ in 0..3 {
        let _ = tower.update(Duration::from_millis(100), &mut renderer);
    }

    // Tick 0 acquires, ticks 1 and 2 each fire once.
    let labels: Vec<&str> = renderer.quads.iter().map(|(sprite, _)| sprite.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "base", "turret",
            "base", "turret", "projectile",
            "base", "turret", "projectile", "projectile",
        ],
    );
    assert_eq!(renderer.projectiles, 3);
    assert_eq!(tower.projectiles().len(), 2);
}
