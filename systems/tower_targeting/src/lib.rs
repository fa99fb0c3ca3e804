#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects the nearest live enemy within a tower's range.

use tracing::trace;
use turret_defence_core::{Enemy, WorldPoint};

/// Initial "closest distance" used when scanning a roster.
///
/// Any candidate whose Manhattan distance is not strictly below this value is
/// never selected, even when it lies inside the square range window.
pub const SENTINEL_DISTANCE: f32 = 10_000.0;

/// Engagement window of a single tower used to rank roster members.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetAcquisition {
    origin: WorldPoint,
    range: f32,
}

impl TargetAcquisition {
    /// Creates an acquisition policy for a tower at `origin` with `range`.
    #[must_use]
    pub const fn new(origin: WorldPoint, range: f32) -> Self {
        Self { origin, range }
    }

    /// Position the policy measures distances from.
    #[must_use]
    pub const fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Per-axis range of the engagement window.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Returns the nearest in-range enemy with strictly positive health.
    ///
    /// The roster is scanned once in iteration order. A candidate replaces the
    /// current best only when its distance is strictly smaller, so the first
    /// enemy encountered wins ties.
    pub fn select<'a, E, I>(&self, roster: I) -> Option<&'a E>
    where
        E: Enemy + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let mut closest = None;
        let mut closest_distance = SENTINEL_DISTANCE;

        for (index, enemy) in roster.into_iter().enumerate() {
            let position = enemy.position();
            if !self.origin.within_square_range(self.range, position) {
                continue;
            }

            let distance = self.origin.manhattan_distance(position);
            if distance < closest_distance && enemy.health() > 0.0 {
                trace!(index, distance, "closer candidate found");
                closest_distance = distance;
                closest = Some(enemy);
            }
        }

        closest
    }
}
