//! Ownership sequence for projectiles fired by a single tower.

use std::time::Duration;

use turret_defence_core::Projectile;

/// Append-only, insertion-ordered collection of in-flight projectiles.
#[derive(Debug, Default)]
pub struct Projectiles {
    entries: Vec<Box<dyn Projectile>>,
}

impl Projectiles {
    /// Creates an empty projectile sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a freshly fired projectile.
    pub fn push(&mut self, projectile: Box<dyn Projectile>) {
        self.entries.push(projectile);
    }

    /// Advances every owned projectile once, in insertion order.
    ///
    /// Finished projectiles are advanced as well; removal only happens
    /// through [`Projectiles::compact`].
    pub fn advance_all(&mut self, dt: Duration) {
        for projectile in &mut self.entries {
            projectile.advance(dt);
        }
    }

    /// Drops finished projectiles, keeping the rest in their original order.
    ///
    /// Returns the number of projectiles that were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|projectile| !projectile.is_finished());
        before - self.entries.len()
    }

    /// Iterator over the owned projectiles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Projectile + 'static)> {
        self.entries.iter().map(Box::as_ref)
    }

    /// Number of projectiles currently owned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no projectile is owned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
