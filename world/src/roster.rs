//! Copy-on-write enemy roster shared between the spawner and the towers.

use std::{fmt, sync::Arc};

use parking_lot::RwLock;

/// Externally owned collection of hostile movers.
///
/// Mutations publish a fresh immutable snapshot instead of editing the
/// current one in place, so a scan that already holds a snapshot is never
/// disturbed by concurrent insertions or removals.
pub struct Roster<E> {
    members: RwLock<Arc<[Arc<E>]>>,
}

impl<E> Roster<E> {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::from_members(Vec::new())
    }

    /// Creates a roster populated with the provided members in order.
    #[must_use]
    pub fn from_members(members: Vec<Arc<E>>) -> Self {
        Self {
            members: RwLock::new(Arc::from(members)),
        }
    }

    /// Captures the current members. Later mutations do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[Arc<E>]> {
        Arc::clone(&self.members.read())
    }

    /// Appends a member to the end of the roster.
    pub fn push(&self, enemy: Arc<E>) {
        let mut members = self.members.write();
        let mut next = members.to_vec();
        next.push(enemy);
        *members = Arc::from(next);
    }

    /// Keeps only the members accepted by `keep`, preserving their order.
    ///
    /// Returns the number of members removed.
    pub fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&E) -> bool,
    {
        let mut members = self.members.write();
        let before = members.len();
        let next: Vec<Arc<E>> = members
            .iter()
            .filter(|enemy| keep(enemy))
            .cloned()
            .collect();
        let removed = before - next.len();
        if removed > 0 {
            *members = Arc::from(next);
        }
        removed
    }

    /// Number of members in the current snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Reports whether the current snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for Roster<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Roster<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Roster").field("len", &self.len()).finish()
    }
}
