#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tower state for Turret Defence.
//!
//! The world owns towers and the projectiles they fire. Enemies are owned by
//! an external spawner that publishes them through a shared [`Roster`]; towers
//! only ever hold weak references into it.

pub mod projectiles;
pub mod roster;
pub mod towers;
pub mod weapons;

pub use projectiles::Projectiles;
pub use roster::Roster;
pub use towers::{Placement, Tower};
pub use weapons::{Cannon, Scatter, Shell, Weapon, WeaponConfig, WeaponError};
