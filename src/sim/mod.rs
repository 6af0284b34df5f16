//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, motion in per-tick units
//! - Seeded RNG only (particle jitter is hashed, not drawn)
//! - Stable iteration order (spawn order)
//! - No rendering, audio or storage dependencies

pub mod damage;
pub mod physics;
pub mod progression;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod upgrades;
pub mod world;

pub use damage::{DamageOutcome, take_damage};
pub use physics::{Boundary, ObstacleHit, Rect};
pub use state::{
    ActiveEffects, Agent, Difficulty, GameEvent, GamePhase, Obstacle, Particle, Pickup,
    PickupKind, RunState, RunSummary,
};
pub use tick::{TickInput, apply_pickup, flap, tick};
pub use upgrades::{Rarity, UpgradeFlags, UpgradeId, choose_upgrade};
pub use world::{WORLD_NAMES, world_name};
