//! Flappy Rogue - a side-scrolling flap-and-dodge game with roguelike upgrades
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, progression, upgrades)
//! - `game`: Session driver (fixed timestep, audio and stats dispatch)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Lifetime stats stores
//! - `audio`: Sound cues and sinks
//! - `render`: Canvas2D renderer (wasm only)

pub mod audio;
pub mod game;
pub mod persistence;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use persistence::{PersistError, Stats, StatsStore};
pub use settings::Settings;
pub use tuning::{Platform, Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Simulation rate; gameplay units are per tick at this rate
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Live particle cap
    pub const MAX_PARTICLES: usize = 256;
}
