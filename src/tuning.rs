//! Data-driven game balance
//!
//! Every gameplay constant lives here so platforms (and tests) can swap
//! presets without touching the simulation. Units are pixels and ticks at
//! the fixed 60 Hz simulation rate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target platform, selects the balance preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Desktop,
    Mobile,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Desktop => "desktop",
            Platform::Mobile => "mobile",
        }
    }
}

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value: {0}")]
    Invalid(&'static str),
}

/// Gameplay constants for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Playfield ===
    pub width: f32,
    pub height: f32,

    // === Agent ===
    /// Left edge of the agent (fixed for the session)
    pub agent_x: f32,
    /// Top edge the agent starts at and respawns to
    pub agent_start_y: f32,
    pub agent_width: f32,
    pub agent_height: f32,
    /// Agent size under the Shrink upgrade
    pub shrunk_width: f32,
    pub shrunk_height: f32,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Velocity set by a flap (negative = up)
    pub jump_velocity: f32,
    pub floaty_gravity_mult: f32,
    pub floaty_jump_mult: f32,
    /// Forgiveness inset applied to the agent box for obstacle hits
    pub collision_margin: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    /// Steady-state horizontal spacing between obstacles
    pub base_pipe_distance: f32,
    /// Extra spacing at the start of a run, fading out over `spacing_ramp` clears
    pub early_spacing_bonus: f32,
    pub spacing_ramp: u32,
    pub start_gap: f32,
    pub min_base_gap: f32,
    pub gap_shrink_per_clear: f32,
    pub gap_shrink_per_tier: f32,
    pub gap_jitter: f32,
    /// Hard floor for any spawned gap
    pub min_gap: f32,
    pub wider_gaps_bonus: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Obstacles placed near the vertical center at the start of a run
    pub training_obstacles: u32,
    pub training_jitter: f32,
    pub walk_step_base: f32,
    pub walk_step_growth: f32,
    pub walk_step_growth_cap: f32,

    // === Speed ===
    pub base_speed: f32,
    pub speed_per_clear: f32,
    pub speed_per_tier: f32,
    pub max_speed: f32,
    pub slow_time_scale: f32,

    // === Pickups ===
    pub pickup_radius: f32,
    pub pickup_hitbox_scale: f32,
    pub gap_pickup_chance: f64,
    pub pickup_interval: u32,
    pub standalone_pickup_chance: f64,
    /// Weights for Coin, Heart, Star, Clock, Phoenix
    pub pickup_weights: [u32; 5],
    pub magnet_radius: f32,
    pub magnet_pull: f32,
    pub coin_points: u64,
    pub star_points: u64,
    pub slow_ticks: u32,
    pub slow_ticks_upgraded: u32,

    // === Progression ===
    pub combo_window: u32,
    pub milestone_points: u64,
    pub celebration_ticks: u32,
    pub world_banner_ticks: u32,
    /// Obstacles-cleared thresholds, one per world tier, ascending from 0
    pub world_thresholds: Vec<u32>,
    /// Offer an upgrade every N cleared obstacles
    pub upgrade_every: u32,
    pub upgrade_choices: usize,

    // === Damage ===
    pub starting_health: u32,
    pub invuln_ticks: u32,
    pub revive_invuln_ticks: u32,
    /// Minimum distance kept from the floor after a shield bounce
    pub shield_bounce_clearance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::desktop()
    }
}

impl Tuning {
    /// Desktop preset (400x600 playfield)
    pub fn desktop() -> Self {
        Self {
            width: 400.0,
            height: 600.0,

            agent_x: 80.0,
            agent_start_y: 285.0,
            agent_width: 40.0,
            agent_height: 30.0,
            shrunk_width: 30.0,
            shrunk_height: 22.0,
            gravity: 0.2,
            jump_velocity: -5.0,
            floaty_gravity_mult: 0.7,
            floaty_jump_mult: 0.8,
            collision_margin: 5.0,

            obstacle_width: 60.0,
            base_pipe_distance: 220.0,
            early_spacing_bonus: 60.0,
            spacing_ramp: 20,
            start_gap: 170.0,
            min_base_gap: 125.0,
            gap_shrink_per_clear: 1.0,
            gap_shrink_per_tier: 4.0,
            gap_jitter: 10.0,
            min_gap: 110.0,
            wider_gaps_bonus: 30.0,
            margin_top: 60.0,
            margin_bottom: 80.0,
            training_obstacles: 3,
            training_jitter: 30.0,
            walk_step_base: 90.0,
            walk_step_growth: 2.0,
            walk_step_growth_cap: 60.0,

            base_speed: 2.5,
            speed_per_clear: 0.04,
            speed_per_tier: 0.25,
            max_speed: 5.5,
            slow_time_scale: 0.5,

            pickup_radius: 15.0,
            pickup_hitbox_scale: 1.4,
            gap_pickup_chance: 0.3,
            pickup_interval: 150,
            standalone_pickup_chance: 0.3,
            pickup_weights: [40, 25, 15, 15, 5],
            magnet_radius: 150.0,
            magnet_pull: 0.05,
            coin_points: 5,
            star_points: 10,
            slow_ticks: 180,
            slow_ticks_upgraded: 300,

            combo_window: 120,
            milestone_points: 100,
            celebration_ticks: 120,
            world_banner_ticks: 150,
            world_thresholds: vec![0, 8, 18, 30, 45, 60],
            upgrade_every: 5,
            upgrade_choices: 3,

            starting_health: 1,
            invuln_ticks: 60,
            revive_invuln_ticks: 180,
            shield_bounce_clearance: 100.0,
        }
    }

    /// Mobile preset: taller playfield, tighter spacing, gentler top speed
    pub fn mobile() -> Self {
        Self {
            width: 360.0,
            height: 640.0,
            agent_x: 70.0,
            agent_start_y: 305.0,
            base_pipe_distance: 200.0,
            early_spacing_bonus: 50.0,
            min_gap: 120.0,
            min_base_gap: 135.0,
            start_gap: 180.0,
            max_speed: 5.0,
            ..Self::desktop()
        }
    }

    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Desktop => Self::desktop(),
            Platform::Mobile => Self::mobile(),
        }
    }

    /// Parse a (possibly partial) tuning file; missing fields take desktop values
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would make obstacles, gaps or speeds degenerate
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(TuningError::Invalid("playfield must have positive size"));
        }
        if self.min_gap <= 0.0 {
            return Err(TuningError::Invalid("min_gap must be positive"));
        }
        if self.min_gap + self.margin_top + self.margin_bottom >= self.height {
            return Err(TuningError::Invalid("min_gap and margins exceed playfield height"));
        }
        if self.obstacle_width <= 0.0 || self.base_pipe_distance <= 0.0 {
            return Err(TuningError::Invalid("obstacle width and spacing must be positive"));
        }
        if self.base_speed <= 0.0 || self.max_speed < self.base_speed {
            return Err(TuningError::Invalid("speed range is empty"));
        }
        if self.gap_jitter < 0.0 || self.training_jitter < 0.0 {
            return Err(TuningError::Invalid("jitter must not be negative"));
        }
        if self.world_thresholds.first() != Some(&0) {
            return Err(TuningError::Invalid("first world threshold must be 0"));
        }
        if self.world_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TuningError::Invalid("world thresholds must be strictly ascending"));
        }
        let chances = [self.gap_pickup_chance, self.standalone_pickup_chance];
        if chances.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(TuningError::Invalid("pickup chances must be within 0..=1"));
        }
        if self.pickup_weights.iter().sum::<u32>() == 0 {
            return Err(TuningError::Invalid("pickup weights sum to zero"));
        }
        if self.upgrade_every == 0 || self.upgrade_choices == 0 {
            return Err(TuningError::Invalid("upgrade cadence must be positive"));
        }
        if self.starting_health == 0 {
            return Err(TuningError::Invalid("starting health must be positive"));
        }
        Ok(())
    }

    /// Horizontal spacing before the next obstacle spawns
    pub fn pipe_distance(&self, cleared: u32) -> f32 {
        let ramp = self.spacing_ramp.max(1) as f32;
        let fade = (1.0 - cleared as f32 / ramp).max(0.0);
        self.base_pipe_distance + self.early_spacing_bonus * fade
    }
}
