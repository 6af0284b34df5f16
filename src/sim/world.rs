//! World tiers and the difficulty curve
//!
//! Tiers are unlocked by obstacles cleared and only rescale difficulty and
//! presentation; physics constants never change between worlds.

use super::state::Difficulty;
use crate::tuning::Tuning;

/// Display names, indexed by tier
pub const WORLD_NAMES: [&str; 6] = [
    "Meadow",
    "Dusk Canyon",
    "Crystal Caves",
    "Stormfront",
    "The Void",
    "Inferno",
];

/// Name for a tier; tiers past the named list reuse the last name with a number
pub fn world_name(tier: usize) -> String {
    match WORLD_NAMES.get(tier) {
        Some(name) => (*name).to_string(),
        None => format!("{} {}", WORLD_NAMES[WORLD_NAMES.len() - 1], tier + 2 - WORLD_NAMES.len()),
    }
}

/// Highest tier whose threshold has been reached
pub fn tier_for(thresholds: &[u32], cleared: u32) -> usize {
    thresholds
        .iter()
        .rposition(|&threshold| threshold <= cleared)
        .unwrap_or(0)
}

/// Speed and base gap for the current progress, each capped independently
pub fn difficulty_for(tuning: &Tuning, cleared: u32, tier: usize) -> Difficulty {
    let speed = tuning.base_speed
        + cleared as f32 * tuning.speed_per_clear
        + tier as f32 * tuning.speed_per_tier;
    let base_gap = tuning.start_gap
        - cleared as f32 * tuning.gap_shrink_per_clear
        - tier as f32 * tuning.gap_shrink_per_tier;
    Difficulty {
        speed: speed.min(tuning.max_speed),
        base_gap: base_gap.max(tuning.min_base_gap),
    }
}
