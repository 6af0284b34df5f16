//! Procedural obstacle and pickup spawning
//!
//! Obstacles are distance-gated: a new one appears once the newest has
//! scrolled `pipe_distance` in from the right edge. Gap placement follows a
//! bounded random walk from the previous gap so consecutive gaps stay
//! reachable.

use glam::Vec2;
use rand::Rng;

use super::state::{Obstacle, Pickup, PickupKind, RunState};

/// Cumulative-weight draw. `None` when all weights are zero.
pub fn weighted_index<R: Rng>(weights: &[u32], rng: &mut R) -> Option<usize> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for (i, &weight) in weights.iter().enumerate() {
        if roll < weight {
            return Some(i);
        }
        roll -= weight;
    }
    None
}

/// Pick a pickup kind by the configured weights
pub fn pick_pickup_kind<R: Rng>(weights: &[u32; 5], rng: &mut R) -> PickupKind {
    let index = weighted_index(weights, rng).unwrap_or(0);
    PickupKind::ALL[index]
}

/// Uniform value in `[-amount, amount]`
fn jitter<R: Rng>(rng: &mut R, amount: f32) -> f32 {
    if amount > 0.0 {
        rng.random_range(-amount..=amount)
    } else {
        0.0
    }
}

/// True when the newest obstacle has advanced far enough for the next one
pub fn should_spawn_obstacle(state: &RunState) -> bool {
    match state.obstacles.last() {
        None => true,
        Some(newest) => {
            let distance = state.tuning.pipe_distance(state.obstacles_cleared);
            newest.x < state.tuning.width - distance
        }
    }
}

/// Gap size for the next obstacle, never below `min_gap`
pub fn next_gap_size(state: &mut RunState) -> f32 {
    let mut gap = state.difficulty.base_gap;
    if state.upgrades.wider_gaps {
        gap += state.tuning.wider_gaps_bonus;
    }
    gap += jitter(&mut state.rng, state.tuning.gap_jitter);
    gap.max(state.tuning.min_gap)
}

/// Top of the gap for the next obstacle
pub fn next_gap_top(state: &mut RunState, gap: f32) -> f32 {
    let tuning = &state.tuning;
    let lo = tuning.margin_top;
    let hi = (tuning.height - gap - tuning.margin_bottom).max(lo);

    let previous_center = state.obstacles.last().map(|o| o.gap_center());
    let center = if state.obstacles_spawned < tuning.training_obstacles {
        // Training wheels: hug the middle
        let amount = tuning.training_jitter;
        tuning.height / 2.0 + jitter(&mut state.rng, amount)
    } else if let Some(previous) = previous_center {
        let growth =
            (state.obstacles_cleared as f32 * tuning.walk_step_growth).min(tuning.walk_step_growth_cap);
        let max_step = tuning.walk_step_base + growth;
        previous + jitter(&mut state.rng, max_step)
    } else {
        return state.rng.random_range(lo..=hi);
    };

    (center - gap / 2.0).clamp(lo, hi)
}

/// Create one obstacle at the right edge, maybe with a pickup in its gap
pub fn spawn_obstacle(state: &mut RunState) {
    let gap_size = next_gap_size(state);
    let gap_y = next_gap_top(state, gap_size);
    let id = state.next_entity_id();
    let x = state.tuning.width;
    let width = state.tuning.obstacle_width;

    state.obstacles.push(Obstacle {
        id,
        x,
        gap_y,
        gap_size,
        width,
        passed: false,
    });
    state.obstacles_spawned += 1;

    let chance = state.tuning.gap_pickup_chance;
    if state.rng.random_bool(chance) {
        spawn_pickup(state, Vec2::new(x + width / 2.0, gap_y + gap_size / 2.0));
    }
}

/// Create a weighted-random pickup centered at `pos`
pub fn spawn_pickup(state: &mut RunState, pos: Vec2) {
    let kind = pick_pickup_kind(&state.tuning.pickup_weights, &mut state.rng);
    let id = state.next_entity_id();
    state.pickups.push(Pickup {
        id,
        kind,
        pos,
        radius: state.tuning.pickup_radius,
        rotation: 0.0,
        magnetized: false,
    });
}

/// Timer-gated free-floating pickup at a random safe height
pub fn maybe_spawn_standalone_pickup(state: &mut RunState) {
    state.pickup_timer += 1;
    if state.pickup_timer < state.tuning.pickup_interval {
        return;
    }
    let chance = state.tuning.standalone_pickup_chance;
    if !state.rng.random_bool(chance) {
        return;
    }
    let lo = state.tuning.margin_top;
    let hi = (state.tuning.height - state.tuning.margin_bottom).max(lo);
    let y = state.rng.random_range(lo..=hi);
    let x = state.tuning.width + state.tuning.pickup_radius;
    spawn_pickup(state, Vec2::new(x, y));
    state.pickup_timer = 0;
}

/// Per-tick spawning pass
pub fn run_spawner(state: &mut RunState) {
    if should_spawn_obstacle(state) {
        spawn_obstacle(state);
    }
    maybe_spawn_standalone_pickup(state);
}
