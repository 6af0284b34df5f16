//! Score, combo, milestones and world advancement
//!
//! Runs once per obstacle clear, in a fixed order: count, combo, points,
//! milestone, world tier, difficulty, upgrade cadence.

use glam::Vec2;

use super::state::{GameEvent, GamePhase, RunState, colors};
use super::upgrades::offer_upgrades;
use super::world::{difficulty_for, tier_for, world_name};

/// Handle one `passed: false -> true` transition
pub fn on_obstacle_cleared(state: &mut RunState) {
    state.obstacles_cleared += 1;

    let now = state.time_ticks;
    let window = u64::from(state.tuning.combo_window);
    state.combo = match state.last_score_tick {
        Some(previous) if now.saturating_sub(previous) < window => state.combo + 1,
        _ => 1,
    };
    state.last_score_tick = Some(now);

    let base = if state.upgrades.double_score { 2 } else { 1 };
    let points = base + u64::from(state.combo / 3);
    state.events.push(GameEvent::Scored {
        points,
        combo: state.combo,
    });
    add_score(state, points);

    advance_world(state);
    state.difficulty = difficulty_for(&state.tuning, state.obstacles_cleared, state.world_tier);

    if state.phase == GamePhase::Playing
        && state.obstacles_cleared % state.tuning.upgrade_every == 0
    {
        offer_upgrades(state);
    }
}

/// Add points and grant a heart for every milestone crossed
pub fn add_score(state: &mut RunState, points: u64) {
    let milestone = state.tuning.milestone_points.max(1);
    let before = state.score / milestone;
    state.score += points;
    let after = state.score / milestone;

    for _ in before..after {
        state.max_health += 1;
        state.health = (state.health + 1).min(state.max_health);
        state.celebration_ticks = state.tuning.celebration_ticks;
        let center = state.agent.center();
        state.burst(center, 24, colors::MILESTONE);
        state.events.push(GameEvent::Milestone { score: state.score });
        log::info!("Milestone reached at {} points", state.score);
    }
}

/// Move up to the highest unlocked world tier
pub fn advance_world(state: &mut RunState) {
    let tier = tier_for(&state.tuning.world_thresholds, state.obstacles_cleared);
    if tier <= state.world_tier {
        return;
    }
    state.world_tier = tier;
    state.world_banner_ticks = state.tuning.world_banner_ticks;
    let mid = Vec2::new(state.tuning.width / 2.0, state.tuning.height / 2.0);
    state.burst(mid, 30, colors::WORLD);
    state.events.push(GameEvent::WorldChanged { tier });
    log::info!("Entered world {}: {}", tier + 1, world_name(tier));
}

/// Drop the combo once the window passes without a clear
pub fn decay_combo(state: &mut RunState) {
    if state.combo == 0 {
        return;
    }
    if let Some(previous) = state.last_score_tick {
        if state.time_ticks.saturating_sub(previous) >= u64::from(state.tuning.combo_window) {
            state.combo = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn run() -> RunState {
        let mut tuning = Tuning::desktop();
        // Keep offers out of the way unless a test wants them
        tuning.upgrade_every = 1000;
        RunState::new(3, tuning)
    }

    #[test]
    fn test_single_clear() {
        let mut state = run();
        on_obstacle_cleared(&mut state);
        assert_eq!(state.obstacles_cleared, 1);
        assert_eq!(state.combo, 1);
        assert_eq!(state.score, 1);
        assert!(
            state
                .events
                .contains(&GameEvent::Scored { points: 1, combo: 1 })
        );
    }

    #[test]
    fn test_combo_builds_inside_window() {
        let mut state = run();
        for i in 0..6 {
            state.time_ticks = i * 60;
            on_obstacle_cleared(&mut state);
        }
        assert_eq!(state.combo, 6);
        // Points: 1,1,2,2,2,3
        assert_eq!(state.score, 11);
    }

    #[test]
    fn test_combo_resets_outside_window() {
        let mut state = run();
        state.time_ticks = 0;
        on_obstacle_cleared(&mut state);
        state.time_ticks = 60;
        on_obstacle_cleared(&mut state);
        assert_eq!(state.combo, 2);
        state.time_ticks = 60 + 120;
        on_obstacle_cleared(&mut state);
        assert_eq!(state.combo, 1);
    }

    #[test]
    fn test_combo_decays() {
        let mut state = run();
        on_obstacle_cleared(&mut state);
        state.time_ticks = 119;
        decay_combo(&mut state);
        assert_eq!(state.combo, 1);
        state.time_ticks = 120;
        decay_combo(&mut state);
        assert_eq!(state.combo, 0);
    }

    #[test]
    fn test_double_score() {
        let mut state = run();
        state.upgrades.double_score = true;
        on_obstacle_cleared(&mut state);
        assert_eq!(state.score, 2);
    }

    #[test]
    fn test_milestone_grants_health() {
        let mut state = run();
        state.score = 99;
        add_score(&mut state, 1);
        assert_eq!(state.max_health, 2);
        assert_eq!(state.health, 2);
        assert_eq!(state.celebration_ticks, 120);
        assert!(state.events.contains(&GameEvent::Milestone { score: 100 }));

        // No second grant until the next hundred
        add_score(&mut state, 50);
        assert_eq!(state.max_health, 2);
    }

    #[test]
    fn test_world_advances_at_threshold() {
        let mut state = run();
        state.obstacles_cleared = 7;
        on_obstacle_cleared(&mut state);
        assert_eq!(state.world_tier, 1);
        assert_eq!(state.world_banner_ticks, 150);
        assert!(state.events.contains(&GameEvent::WorldChanged { tier: 1 }));
    }

    #[test]
    fn test_world_skips_to_highest_reached() {
        let mut state = run();
        state.obstacles_cleared = 19;
        on_obstacle_cleared(&mut state);
        assert_eq!(state.world_tier, 2);
    }

    #[test]
    fn test_difficulty_recomputed() {
        let mut state = run();
        let before = state.difficulty;
        on_obstacle_cleared(&mut state);
        assert!(state.difficulty.speed > before.speed);
        assert!(state.difficulty.base_gap < before.base_gap);
    }

    #[test]
    fn test_every_fifth_clear_offers_upgrade() {
        let mut state = RunState::new(3, Tuning::desktop());
        for _ in 0..4 {
            on_obstacle_cleared(&mut state);
            assert_eq!(state.phase, GamePhase::Playing);
        }
        on_obstacle_cleared(&mut state);
        assert_eq!(state.phase, GamePhase::ChoicePending);
        assert_eq!(state.pending_offer.len(), 3);
    }
}
