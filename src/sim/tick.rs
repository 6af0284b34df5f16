//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically. All motion is in
//! per-tick units; the driver calls [`tick`] at a fixed 60 Hz.

use glam::Vec2;

use super::damage::{DamageOutcome, take_damage};
use super::physics::{self, Boundary};
use super::progression::{add_score, decay_combo, on_obstacle_cleared};
use super::spawner::run_spawner;
use super::state::{GameEvent, GamePhase, PickupKind, RunState, colors};
use super::upgrades::choose_upgrade;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Activate (space/click/tap)
    pub flap: bool,
    /// Index into the pending upgrade offer
    pub choose: Option<usize>,
    /// Idle/demo mode - autopilot flies the agent
    pub autopilot: bool,
}

/// Advance the run by one tick
pub fn tick(state: &mut RunState, input: &TickInput) {
    // Nothing simulates outside a run
    match state.phase {
        GamePhase::Menu | GamePhase::GameOver => return,
        _ => {}
    }

    state.time_ticks += 1;
    advance_timers(state);
    state.update_particles();
    for pickup in state.pickups.iter_mut() {
        pickup.rotation += 0.05;
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }
    let input = &input;

    if state.phase == GamePhase::ChoicePending {
        // Clock keeps running, the agent and world hold still
        if let Some(index) = input.choose {
            choose_upgrade(state, index);
        }
        return;
    }

    if input.flap {
        flap(state);
    }

    // --- AGENT PHYSICS ---
    let scale = state.time_scale();
    let gravity = if state.upgrades.floaty {
        state.tuning.gravity * state.tuning.floaty_gravity_mult
    } else {
        state.tuning.gravity
    };
    physics::integrate(&mut state.agent, gravity, scale);

    if physics::check_bounds(&mut state.agent, state.tuning.height) == Boundary::Floor
        && resolve_floor_breach(state)
    {
        return;
    }

    run_spawner(state);

    if update_obstacles(state, scale) {
        return;
    }

    update_pickups(state, scale);
}

/// Apply the upward impulse. Ignored outside `Playing`.
pub fn flap(state: &mut RunState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let mut impulse = state.tuning.jump_velocity;
    if state.upgrades.floaty {
        impulse *= state.tuning.floaty_jump_mult;
    }
    state.agent.vel = impulse;
    let tail = Vec2::new(state.agent.x, state.agent.y + state.agent.height / 2.0);
    state.burst(tail, 5, colors::FLAP);
    state.events.push(GameEvent::Flap);
}

/// Apply a pickup's effect to the run
pub fn apply_pickup(state: &mut RunState, kind: PickupKind) {
    match kind {
        PickupKind::Coin => add_score(state, state.tuning.coin_points),
        PickupKind::Heart => {
            if state.health < state.max_health {
                state.health += 1;
            }
        }
        PickupKind::Star => {
            add_score(state, state.tuning.star_points);
            state.effects.shield_charge = true;
        }
        PickupKind::Clock => {
            let duration = if state.upgrades.slow_motion {
                state.tuning.slow_ticks_upgraded
            } else {
                state.tuning.slow_ticks
            };
            state.effects.slow_ticks = state.effects.slow_ticks.max(duration);
        }
        PickupKind::Phoenix => state.effects.revive_banked = true,
    }
}

/// Tick-count countdowns
fn advance_timers(state: &mut RunState) {
    let effects = &mut state.effects;
    effects.slow_ticks = effects.slow_ticks.saturating_sub(1);
    effects.invuln_ticks = effects.invuln_ticks.saturating_sub(1);
    state.world_banner_ticks = state.world_banner_ticks.saturating_sub(1);
    state.celebration_ticks = state.celebration_ticks.saturating_sub(1);
    decay_combo(state);
}

/// Returns true if the run ended
fn resolve_floor_breach(state: &mut RunState) -> bool {
    match take_damage(state) {
        DamageOutcome::Ignored => {
            // Keep the agent from sinking while invulnerable
            state.agent.y = state.tuning.height - state.agent.height;
            state.agent.vel = state.tuning.jump_velocity;
            false
        }
        DamageOutcome::Fatal => true,
        _ => false,
    }
}

/// Scroll, score and collide obstacles. Returns true if the rest of the tick
/// is skipped: the run ended or a clear opened an upgrade offer.
fn update_obstacles(state: &mut RunState, scale: f32) -> bool {
    let speed = state.difficulty.speed * scale;
    let agent_x = state.agent.x;

    let mut cleared = 0;
    for obstacle in state.obstacles.iter_mut() {
        obstacle.x -= speed;
        if !obstacle.passed && obstacle.right() < agent_x {
            obstacle.passed = true;
            cleared += 1;
        }
    }
    for _ in 0..cleared {
        on_obstacle_cleared(state);
    }
    // Offer opened: the world is held from here
    if state.phase != GamePhase::Playing {
        return true;
    }

    let hitbox = state.agent.hitbox(state.tuning.collision_margin);
    let hit = state
        .obstacles
        .iter()
        .any(|o| physics::obstacle_collision(&hitbox, o).is_some());
    if hit && take_damage(state) == DamageOutcome::Fatal {
        return true;
    }

    state.obstacles.retain(|o| o.right() > 0.0);
    false
}

/// Scroll, attract and collect pickups
fn update_pickups(state: &mut RunState, scale: f32) {
    let speed = state.difficulty.speed * scale;
    let magnet = state.upgrades.magnetism;
    let target = state.agent.center();
    let radius = state.tuning.magnet_radius;
    let pull = state.tuning.magnet_pull;

    for pickup in state.pickups.iter_mut() {
        pickup.pos.x -= speed;
        pickup.magnetized = magnet && physics::magnet_pull(&mut pickup.pos, target, radius, pull);
    }

    let agent_box = state.agent.bounds();
    let hitbox_scale = state.tuning.pickup_hitbox_scale;
    let mut collected: Vec<(PickupKind, Vec2)> = Vec::new();
    state.pickups.retain(|pickup| {
        if physics::pickup_collision(&agent_box, pickup, hitbox_scale) {
            collected.push((pickup.kind, pickup.pos));
            false
        } else {
            pickup.pos.x + pickup.radius > 0.0
        }
    });

    for (kind, pos) in collected {
        state.pickups_collected += 1;
        state.burst(pos, 10, kind.color());
        state.events.push(GameEvent::PickupCollected(kind));
        apply_pickup(state, kind);
    }
}

/// Demo pilot: hold the agent near the lower part of the next gap and take
/// the first upgrade on offer
fn autopilot(state: &RunState, input: &mut TickInput) {
    if state.phase == GamePhase::ChoicePending {
        input.choose = Some(0);
        return;
    }

    let agent = &state.agent;
    let target_bottom = state
        .obstacles
        .iter()
        .find(|o| o.right() >= agent.x)
        .map(|o| o.gap_bottom() - 15.0)
        .unwrap_or(state.tuning.height / 2.0 + 40.0);

    if agent.y + agent.height > target_bottom && agent.vel > 0.0 {
        input.flap = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Obstacle, Pickup};
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::desktop();
        tuning.gap_pickup_chance = 0.0;
        tuning.standalone_pickup_chance = 0.0;
        tuning
    }

    fn pickup_at(kind: PickupKind, pos: Vec2) -> Pickup {
        Pickup {
            id: 500,
            kind,
            pos,
            radius: 15.0,
            rotation: 0.0,
            magnetized: false,
        }
    }

    #[test]
    fn test_gravity_one_tick() {
        let mut state = RunState::new(1, quiet_tuning());
        state.agent.y = 300.0;
        state.agent.vel = 0.0;
        tick(&mut state, &TickInput::default());
        assert!((state.agent.vel - 0.2).abs() < 1e-6);
        assert!((state.agent.y - 300.2).abs() < 1e-4);
    }

    #[test]
    fn test_flap_sets_velocity() {
        let mut state = RunState::new(1, quiet_tuning());
        let input = TickInput {
            flap: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        // Impulse then one gravity step
        assert!((state.agent.vel - (-4.8)).abs() < 1e-5);
        assert!(state.events.contains(&GameEvent::Flap));
    }

    #[test]
    fn test_floaty_flap_is_weaker() {
        let mut state = RunState::new(1, quiet_tuning());
        state.upgrades.floaty = true;
        flap(&mut state);
        assert!((state.agent.vel - (-4.0)).abs() < 1e-5);
    }

    #[test]
    fn test_passed_flips_exactly_once() {
        let mut tuning = quiet_tuning();
        tuning.agent_x = 120.0;
        let mut state = RunState::new(1, tuning);
        state.difficulty.speed = 1.0;
        state.obstacles.push(Obstacle {
            id: 900,
            x: 61.0,
            gap_y: 0.0,
            gap_size: 500.0,
            width: 60.0,
            passed: false,
        });

        // x = 60: 60 + 60 is not < 120
        tick(&mut state, &TickInput::default());
        assert!(!state.obstacles[0].passed);
        assert_eq!(state.obstacles_cleared, 0);

        // x = 59: flips
        tick(&mut state, &TickInput::default());
        assert!(state.obstacles[0].passed);
        assert_eq!(state.obstacles_cleared, 1);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.obstacles_cleared, 1);
    }

    #[test]
    fn test_offer_holds_rest_of_tick() {
        let mut tuning = quiet_tuning();
        tuning.agent_x = 120.0;
        let mut state = RunState::new(1, tuning);
        state.difficulty.speed = 1.0;
        state.obstacles_cleared = state.tuning.upgrade_every - 1;
        state.health = 2;
        state.max_health = 2;
        // About to pass this tick
        state.obstacles.push(Obstacle {
            id: 900,
            x: 60.5,
            gap_y: 0.0,
            gap_size: 500.0,
            width: 60.0,
            passed: false,
        });
        // Solid wall over the agent
        state.obstacles.push(Obstacle {
            id: 901,
            x: 100.0,
            gap_y: 450.0,
            gap_size: 120.0,
            width: 60.0,
            passed: false,
        });
        let center = state.agent.center();
        state.pickups.push(pickup_at(PickupKind::Coin, center));

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::ChoicePending);
        assert_eq!(state.obstacles_cleared, state.tuning.upgrade_every);
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::UpgradeOffered(_))));

        // Neither the wall nor the coin resolves on the offer tick
        assert_eq!(state.health, 2);
        assert!(!state.events.iter().any(|e| matches!(e, GameEvent::Hit { .. })));
        assert_eq!(state.pickups_collected, 0);
        assert_eq!(state.pickups.len(), 1);
    }

    #[test]
    fn test_obstacle_hit_clears_field() {
        let mut state = RunState::new(1, quiet_tuning());
        state.health = 2;
        state.max_health = 2;
        // Solid wall over the agent (gap far below)
        state.obstacles.push(Obstacle {
            id: 900,
            x: 70.0,
            gap_y: 450.0,
            gap_size: 120.0,
            width: 60.0,
            passed: false,
        });
        tick(&mut state, &TickInput::default());
        assert_eq!(state.health, 1);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.is_invulnerable());
    }

    #[test]
    fn test_floor_breach_is_fatal_at_one_health() {
        let mut state = RunState::new(1, quiet_tuning());
        state.agent.y = 569.0;
        state.agent.vel = 4.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver(_)))
        );
    }

    #[test]
    fn test_floor_while_invulnerable_bounces() {
        let mut state = RunState::new(1, quiet_tuning());
        state.effects.invuln_ticks = 30;
        state.agent.y = 575.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.agent.y, 570.0);
        assert_eq!(state.agent.vel, -5.0);
        assert_eq!(state.health, 1);
    }

    #[test]
    fn test_game_over_freezes_state() {
        let mut state = RunState::new(1, quiet_tuning());
        state.phase = GamePhase::GameOver;
        let y = state.agent.y;
        for _ in 0..10 {
            tick(
                &mut state,
                &TickInput {
                    flap: true,
                    ..Default::default()
                },
            );
        }
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.agent.y, y);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_choice_pending_holds_world_but_not_clock() {
        let mut state = RunState::new(1, quiet_tuning());
        tick(&mut state, &TickInput::default());
        crate::sim::upgrades::offer_upgrades(&mut state);
        state.effects.invuln_ticks = 10;
        let y = state.agent.y;
        let obstacle_x = state.obstacles[0].x;
        let ticks = state.time_ticks;

        tick(
            &mut state,
            &TickInput {
                flap: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::ChoicePending);
        assert_eq!(state.agent.y, y);
        assert_eq!(state.obstacles[0].x, obstacle_x);
        assert_eq!(state.time_ticks, ticks + 1);
        assert_eq!(state.effects.invuln_ticks, 9);
        assert!(!state.events.contains(&GameEvent::Flap));
    }

    #[test]
    fn test_choice_via_input_resumes_play() {
        let mut state = RunState::new(1, quiet_tuning());
        crate::sim::upgrades::offer_upgrades(&mut state);
        let chosen = state.pending_offer[2];
        tick(
            &mut state,
            &TickInput {
                choose: Some(2),
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.events.contains(&GameEvent::UpgradeChosen(chosen)));
    }

    #[test]
    fn test_coin_pickup_collected() {
        let mut state = RunState::new(1, quiet_tuning());
        let center = state.agent.center();
        state.pickups.push(pickup_at(PickupKind::Coin, center));
        tick(&mut state, &TickInput::default());
        assert!(state.pickups.is_empty());
        assert_eq!(state.pickups_collected, 1);
        assert_eq!(state.score, 5);
        assert!(
            state
                .events
                .contains(&GameEvent::PickupCollected(PickupKind::Coin))
        );
    }

    #[test]
    fn test_pickup_effects() {
        let mut state = RunState::new(1, quiet_tuning());
        apply_pickup(&mut state, PickupKind::Heart);
        assert_eq!(state.health, 1, "heart never exceeds max");

        apply_pickup(&mut state, PickupKind::Star);
        assert_eq!(state.score, 10);
        assert!(state.effects.shield_charge);

        apply_pickup(&mut state, PickupKind::Clock);
        assert_eq!(state.effects.slow_ticks, 180);

        apply_pickup(&mut state, PickupKind::Phoenix);
        assert!(state.effects.revive_banked);
    }

    #[test]
    fn test_slow_time_halves_scroll() {
        let mut state = RunState::new(1, quiet_tuning());
        tick(&mut state, &TickInput::default());
        let x0 = state.obstacles[0].x;
        state.effects.slow_ticks = 100;
        tick(&mut state, &TickInput::default());
        let moved = x0 - state.obstacles[0].x;
        assert!((moved - state.difficulty.speed * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_magnet_marks_pickups() {
        let mut state = RunState::new(1, quiet_tuning());
        state.upgrades.magnetism = true;
        let center = state.agent.center();
        state.pickups.push(pickup_at(PickupKind::Coin, center + Vec2::new(120.0, 0.0)));
        tick(&mut state, &TickInput::default());
        assert!(state.pickups[0].magnetized);
    }

    #[test]
    fn test_offscreen_entities_removed() {
        let mut state = RunState::new(1, quiet_tuning());
        state.obstacles.push(Obstacle {
            id: 900,
            x: -58.0,
            gap_y: 0.0,
            gap_size: 600.0,
            width: 60.0,
            passed: true,
        });
        state
            .pickups
            .push(pickup_at(PickupKind::Coin, Vec2::new(-13.0, 50.0)));
        tick(&mut state, &TickInput::default());
        assert!(state.obstacles.iter().all(|o| o.id != 900));
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two runs with the same seed and inputs stay identical
        let mut state1 = RunState::new(99999, Tuning::desktop());
        let mut state2 = RunState::new(99999, Tuning::desktop());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..3000 {
            tick(&mut state1, &input);
            tick(&mut state2, &input);
        }
        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.obstacles_cleared, state2.obstacles_cleared);
        assert_eq!(state1.obstacles.len(), state2.obstacles.len());
        assert!((state1.agent.y - state2.agent.y).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn test_run_invariants_hold(seed in any::<u64>(), flaps in proptest::collection::vec(any::<bool>(), 600)) {
            let mut state = RunState::new(seed, Tuning::desktop());
            let mut last_score = 0;
            let mut last_tier = 0;
            for flap in flaps {
                let input = TickInput { flap, choose: Some(0), autopilot: false };
                tick(&mut state, &input);
                prop_assert!(state.score >= last_score);
                prop_assert!(state.world_tier >= last_tier);
                prop_assert!(state.health <= state.max_health);
                prop_assert!(state.agent.y >= 0.0);
                for obstacle in &state.obstacles {
                    prop_assert!(obstacle.gap_size >= state.tuning.min_gap);
                }
                last_score = state.score;
                last_tier = state.world_tier;
            }
        }
    }
}
