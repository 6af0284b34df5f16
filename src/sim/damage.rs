//! Damage and life resolution
//!
//! Priority: invulnerability, then shield, then health. A non-fatal hit
//! clears the obstacle list to give the player room to recover.

use super::state::{GameEvent, GamePhase, RunState, colors};

/// How a lethal overlap was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerability window active
    Ignored,
    /// Shield charge consumed, no health lost
    ShieldAbsorbed,
    /// Lost health, run continues
    Hurt,
    /// Out of health but a banked revive saved the run
    Revived,
    /// Run is over
    Fatal,
}

/// Resolve one lethal overlap (floor breach or obstacle hit)
pub fn take_damage(state: &mut RunState) -> DamageOutcome {
    if state.is_invulnerable() {
        return DamageOutcome::Ignored;
    }

    let center = state.agent.center();

    if state.effects.shield_charge {
        state.effects.shield_charge = false;
        state.effects.invuln_ticks = state.tuning.invuln_ticks;
        let ceiling = state.tuning.height - state.tuning.shield_bounce_clearance;
        state.agent.y = state.agent.y.min(ceiling);
        state.agent.vel = state.tuning.jump_velocity;
        state.burst(center, 15, colors::SHIELD);
        state.events.push(GameEvent::ShieldBroken);
        log::debug!("Shield absorbed a hit");
        return DamageOutcome::ShieldAbsorbed;
    }

    state.health = state.health.saturating_sub(1);
    state.combo = 0;
    state.burst(center, 20, colors::HIT);
    state.events.push(GameEvent::Hit {
        health: state.health,
    });

    if state.health == 0 {
        if state.effects.revive_banked {
            state.effects.revive_banked = false;
            state.health = 1;
            reset_for_breather(state);
            state.effects.invuln_ticks = state.tuning.revive_invuln_ticks;
            let center = state.agent.center();
            state.burst(center, 40, colors::REVIVE);
            state.events.push(GameEvent::Revived);
            log::info!("Revive consumed at score {}", state.score);
            return DamageOutcome::Revived;
        }

        state.phase = GamePhase::GameOver;
        state.pending_offer.clear();
        let summary = state.summary();
        log::info!(
            "Run over: score {} ({} cleared, {} pickups)",
            summary.score,
            summary.obstacles_cleared,
            summary.pickups_collected
        );
        state.events.push(GameEvent::GameOver(summary));
        return DamageOutcome::Fatal;
    }

    reset_for_breather(state);
    state.effects.invuln_ticks = state.tuning.invuln_ticks;
    log::debug!("Hit taken, {} health left", state.health);
    DamageOutcome::Hurt
}

/// Agent back to spawn, obstacles gone
fn reset_for_breather(state: &mut RunState) {
    let tuning = &state.tuning;
    state.agent.respawn(tuning);
    state.obstacles.clear();
}
