//! Roguelike upgrade offers
//!
//! Every few clears the run enters `ChoicePending` with up to three distinct
//! upgrades drawn by rarity weight. Choosing one applies its effect and
//! returns to play.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spawner::weighted_index;
use super::state::{GameEvent, GamePhase, RunState};

/// Offer rarity, controls draw weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn weight(&self) -> u32 {
        match self {
            Rarity::Common => 50,
            Rarity::Rare => 30,
            Rarity::Epic => 15,
            Rarity::Legendary => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

/// The upgrade pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeId {
    ExtraHeart,
    Shield,
    SlowMotion,
    Magnet,
    DoubleScore,
    Shrink,
    FeatherFall,
    WideGaps,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 8] = [
        UpgradeId::ExtraHeart,
        UpgradeId::Shield,
        UpgradeId::SlowMotion,
        UpgradeId::Magnet,
        UpgradeId::DoubleScore,
        UpgradeId::Shrink,
        UpgradeId::FeatherFall,
        UpgradeId::WideGaps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UpgradeId::ExtraHeart => "Extra Heart",
            UpgradeId::Shield => "Shield",
            UpgradeId::SlowMotion => "Slow Motion",
            UpgradeId::Magnet => "Magnet",
            UpgradeId::DoubleScore => "Double Score",
            UpgradeId::Shrink => "Shrink",
            UpgradeId::FeatherFall => "Feather Fall",
            UpgradeId::WideGaps => "Wide Gaps",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UpgradeId::ExtraHeart => "+1 max health, fully healed",
            UpgradeId::Shield => "Block one hit",
            UpgradeId::SlowMotion => "Slow time now, clocks last longer",
            UpgradeId::Magnet => "Attract pickups",
            UpgradeId::DoubleScore => "2x points per obstacle",
            UpgradeId::Shrink => "Smaller hitbox",
            UpgradeId::FeatherFall => "Reduced gravity",
            UpgradeId::WideGaps => "Larger gaps",
        }
    }

    pub fn rarity(&self) -> Rarity {
        match self {
            UpgradeId::ExtraHeart | UpgradeId::FeatherFall => Rarity::Common,
            UpgradeId::Shield | UpgradeId::Magnet | UpgradeId::WideGaps => Rarity::Rare,
            UpgradeId::SlowMotion | UpgradeId::DoubleScore => Rarity::Epic,
            UpgradeId::Shrink => Rarity::Legendary,
        }
    }
}

/// Persistent run-scoped modifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeFlags {
    pub slow_motion: bool,
    pub magnetism: bool,
    pub double_score: bool,
    pub shrink: bool,
    pub floaty: bool,
    pub wider_gaps: bool,
}

impl UpgradeFlags {
    /// Whether a one-shot flag upgrade is already owned
    pub fn owns(&self, id: UpgradeId) -> bool {
        match id {
            UpgradeId::ExtraHeart | UpgradeId::Shield => false,
            UpgradeId::SlowMotion => self.slow_motion,
            UpgradeId::Magnet => self.magnetism,
            UpgradeId::DoubleScore => self.double_score,
            UpgradeId::Shrink => self.shrink,
            UpgradeId::FeatherFall => self.floaty,
            UpgradeId::WideGaps => self.wider_gaps,
        }
    }
}

/// Upgrades that would still do something for this run
pub fn available_upgrades(state: &RunState) -> Vec<UpgradeId> {
    UpgradeId::ALL
        .iter()
        .copied()
        .filter(|&id| !state.upgrades.owns(id))
        .filter(|&id| !(id == UpgradeId::Shield && state.effects.shield_charge))
        .collect()
}

/// Draw up to `count` distinct upgrades by rarity weight, without replacement
pub fn roll_offer<R: Rng>(pool: &[UpgradeId], count: usize, rng: &mut R) -> Vec<UpgradeId> {
    let mut remaining = pool.to_vec();
    let mut offer = Vec::with_capacity(count);
    while offer.len() < count && !remaining.is_empty() {
        let weights: Vec<u32> = remaining.iter().map(|id| id.rarity().weight()).collect();
        let Some(index) = weighted_index(&weights, rng) else {
            break;
        };
        offer.push(remaining.swap_remove(index));
    }
    offer
}

/// Enter `ChoicePending` with a fresh offer
pub fn offer_upgrades(state: &mut RunState) {
    let pool = available_upgrades(state);
    let count = state.tuning.upgrade_choices;
    let offer = roll_offer(&pool, count, &mut state.rng);
    if offer.is_empty() {
        return;
    }
    log::debug!(
        "Upgrade offer at {} cleared: {:?}",
        state.obstacles_cleared,
        offer
    );
    state.pending_offer = offer.clone();
    state.phase = GamePhase::ChoicePending;
    state.events.push(GameEvent::UpgradeOffered(offer));
}

/// Apply one upgrade's effect to the run
pub fn apply_upgrade(state: &mut RunState, id: UpgradeId) {
    match id {
        UpgradeId::ExtraHeart => {
            state.max_health += 1;
            state.health = state.max_health;
        }
        UpgradeId::Shield => {
            state.effects.shield_charge = true;
        }
        UpgradeId::SlowMotion => {
            state.upgrades.slow_motion = true;
            state.effects.slow_ticks = state.effects.slow_ticks.max(state.tuning.slow_ticks_upgraded);
        }
        UpgradeId::Magnet => state.upgrades.magnetism = true,
        UpgradeId::DoubleScore => state.upgrades.double_score = true,
        UpgradeId::Shrink => {
            state.upgrades.shrink = true;
            state.agent.width = state.tuning.shrunk_width;
            state.agent.height = state.tuning.shrunk_height;
        }
        UpgradeId::FeatherFall => state.upgrades.floaty = true,
        UpgradeId::WideGaps => state.upgrades.wider_gaps = true,
    }
}

/// Resolve a pending offer. Out-of-range choices and calls outside
/// `ChoicePending` are ignored.
pub fn choose_upgrade(state: &mut RunState, index: usize) -> Option<UpgradeId> {
    if state.phase != GamePhase::ChoicePending {
        return None;
    }
    let id = *state.pending_offer.get(index)?;
    apply_upgrade(state, id);
    log::debug!("Upgrade chosen: {}", id.name());
    state.pending_offer.clear();
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::UpgradeChosen(id));
    Some(id)
}
