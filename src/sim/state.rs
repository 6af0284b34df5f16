//! Run state and core simulation types
//!
//! Everything a run mutates lives on [`RunState`]; the tick functions take it
//! by `&mut` and nothing else, so a run can be stepped in isolation.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::physics::Rect;
use super::upgrades::{UpgradeFlags, UpgradeId};
use crate::consts::MAX_PARTICLES;
use crate::tuning::Tuning;

/// Coarse run phase, mirrored by the screen collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulates
    Menu,
    /// Active gameplay
    Playing,
    /// Upgrade offer on screen; the clock keeps running
    ChoicePending,
    /// Run ended
    GameOver,
}

/// The player-controlled entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Left edge (fixed for the session)
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub vel: f32,
    pub width: f32,
    pub height: f32,
}

impl Agent {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            x: tuning.agent_x,
            y: tuning.agent_start_y,
            vel: 0.0,
            width: tuning.agent_width,
            height: tuning.agent_height,
        }
    }

    /// Display rotation in degrees, nose up when climbing
    pub fn rotation(&self) -> f32 {
        (self.vel * 3.0).clamp(-30.0, 90.0)
    }

    /// Full sprite box
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Sprite box shrunk by the forgiveness margin on every side
    pub fn hitbox(&self, margin: f32) -> Rect {
        self.bounds().inset(margin)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Put the agent back at its spawn height, at rest
    pub fn respawn(&mut self, tuning: &Tuning) {
        self.y = tuning.agent_start_y;
        self.vel = 0.0;
    }
}

/// A paired top/bottom barrier with a passable gap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Top of the gap
    pub gap_y: f32,
    pub gap_size: f32,
    pub width: f32,
    /// Set once when the trailing edge crosses the agent
    pub passed: bool,
}

impl Obstacle {
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn gap_center(&self) -> f32 {
        self.gap_y + self.gap_size / 2.0
    }

    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_y + self.gap_size
    }
}

/// Pickup effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Flat score bonus
    Coin,
    /// Restore one health, up to max
    Heart,
    /// Score bonus plus a shield charge
    Star,
    /// Start a slow-time window
    Clock,
    /// Bank a revive
    Phoenix,
}

impl PickupKind {
    /// Order matches `Tuning::pickup_weights`
    pub const ALL: [PickupKind; 5] = [
        PickupKind::Coin,
        PickupKind::Heart,
        PickupKind::Star,
        PickupKind::Clock,
        PickupKind::Phoenix,
    ];

    pub fn color(&self) -> u32 {
        match self {
            PickupKind::Coin => 0xffd700,
            PickupKind::Heart => 0xe74c3c,
            PickupKind::Star => 0xf39c12,
            PickupKind::Clock => 0x3498db,
            PickupKind::Phoenix => 0xff6b35,
        }
    }
}

/// A collectible entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    /// Center
    pub pos: Vec2,
    pub radius: f32,
    /// Display wobble phase
    pub rotation: f32,
    /// Being pulled by the magnet this tick (render hint only)
    #[serde(skip)]
    pub magnetized: bool,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Ticks remaining
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
}

impl Particle {
    /// 1.0 when fresh, 0.0 when expired
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Particle lifetime in ticks
pub const PARTICLE_LIFE: u32 = 30;

/// Particle color codes for non-pickup bursts
pub mod colors {
    pub const FLAP: u32 = 0xffffff;
    pub const SHIELD: u32 = 0x3498db;
    pub const HIT: u32 = 0xe74c3c;
    pub const REVIVE: u32 = 0xff6b35;
    pub const MILESTONE: u32 = 0xffd700;
    pub const WORLD: u32 = 0x9b59b6;
}

/// Timed effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// One-hit shield
    pub shield_charge: bool,
    pub slow_ticks: u32,
    pub invuln_ticks: u32,
    /// Converts the next lethal hit into a reset
    pub revive_banked: bool,
}

/// Per-run difficulty scalars, recomputed on each clear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Horizontal scroll per tick
    pub speed: f32,
    /// Gap size before bonuses and jitter
    pub base_gap: f32,
}

/// Final tally handed to the screen and persistence collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub score: u64,
    pub obstacles_cleared: u32,
    pub pickups_collected: u32,
    pub world_tier: usize,
    pub ticks: u64,
}

/// Things that happened during a tick, in order
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Flap,
    Scored { points: u64, combo: u32 },
    PickupCollected(PickupKind),
    ShieldBroken,
    Hit { health: u32 },
    Revived,
    GameOver(RunSummary),
    UpgradeOffered(Vec<UpgradeId>),
    UpgradeChosen(UpgradeId),
    WorldChanged { tier: usize },
    Milestone { score: u64 },
    PhaseChanged(GamePhase),
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub agent: Agent,
    /// Oldest first; the last entry is the most recently spawned
    pub obstacles: Vec<Obstacle>,
    pub pickups: Vec<Pickup>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub score: u64,
    pub obstacles_cleared: u32,
    pub obstacles_spawned: u32,
    pub pickups_collected: u32,
    pub combo: u32,
    /// Tick of the previous obstacle clear, for the combo window
    pub last_score_tick: Option<u64>,
    pub health: u32,
    pub max_health: u32,
    pub upgrades: UpgradeFlags,
    pub effects: ActiveEffects,
    pub world_tier: usize,
    pub difficulty: Difficulty,
    /// Upgrades on offer while `ChoicePending`
    pub pending_offer: Vec<UpgradeId>,
    /// Ticks since the last standalone pickup
    pub pickup_timer: u32,
    pub world_banner_ticks: u32,
    pub celebration_ticks: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Outgoing events, drained by the driver after each tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl RunState {
    /// Start a fresh run
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let difficulty = super::world::difficulty_for(&tuning, 0, 0);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            agent: Agent::new(&tuning),
            phase: GamePhase::Playing,
            obstacles: Vec::new(),
            pickups: Vec::new(),
            particles: Vec::new(),
            score: 0,
            obstacles_cleared: 0,
            obstacles_spawned: 0,
            pickups_collected: 0,
            combo: 0,
            last_score_tick: None,
            health: tuning.starting_health,
            max_health: tuning.starting_health,
            upgrades: UpgradeFlags::default(),
            effects: ActiveEffects::default(),
            world_tier: 0,
            difficulty,
            pending_offer: Vec::new(),
            pickup_timer: 0,
            world_banner_ticks: 0,
            celebration_ticks: 0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Time-scale factor for this tick
    pub fn time_scale(&self) -> f32 {
        if self.effects.slow_ticks > 0 {
            self.tuning.slow_time_scale
        } else {
            1.0
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.effects.invuln_ticks > 0
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            score: self.score,
            obstacles_cleared: self.obstacles_cleared,
            pickups_collected: self.pickups_collected,
            world_tier: self.world_tier,
            ticks: self.time_ticks,
        }
    }

    /// Spray particles from a point. Jitter comes from a tick hash so the
    /// gameplay RNG stream does not depend on particle counts.
    pub fn burst(&mut self, pos: Vec2, count: u32, color: u32) {
        for i in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let hash = (self.time_ticks as u32)
                .wrapping_mul(2654435761)
                .wrapping_add(i.wrapping_mul(7919))
                .wrapping_add(self.particles.len() as u32 * 104729);
            let rand1 = (hash % 1000) as f32 / 1000.0 - 0.5;
            let rand2 = ((hash >> 10) % 1000) as f32 / 1000.0 - 0.5;
            let rand3 = ((hash >> 20) % 1000) as f32 / 1000.0;
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(rand1 * 8.0, rand2 * 8.0),
                color,
                life: PARTICLE_LIFE,
                max_life: PARTICLE_LIFE,
                size: 2.0 + rand3 * 6.0,
            });
        }
    }

    /// Advance and expire particles
    pub fn update_particles(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel;
            particle.life = particle.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_defaults() {
        let state = RunState::new(7, Tuning::desktop());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.health, 1);
        assert_eq!(state.max_health, 1);
        assert_eq!(state.score, 0);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.difficulty.speed, 2.5);
        assert_eq!(state.difficulty.base_gap, 170.0);
    }

    #[test]
    fn test_rotation_is_clamped() {
        let mut agent = Agent::new(&Tuning::desktop());
        agent.vel = -20.0;
        assert_eq!(agent.rotation(), -30.0);
        agent.vel = 50.0;
        assert_eq!(agent.rotation(), 90.0);
        agent.vel = 2.0;
        assert_eq!(agent.rotation(), 6.0);
    }

    #[test]
    fn test_particles_expire() {
        let mut state = RunState::new(1, Tuning::desktop());
        state.burst(Vec2::new(100.0, 100.0), 5, colors::FLAP);
        assert_eq!(state.particles.len(), 5);
        for _ in 0..PARTICLE_LIFE {
            state.update_particles();
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_particles_are_capped() {
        let mut state = RunState::new(1, Tuning::desktop());
        state.burst(Vec2::ZERO, (MAX_PARTICLES + 50) as u32, colors::HIT);
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = RunState::new(1, Tuning::desktop());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }
}
