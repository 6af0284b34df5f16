//! Game session
//!
//! Owns the current run plus everything that outlives it: lifetime stats,
//! the stats store and the audio sink. Drives the simulation with a fixed
//! timestep accumulator and fans tick events out to audio and persistence.

use crate::audio::{AudioSink, cue_for};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::persistence::{Stats, StatsStore, load_or_default, save_or_warn};
use crate::sim::{GameEvent, GamePhase, RunState, TickInput, tick};
use crate::tuning::Tuning;

pub struct Game {
    state: RunState,
    tuning: Tuning,
    stats: Stats,
    store: Box<dyn StatsStore>,
    audio: Box<dyn AudioSink>,
    accumulator: f32,
    /// Latched input, one-shots cleared after each tick
    input: TickInput,
    last_phase: GamePhase,
    new_record: bool,
}

impl Game {
    /// Load stats and park on the menu
    pub fn new(
        tuning: Tuning,
        store: Box<dyn StatsStore>,
        audio: Box<dyn AudioSink>,
        seed: u64,
    ) -> Self {
        let stats = load_or_default(store.as_ref());
        let mut state = RunState::new(seed, tuning.clone());
        state.phase = GamePhase::Menu;
        Self {
            state,
            tuning,
            stats,
            store,
            audio,
            accumulator: 0.0,
            input: TickInput::default(),
            last_phase: GamePhase::Menu,
            new_record: false,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Whether the last finished run set a new high score
    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    pub fn autopilot(&self) -> bool {
        self.input.autopilot
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    /// Begin a fresh run; counts toward `total_runs`
    pub fn start_run(&mut self, seed: u64) {
        self.stats.total_runs += 1;
        save_or_warn(self.store.as_mut(), &self.stats);

        self.state = RunState::new(seed, self.tuning.clone());
        self.accumulator = 0.0;
        self.input = TickInput {
            autopilot: self.input.autopilot,
            ..Default::default()
        };
        self.new_record = false;
        log::info!(
            "Run {} started with seed {}",
            self.stats.total_runs,
            seed
        );
    }

    /// Return to the title screen
    pub fn show_menu(&mut self) {
        self.state.phase = GamePhase::Menu;
        self.state.pending_offer.clear();
    }

    /// The one-button action: start from the menu or game over, flap in play
    pub fn activate(&mut self) {
        match self.state.phase {
            GamePhase::Menu | GamePhase::GameOver => {
                let seed = next_seed(self.state.seed);
                self.start_run(seed);
            }
            GamePhase::Playing => self.input.flap = true,
            GamePhase::ChoicePending => {}
        }
    }

    /// Queue an upgrade choice for the next tick
    pub fn choose(&mut self, index: usize) {
        if self.state.phase == GamePhase::ChoicePending {
            self.input.choose = Some(index);
        }
    }

    /// Advance by wall-clock `dt` seconds, running whole ticks
    pub fn frame(&mut self, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.note_phase(&mut events);

        // Cap long frames (tab switches, breakpoints); drop NaN and inf
        let dt = if dt.is_finite() { dt.clamp(0.0, 0.1) } else { 0.0 };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.step());
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        events
    }

    /// Run exactly one tick and dispatch its events
    pub fn step(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.note_phase(&mut events);

        tick(&mut self.state, &self.input);
        self.input.flap = false;
        self.input.choose = None;

        for event in self.state.drain_events() {
            self.dispatch(&event);
            events.push(event);
            self.note_phase(&mut events);
        }
        self.note_phase(&mut events);
        events
    }

    fn dispatch(&mut self, event: &GameEvent) {
        if let Some(cue) = cue_for(event) {
            self.audio.play(cue);
        }
        if let GameEvent::GameOver(summary) = event {
            self.new_record = self.stats.record_score(summary.score);
            if self.new_record {
                log::info!("New high score: {}", summary.score);
            }
            save_or_warn(self.store.as_mut(), &self.stats);
        }
    }

    fn note_phase(&mut self, events: &mut Vec<GameEvent>) {
        if self.state.phase != self.last_phase {
            self.last_phase = self.state.phase;
            events.push(GameEvent::PhaseChanged(self.state.phase));
        }
    }
}

/// Seed for the run after `seed` (splitmix64 step)
fn next_seed(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
