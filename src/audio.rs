//! Sound cues
//!
//! The simulation only emits [`GameEvent`]s; the session maps them to cues
//! and hands them to an [`AudioSink`] right after each tick. On wasm the sink
//! is procedurally generated Web Audio - no external files needed!

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Agent flapped
    Flap,
    /// Obstacle cleared
    Score,
    /// Pickup collected or milestone reached
    Powerup,
    /// Lost health or shield
    Hit,
    /// Run over
    Death,
    /// Upgrade chosen or new world
    Upgrade,
    /// Banked revive consumed
    Revive,
}

/// Cue for an event, if it makes a sound
pub fn cue_for(event: &GameEvent) -> Option<AudioCue> {
    match event {
        GameEvent::Flap => Some(AudioCue::Flap),
        GameEvent::Scored { .. } => Some(AudioCue::Score),
        GameEvent::PickupCollected(_) | GameEvent::Milestone { .. } => Some(AudioCue::Powerup),
        GameEvent::ShieldBroken => Some(AudioCue::Hit),
        // The last hit is voiced by Death or Revive instead
        GameEvent::Hit { health } if *health == 0 => None,
        GameEvent::Hit { .. } => Some(AudioCue::Hit),
        GameEvent::Revived => Some(AudioCue::Revive),
        GameEvent::GameOver(_) => Some(AudioCue::Death),
        GameEvent::UpgradeChosen(_) | GameEvent::WorldChanged { .. } => Some(AudioCue::Upgrade),
        GameEvent::UpgradeOffered(_) | GameEvent::PhaseChanged(_) => None,
    }
}

/// Anything that can play cues
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Silent sink for headless runs and tests
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Logs cues at trace level and keeps a count (native runner)
#[derive(Debug, Default)]
pub struct LogAudio {
    pub played: usize,
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: AudioCue) {
        self.played += 1;
        log::trace!("cue {:?}", cue);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioCue, AudioSink};

    /// Web Audio oscillator beeps
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        /// Output gain after master, sfx and mute
        volume: f32,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.8,
            }
        }

        /// See `Settings::effective_volume`
        pub fn set_volume(&mut self, vol: f32) {
            self.volume = vol.clamp(0.0, 1.0);
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// One decaying tone, optionally sliding to `end_freq`
        fn beep(
            &self,
            ctx: &AudioContext,
            vol: f32,
            freq: f32,
            end_freq: Option<f32>,
            osc_type: OscillatorType,
            delay: f64,
            duration: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + duration)
                .ok();
            if let Some(end) = end_freq {
                osc.frequency().set_value_at_time(freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end, t + duration)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + duration + 0.05).ok();
        }

        /// Rising run of notes
        fn arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32], step: f64) {
            for (i, freq) in notes.iter().enumerate() {
                self.beep(
                    ctx,
                    vol,
                    *freq,
                    None,
                    OscillatorType::Triangle,
                    i as f64 * step,
                    0.15,
                );
            }
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: AudioCue) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers start suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                AudioCue::Flap => self.beep(
                    ctx,
                    vol * 0.2,
                    300.0,
                    Some(500.0),
                    OscillatorType::Sine,
                    0.0,
                    0.08,
                ),
                AudioCue::Score => {
                    self.beep(ctx, vol * 0.25, 880.0, None, OscillatorType::Square, 0.0, 0.06)
                }
                AudioCue::Powerup => self.arpeggio(ctx, vol * 0.25, &[600.0, 800.0, 1000.0], 0.08),
                AudioCue::Hit => self.beep(
                    ctx,
                    vol * 0.4,
                    200.0,
                    Some(80.0),
                    OscillatorType::Sawtooth,
                    0.0,
                    0.2,
                ),
                AudioCue::Death => {
                    for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                        self.beep(
                            ctx,
                            vol * 0.3,
                            *freq,
                            None,
                            OscillatorType::Sine,
                            i as f64 * 0.2,
                            0.3,
                        );
                    }
                }
                AudioCue::Upgrade => {
                    self.arpeggio(ctx, vol * 0.3, &[400.0, 500.0, 600.0, 800.0], 0.1)
                }
                AudioCue::Revive => self.beep(
                    ctx,
                    vol * 0.35,
                    200.0,
                    Some(900.0),
                    OscillatorType::Triangle,
                    0.0,
                    0.4,
                ),
            }
        }
    }
}
