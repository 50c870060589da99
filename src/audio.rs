//! Feedback cues as Web Audio beeps
//!
//! Every cue is one or more short oscillator tones; no sample files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::Cue;

/// One scheduled tone
#[derive(Debug, Clone, Copy)]
struct Tone {
    freq: f32,
    /// Seconds
    duration: f64,
    /// Offset from now, seconds
    delay: f64,
    gain: f32,
    wave: OscillatorType,
}

impl Tone {
    const fn new(freq: f32, duration: f64, gain: f32, wave: OscillatorType) -> Self {
        Self {
            freq,
            duration,
            delay: 0.0,
            gain,
            wave,
        }
    }

    const fn after(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

const MASTER_VOLUME: f32 = 0.8;

/// Rising four-note jingle for a cleared scene
const CLEAR_MELODY: [f32; 4] = [660.0, 740.0, 880.0, 990.0];

fn tones_for(cue: Cue) -> Vec<Tone> {
    use OscillatorType::{Sine, Triangle};
    match cue {
        Cue::Perfect => vec![
            Tone::new(880.0, 0.07, 0.06, Triangle),
            Tone::new(1320.0, 0.06, 0.05, Triangle).after(0.05),
        ],
        Cue::Good => vec![Tone::new(560.0, 0.07, 0.06, Triangle)],
        Cue::Miss => vec![Tone::new(140.0, 0.07, 0.05, Sine)],
        Cue::Pickup => vec![Tone::new(520.0, 0.055, 0.05, Triangle)],
        Cue::Collision => vec![Tone::new(170.0, 0.07, 0.05, Sine)],
        Cue::Reset => vec![Tone::new(190.0, 0.07, 0.05, Sine)],
        Cue::Catch => vec![
            Tone::new(660.0, 0.09, 0.06, Triangle),
            Tone::new(990.0, 0.12, 0.06, Triangle).after(0.08),
        ],
        Cue::SceneClear => CLEAR_MELODY
            .iter()
            .enumerate()
            .map(|(i, &f)| Tone::new(f, 0.12, 0.06, Triangle).after(i as f64 * 0.13))
            .collect(),
    }
}

/// Plays feedback cues through a lazily resumed `AudioContext`
pub struct AudioManager {
    ctx: Option<AudioContext>,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn play(&self, cue: Cue) {
        if self.muted {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        self.resume();

        for tone in tones_for(cue) {
            self.play_tone(ctx, tone);
        }
    }

    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        wave: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(wave);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short attack then exponential decay
    fn play_tone(&self, ctx: &AudioContext, tone: Tone) {
        let Some((osc, gain)) = self.create_osc(ctx, tone.freq, tone.wave) else {
            return;
        };
        let t = ctx.current_time() + 0.005 + tone.delay;
        let peak = tone.gain * MASTER_VOLUME;

        gain.gain().set_value_at_time(0.0001, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(peak.max(0.0001), t + 0.01)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, t + tone.duration)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + tone.duration + 0.02).ok();
    }
}
