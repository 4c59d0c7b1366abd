//! Audio system using Web Audio API
//!
//! Sound effects and stage melodies are synthesized; no audio files needed.

use web_sys::{
    AudioContext, AudioContextState, BiquadFilterType, GainNode, OscillatorNode, OscillatorType,
};

use crate::platform::{AudioService, SoundEffect};
use crate::settings::{AudioLevels, Settings};
use crate::sim::Stage;
use crate::sim::stage::{Melody, Waveform};

/// Melody loops are queued this far ahead of the audio clock (seconds)
const MUSIC_LOOKAHEAD: f64 = 0.1;
/// Per-note music gain before the music volume is applied
const MUSIC_NOTE_GAIN: f32 = 0.1;
/// Stage-clear arpeggio: C E G C
const STAGE_CLEAR_NOTES: [f32; 4] = [261.63, 329.63, 392.0, 523.25];

/// A stage melody that keeps looping
struct MusicLoop {
    stage: Stage,
    /// Audio-clock time of the next loop start
    next_start: f64,
    /// Every note of the current run goes through this bus
    bus: GainNode,
}

/// Web Audio implementation of [`AudioService`]
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master: Option<GainNode>,
    levels: AudioLevels,
    /// Stage whose music should be playing (kept while paused)
    stage: Option<Stage>,
    music: Option<MusicLoop>,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        let master = ctx.as_ref().and_then(|ctx| {
            let gain = ctx.create_gain().ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some(gain)
        });
        if master.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        let manager = Self {
            ctx,
            master,
            levels: settings.audio_levels(),
            stage: None,
            music: None,
        };
        manager.sync_master();
        manager
    }

    fn sync_master(&self) {
        if let Some(master) = &self.master {
            let muted = self.levels.is_muted();
            master.gain().set_value(if muted { 0.0 } else { 1.0 });
        }
    }

    /// Browsers keep the context suspended until a user gesture
    pub fn unlock(&self) {
        if let Some(ctx) = &self.ctx
            && ctx.state() == AudioContextState::Suspended
        {
            let _ = ctx.resume();
        }
    }

    /// Oscillator routed through its own gain node into `dest`
    fn create_osc(
        ctx: &AudioContext,
        dest: &GainNode,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(dest).ok()?;

        Some((osc, gain))
    }

    /// Frequency sweep with a decaying envelope (jump and duck)
    fn sweep(&self, from: f32, to: f32, sweep_secs: f64, gain_level: f32, length: f64) {
        let (Some(ctx), Some(master), Some(vol)) =
            (&self.ctx, &self.master, self.levels.sfx_gain())
        else {
            return;
        };
        let Some((osc, gain)) = Self::create_osc(ctx, master, from, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + sweep_secs)
            .ok();
        gain.gain().set_value_at_time(gain_level * vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + length)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + length).ok();
    }

    /// Low-passed noise burst with a squared fade
    fn play_collision(&self) {
        let (Some(ctx), Some(master), Some(vol)) =
            (&self.ctx, &self.master, self.levels.sfx_gain())
        else {
            return;
        };
        let length = 0.3;
        let rate = ctx.sample_rate();
        let frames = (rate * length as f32) as u32;
        let Ok(buffer) = ctx.create_buffer(1, frames, rate) else {
            return;
        };
        let mut samples: Vec<f32> = (0..frames)
            .map(|i| {
                let fade = 1.0 - i as f32 / frames as f32;
                (rand::random::<f32>() * 2.0 - 1.0) * fade * fade
            })
            .collect();
        if buffer.copy_to_channel(&mut samples, 0).is_err() {
            return;
        }

        let Ok(noise) = ctx.create_buffer_source() else {
            return;
        };
        let Ok(filter) = ctx.create_biquad_filter() else {
            return;
        };
        let Ok(gain) = ctx.create_gain() else {
            return;
        };
        noise.set_buffer(Some(&buffer));
        filter.set_type(BiquadFilterType::Lowpass);
        filter.frequency().set_value(1000.0);
        if noise.connect_with_audio_node(&filter).is_err()
            || filter.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(master).is_err()
        {
            return;
        }

        let t = ctx.current_time();
        gain.gain().set_value_at_time(0.5 * vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + length)
            .ok();
        noise.start_with_when(t).ok();
        noise.stop_with_when(t + length).ok();
    }

    /// Ascending triangle arpeggio
    fn play_stage_clear(&self) {
        let (Some(ctx), Some(master), Some(vol)) =
            (&self.ctx, &self.master, self.levels.sfx_gain())
        else {
            return;
        };
        let t = ctx.current_time();
        for (i, freq) in STAGE_CLEAR_NOTES.iter().enumerate() {
            let Some((osc, gain)) = Self::create_osc(ctx, master, *freq, OscillatorType::Triangle)
            else {
                continue;
            };
            let start = t + i as f64 * 0.1;
            gain.gain().set_value_at_time(0.3 * vol, start).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, start + 0.3)
                .ok();
            osc.start_with_when(start).ok();
            osc.stop_with_when(start + 0.3).ok();
        }
    }

    /// Queue one pass of `melody` starting at `start`
    fn schedule_melody(&self, melody: &Melody, bus: &GainNode, start: f64) {
        let (Some(ctx), Some(volume)) = (&self.ctx, self.levels.music_gain()) else {
            return;
        };
        let level = volume * MUSIC_NOTE_GAIN;
        let mut t = start;
        for note in melody.notes {
            let Some((osc, gain)) =
                Self::create_osc(ctx, bus, note.freq, oscillator_type(melody.waveform))
            else {
                continue;
            };
            let duration = f64::from(note.duration);
            gain.gain().set_value_at_time(level, t).ok();
            gain.gain().set_value_at_time(level, t + duration * 0.9).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + duration)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + duration).ok();
            t += duration;
        }
    }

    /// Begin looping `stage`'s melody from now
    fn start_music(&mut self, stage: Stage) {
        self.silence_music();
        if self.levels.music_gain().is_none() {
            return;
        }
        let (Some(ctx), Some(master)) = (&self.ctx, &self.master) else {
            return;
        };
        let Ok(bus) = ctx.create_gain() else { return };
        if bus.connect_with_audio_node(master).is_err() {
            return;
        }
        self.music = Some(MusicLoop {
            stage,
            next_start: ctx.current_time(),
            bus,
        });
        self.update();
    }

    /// Cut queued notes by detaching the current music bus
    fn silence_music(&mut self) {
        if let Some(music) = self.music.take() {
            music.bus.disconnect().ok();
        }
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Triangle => OscillatorType::Triangle,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Square => OscillatorType::Square,
    }
}

impl AudioService for AudioManager {
    fn play_sound(&mut self, effect: SoundEffect) {
        self.unlock();
        match effect {
            SoundEffect::Jump => self.sweep(200.0, 600.0, 0.1, 0.3, 0.2),
            SoundEffect::Duck => self.sweep(400.0, 150.0, 0.1, 0.2, 0.15),
            SoundEffect::Collision => self.play_collision(),
            SoundEffect::StageClear => self.play_stage_clear(),
        }
    }

    fn play_stage_music(&mut self, stage: Stage) {
        self.unlock();
        self.stage = Some(stage);
        log::debug!("Music: {}", stage.name());
        self.start_music(stage);
    }

    fn pause(&mut self) {
        self.silence_music();
    }

    fn resume(&mut self) {
        if let Some(stage) = self.stage {
            self.start_music(stage);
        }
    }

    fn stop(&mut self) {
        self.stage = None;
        self.silence_music();
    }

    fn set_muted(&mut self, muted: bool) {
        self.levels.set_muted(muted);
        self.sync_master();
        if muted {
            self.silence_music();
        } else if let Some(stage) = self.stage {
            self.start_music(stage);
        }
    }

    fn update(&mut self) {
        let Some(ctx) = &self.ctx else { return };
        let now = ctx.current_time();
        let Some(music) = &self.music else { return };
        if now + MUSIC_LOOKAHEAD < music.next_start {
            return;
        }
        let melody = music.stage.theme().melody;
        // A throttled tab may fall behind; never schedule in the past
        let start = music.next_start.max(now);
        self.schedule_melody(&melody, &music.bus, start);
        if let Some(music) = &mut self.music {
            music.next_start = start + f64::from(melody.loop_secs);
        }
    }
}
