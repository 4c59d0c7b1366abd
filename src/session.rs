//! Game session: the frame driver
//!
//! Owns the simulation state and every collaborator. Input handlers and the
//! frame callback both go through `&mut Session`, so there is exactly one
//! writer at a time. The loop is suspended simply by not scheduling another
//! frame once the phase leaves `Playing`.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::platform::{
    AudioService, Clock, Environment, FrameScheduler, ManualScheduler, NullAudio,
    NullEnvironment, SoundEffect, VirtualClock,
};
use crate::renderer::{Vertex, scene};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, Intent, RandomSource, Stage, tick};
use crate::tuning::Tuning;

/// What the HUD and overlay screens show
#[derive(Debug, Clone, PartialEq)]
pub struct HudInfo {
    pub score: u64,
    pub stage: String,
    pub phase: GamePhase,
    pub muted: bool,
}

pub struct Session {
    state: GameState,
    settings: Settings,
    rng: Box<dyn RandomSource>,
    audio: Box<dyn AudioService>,
    environment: Box<dyn Environment>,
    scheduler: Box<dyn FrameScheduler>,
    clock: Box<dyn Clock>,
    /// Timestamp of the previous frame; dt is measured from here
    last_time_ms: f64,
    /// A frame has been requested and not yet run
    frame_pending: bool,
}

impl Session {
    /// Headless session: null audio and backdrop, virtual clock, manual scheduler
    pub fn new(width: f32, height: f32, tuning: Tuning, seed: u64) -> Self {
        Self {
            state: GameState::new(width, height, tuning),
            settings: Settings::default(),
            rng: Box::new(Pcg32::seed_from_u64(seed)),
            audio: Box::new(NullAudio),
            environment: Box::new(NullEnvironment),
            scheduler: Box::new(ManualScheduler::new()),
            clock: Box::new(VirtualClock::default()),
            last_time_ms: 0.0,
            frame_pending: false,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.audio.set_muted(settings.is_muted());
        self.settings = settings;
        self
    }

    pub fn with_rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_audio(mut self, audio: impl AudioService + 'static) -> Self {
        self.audio = Box::new(audio);
        self.audio.set_muted(self.settings.is_muted());
        self
    }

    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Box::new(environment);
        self.environment
            .resize(self.state.width, self.state.height);
        self.environment.change_stage(self.state.stage);
        self
    }

    pub fn with_scheduler(mut self, scheduler: impl FrameScheduler + 'static) -> Self {
        self.scheduler = Box::new(scheduler);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Route one intent to the simulation (or, for mute, to the audio)
    pub fn handle_intent(&mut self, intent: Intent) -> bool {
        if intent == Intent::MuteToggle {
            let muted = self.settings.toggle_mute();
            self.audio.set_muted(muted);
            self.settings.save();
            log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
            return true;
        }

        let handled = self.state.apply_intent(intent);
        self.dispatch_events();
        handled
    }

    /// Page hidden or focus lost
    pub fn auto_pause(&mut self) -> bool {
        if !self.settings.pause_on_blur || !self.state.pause() {
            return false;
        }
        self.dispatch_events();
        true
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(width, height);
        self.environment.resize(width, height);
        log::info!("Resized to {}x{}", width, height);
    }

    /// Frame callback. Advances one tick while Playing and schedules the next.
    pub fn frame(&mut self, now_ms: f64) {
        self.frame_pending = false;
        if !self.state.is_playing() {
            return;
        }

        let max_dt = self.state.tuning.max_frame_dt_ms as f64;
        let dt = (now_ms - self.last_time_ms).clamp(0.0, max_dt) as f32;
        self.last_time_ms = now_ms;

        self.environment.update(dt, self.state.game_speed);
        tick(&mut self.state, dt, self.rng.as_mut());
        self.audio.update();
        self.dispatch_events();

        if self.state.is_playing() {
            self.request_frame();
        }
    }

    /// Append the whole scene's geometry
    pub fn render(&self, out: &mut Vec<Vertex>) {
        scene::compose(&self.state, self.environment.as_ref(), out);
    }

    pub fn hud(&self) -> HudInfo {
        HudInfo {
            score: crate::display_score(self.state.score),
            stage: self.state.stage.label(),
            phase: self.state.phase,
            muted: self.settings.is_muted(),
        }
    }

    fn request_frame(&mut self) {
        if !self.frame_pending {
            self.frame_pending = true;
            self.scheduler.schedule_next();
        }
    }

    /// Re-anchor the dt baseline so time spent outside Playing is not replayed
    fn reanchor(&mut self) {
        self.last_time_ms = self.clock.now_ms();
        self.request_frame();
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Started => {
                    self.environment.change_stage(self.state.stage);
                    self.audio.play_stage_music(self.state.stage);
                    self.reanchor();
                }
                GameEvent::Resumed => {
                    self.audio.resume();
                    self.reanchor();
                }
                GameEvent::Paused => self.audio.pause(),
                GameEvent::Jumped => self.audio.play_sound(SoundEffect::Jump),
                GameEvent::Ducked => self.audio.play_sound(SoundEffect::Duck),
                GameEvent::ObstacleSpawned { .. } => {}
                GameEvent::StageAdvanced { stage, .. } => self.stage_changed(stage),
                GameEvent::GameOver { .. } => {
                    self.audio.stop();
                    self.audio.play_sound(SoundEffect::Collision);
                }
            }
        }
    }

    fn stage_changed(&mut self, stage: Stage) {
        self.environment.change_stage(stage);
        self.audio.play_sound(SoundEffect::StageClear);
        self.audio.play_stage_music(stage);
    }
}
