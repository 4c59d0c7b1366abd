//! Platform abstraction layer
//!
//! The simulation core reaches the outside world only through these traits:
//! - `AudioService`: sound cues and stage music
//! - `Environment`: the scrolling backdrop
//! - `FrameScheduler`: requests the next frame callback
//! - `Clock`: frame timestamps
//!
//! Collaborators are fire-and-forget. They never fail a frame; implementations
//! swallow and log their own errors.

pub mod input;

use std::cell::Cell;
use std::rc::Rc;

use crate::renderer::Vertex;
use crate::sim::Stage;

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    Duck,
    Collision,
    StageClear,
}

/// Sound effects and background music
pub trait AudioService {
    fn play_sound(&mut self, effect: SoundEffect);
    /// Switch the looping melody to `stage`
    fn play_stage_music(&mut self, stage: Stage);
    fn pause(&mut self);
    fn resume(&mut self);
    /// Stop music entirely
    fn stop(&mut self);
    fn set_muted(&mut self, muted: bool);
    /// Called once per frame; schedules further melody loops
    fn update(&mut self) {}
}

/// Scrolling scenery behind the simulation
pub trait Environment {
    fn resize(&mut self, width: f32, height: f32);
    /// Advance by `dt` ms at scroll `speed` (pixels per tick)
    fn update(&mut self, dt: f32, speed: f32);
    fn change_stage(&mut self, stage: Stage);
    /// Append this frame's geometry
    fn render(&self, out: &mut Vec<Vertex>);
}

/// Requests exactly one future call of the frame callback
pub trait FrameScheduler {
    fn schedule_next(&mut self);
}

/// Millisecond timestamps, monotonic
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Audio that does nothing (headless runs, audio unavailable)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioService for NullAudio {
    fn play_sound(&mut self, _effect: SoundEffect) {}
    fn play_stage_music(&mut self, _stage: Stage) {}
    fn pause(&mut self) {}
    fn resume(&mut self) {}
    fn stop(&mut self) {}
    fn set_muted(&mut self, _muted: bool) {}
}

/// Backdrop that draws nothing
#[derive(Debug, Default)]
pub struct NullEnvironment;

impl Environment for NullEnvironment {
    fn resize(&mut self, _width: f32, _height: f32) {}
    fn update(&mut self, _dt: f32, _speed: f32) {}
    fn change_stage(&mut self, _stage: Stage) {}
    fn render(&self, _out: &mut Vec<Vertex>) {}
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<f64>>,
}

impl VirtualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Scheduler that only records requests. The driver polls `take_pending`.
/// Clones share the same pending flag.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending: Rc<Cell<bool>>,
    requests: Rc<Cell<u32>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame was requested; clears the request
    pub fn take_pending(&self) -> bool {
        self.pending.replace(false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Total requests ever made
    pub fn requests(&self) -> u32 {
        self.requests.get()
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_next(&mut self) {
        self.pending.set(true);
        self.requests.set(self.requests.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_is_shared() {
        let clock = VirtualClock::new(1000.0);
        let view = clock.clone();
        clock.advance(16.0);
        assert_eq!(view.now_ms(), 1016.0);
        view.set(5.0);
        assert_eq!(clock.now_ms(), 5.0);
    }

    #[test]
    fn test_manual_scheduler_take_pending() {
        let handle = ManualScheduler::new();
        let mut scheduler = handle.clone();
        assert!(!handle.take_pending());
        scheduler.schedule_next();
        scheduler.schedule_next();
        assert!(handle.is_pending());
        assert!(handle.take_pending());
        assert!(!handle.take_pending());
        assert_eq!(handle.requests(), 2);
    }
}
