//! Dino Runner - An endless-runner arcade game
//!
//! Core modules:
//! - `sim`: Simulation core (actor physics, obstacles, collisions, stage progression)
//! - `session`: Frame driver that owns the simulation and its collaborators
//! - `renderer`: Parallax backdrop and WebGPU rendering pipeline
//! - `platform`: Collaborator traits (audio, environment, scheduling, clock) and input mapping
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use session::Session;
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Number of themed stages before the cycle wraps
    pub const STAGE_COUNT: u8 = 5;

    /// Ground line as a fraction of canvas height (measured from the top)
    pub const GROUND_FRACTION: f32 = 0.8;
    /// Actor's fixed horizontal position as a fraction of canvas width
    pub const ACTOR_X_FRACTION: f32 = 0.1;

    /// Obstacles spawn this far past the right edge
    pub const SPAWN_MARGIN: f32 = 50.0;

    /// Fallback dimensions for obstacle tags missing from the table
    pub const DEFAULT_OBSTACLE_WIDTH: f32 = 30.0;
    pub const DEFAULT_OBSTACLE_HEIGHT: f32 = 30.0;

    /// Canvas size used before the first resize
    pub const DEFAULT_WIDTH: f32 = 1200.0;
    pub const DEFAULT_HEIGHT: f32 = 800.0;
}

/// Floor a score for display (HUD, game-over screen)
#[inline]
pub fn display_score(score: f64) -> u64 {
    if score.is_finite() && score > 0.0 {
        score.floor() as u64
    } else {
        0
    }
}
