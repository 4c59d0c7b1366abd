//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform code:
//! - Time only arrives as `dt` (milliseconds) passed to `tick`
//! - Randomness only through an injected `RandomSource`
//! - Collaborators (audio, backdrop) are reached through queued `GameEvent`s
//! - No rendering or platform dependencies

pub mod actor;
pub mod collision;
pub mod obstacle;
pub mod rect;
pub mod rng;
pub mod stage;
pub mod state;
pub mod tick;

pub use actor::{Actor, Posture};
pub use collision::first_collision;
pub use obstacle::{Obstacle, ObstacleKind, ObstacleSpec};
pub use rect::Rect;
pub use rng::{RandomSource, ScriptedRandom};
pub use stage::{Stage, StageTheme};
pub use state::{GameEvent, GamePhase, GameState, Intent};
pub use tick::tick;
