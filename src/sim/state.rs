//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in [`GameState`]. Phase
//! transitions gate all other mutation.

use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::obstacle::{Obstacle, ObstacleKind};
use super::stage::Stage;
use crate::consts::{ACTOR_X_FRACTION, GROUND_FRACTION, SPAWN_MARGIN};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start
    Start,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Discrete player intents, already translated from raw device input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Jump,
    DuckStart,
    DuckEnd,
    PauseToggle,
    MuteToggle,
    Start,
    Restart,
}

/// Things that happened during a tick or intent, drained by the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    Jumped,
    Ducked,
    ObstacleSpawned { kind: ObstacleKind },
    StageAdvanced { stage: Stage, wrapped: bool },
    GameOver { score: f64, stage: Stage },
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Canvas size (pixels)
    pub width: f32,
    pub height: f32,
    /// Ground line the actor and grounded obstacles stand on
    pub ground_y: f32,
    pub tuning: Tuning,
    pub actor: Actor,
    /// Live obstacles, oldest first
    pub obstacles: Vec<Obstacle>,
    /// Never decreases during a run
    pub score: f64,
    pub stage: Stage,
    /// Grows by the wrap bonus each time stage 5 wraps to 1
    pub speed_multiplier: f32,
    /// Scroll speed in pixels per tick (`base_speed * speed_multiplier`)
    pub game_speed: f32,
    /// Time since the last spawn (ms)
    pub spawn_timer: f32,
    /// Time between the last spawn and the next (ms)
    pub spawn_interval: f32,
    /// Score at which the next stage begins
    pub next_stage_score: f64,
    /// Simulation time spent Playing (ms)
    pub elapsed_ms: f64,
    pub phase: GamePhase,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh state on the start screen
    pub fn new(width: f32, height: f32, tuning: Tuning) -> Self {
        let ground_y = height * GROUND_FRACTION;
        let actor = Actor::new(width * ACTOR_X_FRACTION, ground_y, &tuning);
        Self {
            width,
            height,
            ground_y,
            actor,
            obstacles: Vec::new(),
            score: 0.0,
            stage: Stage::FIRST,
            speed_multiplier: 1.0,
            game_speed: tuning.base_speed,
            spawn_timer: 0.0,
            spawn_interval: tuning.initial_spawn_interval_ms,
            next_stage_score: tuning.stage_score_step,
            elapsed_ms: 0.0,
            phase: GamePhase::Start,
            events: Vec::new(),
            tuning,
        }
    }

    /// Start screen -> Playing. Returns false from any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Start {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Started);
        log::info!("Run started (stage {})", self.stage.label());
        true
    }

    /// Playing <-> Paused. Returns false from any other phase.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused);
                log::info!("Paused");
                true
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::Resumed);
                log::info!("Resumed");
                true
            }
            _ => false,
        }
    }

    /// Pause only if currently playing (page hidden / focus lost)
    pub fn pause(&mut self) -> bool {
        self.phase == GamePhase::Playing && self.toggle_pause()
    }

    /// Terminal transition for the run
    pub fn game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver {
            score: self.score,
            stage: self.stage,
        });
        log::info!(
            "Game over: score {} at stage {}",
            crate::display_score(self.score),
            self.stage.label()
        );
    }

    /// Reinitialise every run value and begin a fresh run immediately
    pub fn restart(&mut self) {
        let tuning = self.tuning.clone();
        let events = std::mem::take(&mut self.events);
        *self = Self::new(self.width, self.height, tuning);
        self.events = events;
        self.start();
    }

    /// Canvas resized: recompute the ground line and re-anchor everything on it
    pub fn resize(&mut self, width: f32, height: f32) {
        let ground_y = height * GROUND_FRACTION;
        let shift = ground_y - self.ground_y;
        self.width = width;
        self.height = height;
        self.ground_y = ground_y;
        self.actor.update_ground_level(ground_y);
        for obstacle in &mut self.obstacles {
            obstacle.y += shift;
        }
    }

    /// Route one intent. Returns whether it changed anything.
    ///
    /// Jump and duck only act while playing; duck-end is always honoured.
    /// Mute is not simulation state and is handled by the session.
    pub fn apply_intent(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::Jump => {
                if self.phase == GamePhase::Playing && self.actor.jump() {
                    self.events.push(GameEvent::Jumped);
                    return true;
                }
                false
            }
            Intent::DuckStart => {
                if self.phase == GamePhase::Playing && self.actor.duck() {
                    self.events.push(GameEvent::Ducked);
                    return true;
                }
                false
            }
            Intent::DuckEnd => {
                let was_ducking = self.actor.is_ducking();
                self.actor.stop_duck();
                was_ducking
            }
            Intent::PauseToggle => self.toggle_pause(),
            Intent::Start => self.start(),
            Intent::Restart => {
                if self.phase != GamePhase::GameOver {
                    return false;
                }
                self.restart();
                true
            }
            Intent::MuteToggle => false,
        }
    }

    /// Add an obstacle of `kind` at the spawn line (just past the right edge)
    pub fn spawn_obstacle(&mut self, kind: ObstacleKind) {
        let obstacle = Obstacle::new(
            kind,
            self.width + SPAWN_MARGIN,
            self.ground_y,
            self.stage,
            self.elapsed_ms,
            &self.tuning,
        );
        log::debug!("Spawned {} at x={}", kind.tag(), obstacle.x);
        self.obstacles.push(obstacle);
        self.events.push(GameEvent::ObstacleSpawned { kind });
    }

    /// Spawn from a type tag; unknown tags get the default size
    pub fn spawn_tagged(&mut self, tag: &str) {
        self.spawn_obstacle(ObstacleKind::from_tag(tag));
    }

    /// Place a prepared obstacle directly into the live set
    pub fn insert_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(1200.0, 800.0, Tuning::default())
    }

    #[test]
    fn test_new_state_is_on_start_screen() {
        let s = state();
        assert_eq!(s.phase, GamePhase::Start);
        assert_eq!(s.score, 0.0);
        assert_eq!(s.stage, Stage::FIRST);
        assert_eq!(s.speed_multiplier, 1.0);
        assert_eq!(s.ground_y, 640.0);
        assert_eq!(s.actor.x, 120.0);
        assert_eq!(s.spawn_interval, 2000.0);
        assert_eq!(s.next_stage_score, 500.0);
    }

    #[test]
    fn test_phase_transitions() {
        let mut s = state();
        assert!(!s.toggle_pause());
        assert!(s.start());
        assert!(!s.start());
        assert!(s.toggle_pause());
        assert_eq!(s.phase, GamePhase::Paused);
        assert!(s.toggle_pause());
        assert_eq!(s.phase, GamePhase::Playing);
        s.game_over();
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(!s.toggle_pause());
        assert_eq!(
            s.drain_events(),
            vec![
                GameEvent::Started,
                GameEvent::Paused,
                GameEvent::Resumed,
                GameEvent::GameOver {
                    score: 0.0,
                    stage: Stage::FIRST
                },
            ]
        );
    }

    #[test]
    fn test_movement_intents_ignored_unless_playing() {
        let mut s = state();
        assert!(!s.apply_intent(Intent::Jump));
        assert!(!s.apply_intent(Intent::DuckStart));
        assert!(s.actor.grounded);

        s.start();
        assert!(s.apply_intent(Intent::Jump));
        assert!(!s.apply_intent(Intent::Jump));

        s.toggle_pause();
        assert!(!s.apply_intent(Intent::DuckStart));
    }

    #[test]
    fn test_duck_end_always_honoured() {
        let mut s = state();
        s.start();
        s.apply_intent(Intent::DuckStart);
        s.toggle_pause();
        assert!(s.apply_intent(Intent::DuckEnd));
        assert!(!s.actor.is_ducking());
        assert!(!s.apply_intent(Intent::DuckEnd));
    }

    #[test]
    fn test_restart_resets_everything_and_plays() {
        let mut s = state();
        s.start();
        s.score = 1234.0;
        s.stage = Stage::new(3);
        s.speed_multiplier = 2.0;
        s.spawn_obstacle(ObstacleKind::Cactus);
        assert!(!s.apply_intent(Intent::Restart));

        s.game_over();
        assert!(s.apply_intent(Intent::Restart));
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.score, 0.0);
        assert_eq!(s.stage, Stage::FIRST);
        assert_eq!(s.speed_multiplier, 1.0);
        assert!(s.obstacles.is_empty());
        assert_eq!(s.next_stage_score, 500.0);
        assert_eq!(s.drain_events().last(), Some(&GameEvent::Started));
    }

    #[test]
    fn test_spawn_at_right_edge() {
        let mut s = state();
        s.spawn_obstacle(ObstacleKind::Rock);
        assert_eq!(s.obstacles.len(), 1);
        assert_eq!(s.obstacles[0].x, 1250.0);
        assert_eq!(s.obstacles[0].y + s.obstacles[0].height, 640.0);

        s.spawn_tagged("not-a-thing");
        assert_eq!(s.obstacles[1].kind, ObstacleKind::Unknown);
        assert_eq!(s.obstacles[1].width, 30.0);
    }

    #[test]
    fn test_resize_moves_ground_and_obstacles() {
        let mut s = state();
        s.spawn_obstacle(ObstacleKind::Cactus);
        s.resize(1000.0, 500.0);
        assert_eq!(s.ground_y, 400.0);
        assert_eq!(s.actor.y + s.actor.height, 400.0);
        assert_eq!(s.obstacles[0].y + s.obstacles[0].height, 400.0);
    }

    #[test]
    fn test_pause_only_from_playing() {
        let mut s = state();
        assert!(!s.pause());
        s.start();
        assert!(s.pause());
        assert!(!s.pause());
        assert_eq!(s.phase, GamePhase::Paused);
    }
}
