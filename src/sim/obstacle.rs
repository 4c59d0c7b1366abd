//! Obstacles: the hazards the runner must clear
//!
//! Each kind maps to fixed dimensions and flags through [`ObstacleKind::spec`].
//! Obstacles scroll left by the current scroll speed every tick and are
//! dropped once fully past the left edge.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::stage::Stage;
use crate::consts::{DEFAULT_OBSTACLE_HEIGHT, DEFAULT_OBSTACLE_WIDTH};
use crate::tuning::Tuning;

/// Collision inset on every side of an obstacle's sprite box
pub const OBSTACLE_INSET: f32 = 5.0;

/// Animation frame duration (ms)
const ANIM_FRAME_MS: f32 = 200.0;
const ANIM_FRAMES: u8 = 4;

/// Obstacle types across all stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    // Sunny Desert
    Cactus,
    Rock,
    // Jungle Trail
    Log,
    Vine,
    Tree,
    // Moonlit Night
    Crystal,
    Shadow,
    Bat,
    // Snowy Mountains
    Icicle,
    Snowball,
    Ice,
    // Lava Volcano
    Fireball,
    Lava,
    Volcano,
    /// Unrecognised tag: default size, drawn as a plain block
    Unknown,
}

/// Fixed per-kind properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSpec {
    pub width: f32,
    pub height: f32,
    /// Airborne hazards float above the ground and bob vertically
    pub flying: bool,
}

impl ObstacleSpec {
    const fn ground(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            flying: false,
        }
    }

    const fn flying(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            flying: true,
        }
    }
}

impl ObstacleKind {
    /// All spawnable kinds (excludes `Unknown`)
    pub const ALL: [ObstacleKind; 14] = [
        ObstacleKind::Cactus,
        ObstacleKind::Rock,
        ObstacleKind::Log,
        ObstacleKind::Vine,
        ObstacleKind::Tree,
        ObstacleKind::Crystal,
        ObstacleKind::Shadow,
        ObstacleKind::Bat,
        ObstacleKind::Icicle,
        ObstacleKind::Snowball,
        ObstacleKind::Ice,
        ObstacleKind::Fireball,
        ObstacleKind::Lava,
        ObstacleKind::Volcano,
    ];

    pub const fn spec(self) -> ObstacleSpec {
        match self {
            ObstacleKind::Cactus => ObstacleSpec::ground(30.0, 60.0),
            ObstacleKind::Rock => ObstacleSpec::ground(40.0, 25.0),
            ObstacleKind::Log => ObstacleSpec::ground(50.0, 20.0),
            ObstacleKind::Vine => ObstacleSpec::ground(15.0, 80.0),
            ObstacleKind::Tree => ObstacleSpec::ground(35.0, 70.0),
            ObstacleKind::Crystal => ObstacleSpec::ground(25.0, 45.0),
            ObstacleKind::Shadow => ObstacleSpec::ground(45.0, 30.0),
            ObstacleKind::Bat => ObstacleSpec::flying(35.0, 25.0),
            ObstacleKind::Icicle => ObstacleSpec::ground(20.0, 50.0),
            ObstacleKind::Snowball => ObstacleSpec::ground(35.0, 35.0),
            ObstacleKind::Ice => ObstacleSpec::ground(40.0, 20.0),
            ObstacleKind::Fireball => ObstacleSpec::flying(30.0, 30.0),
            ObstacleKind::Lava => ObstacleSpec::ground(60.0, 15.0),
            ObstacleKind::Volcano => ObstacleSpec::ground(45.0, 55.0),
            ObstacleKind::Unknown => {
                ObstacleSpec::ground(DEFAULT_OBSTACLE_WIDTH, DEFAULT_OBSTACLE_HEIGHT)
            }
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            ObstacleKind::Cactus => "cactus",
            ObstacleKind::Rock => "rock",
            ObstacleKind::Log => "log",
            ObstacleKind::Vine => "vine",
            ObstacleKind::Tree => "tree",
            ObstacleKind::Crystal => "crystal",
            ObstacleKind::Shadow => "shadow",
            ObstacleKind::Bat => "bat",
            ObstacleKind::Icicle => "icicle",
            ObstacleKind::Snowball => "snowball",
            ObstacleKind::Ice => "ice",
            ObstacleKind::Fireball => "fireball",
            ObstacleKind::Lava => "lava",
            ObstacleKind::Volcano => "volcano",
            ObstacleKind::Unknown => "unknown",
        }
    }

    /// Parse a type tag. Unrecognised tags map to `Unknown` (default size).
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        match Self::ALL.iter().find(|k| k.tag() == tag) {
            Some(kind) => *kind,
            None => {
                log::warn!("Unknown obstacle type '{}', using default size", tag);
                ObstacleKind::Unknown
            }
        }
    }
}

/// A live obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Stage the obstacle spawned in (selects its palette)
    pub stage: Stage,
    /// Left edge of the sprite box
    pub x: f32,
    /// Top edge of the sprite box before the float offset
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub flying: bool,
    /// Simulation time at spawn (ms)
    pub spawn_time_ms: f64,
    /// Time alive (ms); drives the float bob
    pub age_ms: f32,
    /// Current vertical bob (flying kinds only)
    pub float_offset: f32,

    float_amplitude: f32,
    float_frequency: f32,
    anim_frame: u8,
    anim_timer: f32,
}

impl Obstacle {
    pub fn new(
        kind: ObstacleKind,
        x: f32,
        ground_y: f32,
        stage: Stage,
        spawn_time_ms: f64,
        tuning: &Tuning,
    ) -> Self {
        let spec = kind.spec();
        let mut y = ground_y - spec.height;
        if spec.flying {
            y -= tuning.flying_height;
        }
        Self {
            kind,
            stage,
            x,
            y,
            width: spec.width,
            height: spec.height,
            flying: spec.flying,
            spawn_time_ms,
            age_ms: 0.0,
            float_offset: 0.0,
            float_amplitude: tuning.float_amplitude,
            float_frequency: tuning.float_frequency,
            anim_frame: 0,
            anim_timer: 0.0,
        }
    }

    /// Advance one tick. `scroll_speed` is pixels per tick, not scaled by `dt`.
    pub fn update(&mut self, dt: f32, scroll_speed: f32) {
        self.x -= scroll_speed;

        self.anim_timer += dt;
        if self.anim_timer >= ANIM_FRAME_MS {
            self.anim_frame = (self.anim_frame + 1) % ANIM_FRAMES;
            self.anim_timer = 0.0;
        }

        self.age_ms += dt;
        if self.flying {
            self.float_offset = (self.age_ms * self.float_frequency).sin() * self.float_amplitude;
        }
    }

    /// Visual extent including the float bob
    pub fn sprite_box(&self) -> Rect {
        Rect::new(self.x, self.y + self.float_offset, self.width, self.height)
    }

    /// Collision rectangle, inset from the sprite box
    pub fn bounding_rect(&self) -> Rect {
        self.sprite_box().inset(OBSTACLE_INSET, OBSTACLE_INSET)
    }

    /// Fully past the left edge
    pub fn is_off_screen(&self) -> bool {
        self.x + self.width < 0.0
    }

    pub fn anim_frame(&self) -> u8 {
        self.anim_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: f32 = 640.0;

    fn spawn(kind: ObstacleKind, x: f32) -> Obstacle {
        Obstacle::new(kind, x, GROUND, Stage::FIRST, 0.0, &Tuning::default())
    }

    #[test]
    fn test_dimension_table() {
        assert_eq!(ObstacleKind::Cactus.spec(), ObstacleSpec::ground(30.0, 60.0));
        assert_eq!(ObstacleKind::Lava.spec(), ObstacleSpec::ground(60.0, 15.0));
        assert!(ObstacleKind::Bat.spec().flying);
        assert!(ObstacleKind::Fireball.spec().flying);
        let flying: Vec<_> = ObstacleKind::ALL
            .iter()
            .filter(|k| k.spec().flying)
            .collect();
        assert_eq!(flying.len(), 2);
    }

    #[test]
    fn test_tags_round_trip() {
        for kind in ObstacleKind::ALL {
            assert_eq!(ObstacleKind::from_tag(kind.tag()), kind);
        }
        assert_eq!(ObstacleKind::from_tag(" Cactus "), ObstacleKind::Cactus);
    }

    #[test]
    fn test_unknown_tag_gets_default_size() {
        let kind = ObstacleKind::from_tag("dragon");
        assert_eq!(kind, ObstacleKind::Unknown);
        let o = spawn(kind, 500.0);
        assert_eq!(o.width, DEFAULT_OBSTACLE_WIDTH);
        assert_eq!(o.height, DEFAULT_OBSTACLE_HEIGHT);
        assert!(!o.flying);
    }

    #[test]
    fn test_ground_obstacle_sits_on_ground() {
        let o = spawn(ObstacleKind::Cactus, 500.0);
        assert_eq!(o.y + o.height, GROUND);
        assert_eq!(o.bounding_rect(), Rect::new(505.0, GROUND - 60.0 + 5.0, 20.0, 50.0));
    }

    #[test]
    fn test_flying_obstacle_is_raised() {
        let o = spawn(ObstacleKind::Bat, 500.0);
        assert_eq!(o.y, GROUND - 25.0 - 60.0);
    }

    #[test]
    fn test_update_scrolls_by_speed_not_dt() {
        let mut o = spawn(ObstacleKind::Rock, 500.0);
        o.update(16.0, 4.0);
        assert_eq!(o.x, 496.0);
        o.update(100.0, 4.0);
        assert_eq!(o.x, 492.0);
        o.update(16.0, 6.0);
        assert_eq!(o.x, 486.0);
    }

    #[test]
    fn test_float_offset_moves_bounding_rect() {
        let mut o = spawn(ObstacleKind::Bat, 500.0);
        // Quarter period of sin(t * 0.005) is ~314 ms
        o.update(314.159, 0.0);
        assert!((o.float_offset - 10.0).abs() < 0.01);
        assert!((o.bounding_rect().y - (o.y + 10.0 + 5.0)).abs() < 0.01);
    }

    #[test]
    fn test_ground_obstacles_do_not_bob() {
        let mut o = spawn(ObstacleKind::Volcano, 500.0);
        let y = o.bounding_rect().y;
        o.update(314.159, 4.0);
        assert_eq!(o.float_offset, 0.0);
        assert_eq!(o.bounding_rect().y, y);
    }

    #[test]
    fn test_off_screen_only_when_fully_past_left_edge() {
        let mut o = spawn(ObstacleKind::Cactus, -29.0);
        assert!(!o.is_off_screen());
        o.update(16.0, 1.0);
        assert!(!o.is_off_screen()); // x + width == 0
        o.update(16.0, 0.5);
        assert!(o.is_off_screen());
    }
}
