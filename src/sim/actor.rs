//! The player-controlled runner
//!
//! Physics is per tick (not dt-scaled): gravity is added to the vertical
//! velocity once per update and the velocity is added to `y` once per update.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::tuning::Tuning;

/// Horizontal collision inset on each side of the sprite box
pub const ACTOR_INSET_X: f32 = 10.0;
/// Vertical collision inset on each side of the sprite box
pub const ACTOR_INSET_Y: f32 = 5.0;

/// Run-cycle frame duration (ms)
const RUN_FRAME_MS: f32 = 150.0;
/// Frames in the run cycle
const RUN_FRAMES: u8 = 4;
/// Eyes stay closed this long (ms)
const BLINK_DURATION_MS: f32 = 150.0;
/// First blink happens after this long (ms)
const FIRST_BLINK_MS: f32 = 2000.0;

/// Mutually exclusive movement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Posture {
    #[default]
    Standing,
    Jumping,
    Ducking,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Left edge of the sprite box (fixed for the whole run)
    pub x: f32,
    /// Top edge of the standing sprite box
    pub y: f32,
    pub vel_y: f32,
    pub width: f32,
    pub height: f32,
    /// Ground line the actor stands on
    pub ground_y: f32,
    pub posture: Posture,
    pub grounded: bool,

    gravity: f32,
    jump_impulse: f32,
    duck_height_ratio: f32,

    // Cosmetic only
    run_frame: u8,
    run_timer: f32,
    blink_timer: f32,
    blink_interval: f32,
    blink_remaining: f32,
    blink_count: u32,
}

impl Actor {
    pub fn new(x: f32, ground_y: f32, tuning: &Tuning) -> Self {
        Self {
            x,
            y: ground_y - tuning.actor_height,
            vel_y: 0.0,
            width: tuning.actor_width,
            height: tuning.actor_height,
            ground_y,
            posture: Posture::Standing,
            grounded: true,
            gravity: tuning.gravity,
            jump_impulse: tuning.jump_impulse,
            duck_height_ratio: tuning.duck_height_ratio,
            run_frame: 0,
            run_timer: 0.0,
            blink_timer: 0.0,
            blink_interval: FIRST_BLINK_MS,
            blink_remaining: 0.0,
            blink_count: 0,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.posture == Posture::Jumping
    }

    pub fn is_ducking(&self) -> bool {
        self.posture == Posture::Ducking
    }

    /// Start a jump. Returns false (and does nothing) when airborne or ducking.
    pub fn jump(&mut self) -> bool {
        if !self.grounded || self.is_ducking() {
            return false;
        }
        self.vel_y = self.jump_impulse;
        self.posture = Posture::Jumping;
        self.grounded = false;
        true
    }

    /// Start ducking. Returns false (and does nothing) when airborne.
    pub fn duck(&mut self) -> bool {
        if !self.grounded {
            return false;
        }
        self.posture = Posture::Ducking;
        true
    }

    /// Stop ducking. Leaves a jump in progress untouched.
    pub fn stop_duck(&mut self) {
        if self.is_ducking() {
            self.posture = Posture::Standing;
        }
    }

    /// Advance one tick
    pub fn update(&mut self, dt: f32) {
        if self.posture == Posture::Standing {
            self.run_timer += dt;
            if self.run_timer >= RUN_FRAME_MS {
                self.run_frame = (self.run_frame + 1) % RUN_FRAMES;
                self.run_timer = 0.0;
            }
        }

        if self.is_jumping() {
            self.vel_y += self.gravity;
            self.y += self.vel_y;

            let standing_top = self.ground_y - self.height;
            if self.y >= standing_top {
                self.y = standing_top;
                self.vel_y = 0.0;
                self.posture = Posture::Standing;
                self.grounded = true;
            }
        }

        self.update_blink(dt);
    }

    fn update_blink(&mut self, dt: f32) {
        if self.blink_remaining > 0.0 {
            self.blink_remaining = (self.blink_remaining - dt).max(0.0);
        }

        self.blink_timer += dt;
        if self.blink_timer >= self.blink_interval {
            self.blink_remaining = BLINK_DURATION_MS;
            self.blink_timer = 0.0;
            self.blink_count = self.blink_count.wrapping_add(1);
            // Hash-spread the next interval over [1500, 3500) ms
            let hash = self.blink_count.wrapping_mul(2654435761);
            self.blink_interval = 1500.0 + (hash % 2000) as f32;
        }
    }

    /// Full visual extent. Ducking shrinks the box and re-anchors it to the ground.
    pub fn sprite_box(&self) -> Rect {
        if self.is_ducking() {
            let h = self.height * self.duck_height_ratio;
            Rect::new(self.x, self.ground_y - h, self.width, h)
        } else {
            Rect::new(self.x, self.y, self.width, self.height)
        }
    }

    /// Collision rectangle, inset from the sprite box
    pub fn bounding_rect(&self) -> Rect {
        self.sprite_box().inset(ACTOR_INSET_X, ACTOR_INSET_Y)
    }

    /// Move the ground line (canvas resize). A grounded actor follows it.
    pub fn update_ground_level(&mut self, ground_y: f32) {
        self.ground_y = ground_y;
        if self.grounded {
            self.y = ground_y - self.height;
        }
    }

    /// Current run-cycle frame (0..4), for leg animation
    pub fn run_frame(&self) -> u8 {
        self.run_frame
    }

    pub fn is_blinking(&self) -> bool {
        self.blink_remaining > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: f32 = 640.0;

    fn actor() -> Actor {
        Actor::new(120.0, GROUND, &Tuning::default())
    }

    #[test]
    fn test_new_actor_stands_on_ground() {
        let a = actor();
        assert_eq!(a.posture, Posture::Standing);
        assert!(a.grounded);
        assert_eq!(a.y + a.height, GROUND);
        assert_eq!(a.vel_y, 0.0);
    }

    #[test]
    fn test_jump_sets_impulse() {
        let mut a = actor();
        assert!(a.jump());
        assert_eq!(a.posture, Posture::Jumping);
        assert!(!a.grounded);
        assert_eq!(a.vel_y, -16.0);
    }

    #[test]
    fn test_jump_ignored_while_airborne() {
        let mut a = actor();
        a.jump();
        a.update(16.0);
        let vel = a.vel_y;
        assert!(!a.jump());
        assert_eq!(a.vel_y, vel);
    }

    #[test]
    fn test_jump_ignored_while_ducking() {
        let mut a = actor();
        assert!(a.duck());
        assert!(!a.jump());
        assert_eq!(a.posture, Posture::Ducking);
        assert!(a.grounded);
        assert_eq!(a.vel_y, 0.0);
    }

    #[test]
    fn test_duck_ignored_while_airborne() {
        let mut a = actor();
        a.jump();
        assert!(!a.duck());
        assert_eq!(a.posture, Posture::Jumping);
    }

    #[test]
    fn test_stop_duck_is_always_safe() {
        let mut a = actor();
        a.stop_duck();
        assert_eq!(a.posture, Posture::Standing);

        a.duck();
        a.stop_duck();
        assert_eq!(a.posture, Posture::Standing);

        a.jump();
        a.stop_duck();
        assert_eq!(a.posture, Posture::Jumping);
    }

    #[test]
    fn test_jump_arc_lands_on_ground() {
        let mut a = actor();
        a.jump();
        let mut ticks = 0;
        let mut apex = a.y;
        while !a.grounded && ticks < 100 {
            a.update(16.0);
            apex = apex.min(a.y);
            ticks += 1;
            assert!(a.y + a.height <= GROUND + 0.001);
        }
        assert!(a.grounded);
        assert!((38..=41).contains(&ticks), "landed after {} ticks", ticks);
        assert_eq!(a.posture, Posture::Standing);
        assert_eq!(a.vel_y, 0.0);
        assert_eq!(a.y, GROUND - a.height);
        // Peak height for impulse 16 and gravity 0.8 is ~150 px
        assert!(GROUND - a.height - apex > 140.0);
    }

    #[test]
    fn test_ducking_box_is_sixty_percent_from_ground() {
        let mut a = actor();
        let standing = a.sprite_box();
        a.duck();
        let ducking = a.sprite_box();
        assert!((ducking.h - standing.h * 0.6).abs() < 1e-4);
        assert!((ducking.y - (GROUND - standing.h * 0.6)).abs() < 1e-4);
        assert_eq!(ducking.bottom(), GROUND);
    }

    #[test]
    fn test_bounding_rect_is_inset() {
        let mut a = actor();
        let r = a.bounding_rect();
        assert_eq!(r, Rect::new(130.0, GROUND - 80.0 + 5.0, 40.0, 70.0));

        a.duck();
        let r = a.bounding_rect();
        assert!((r.h - 38.0).abs() < 1e-4);
        assert!((r.y - (GROUND - 48.0 + 5.0)).abs() < 1e-4);
    }

    #[test]
    fn test_ground_level_follows_resize() {
        let mut a = actor();
        a.update_ground_level(400.0);
        assert_eq!(a.y, 400.0 - a.height);

        a.jump();
        let y = a.y;
        a.update_ground_level(500.0);
        assert_eq!(a.y, y);
        assert_eq!(a.ground_y, 500.0);
    }

    #[test]
    fn test_run_cycle_only_advances_when_standing() {
        let mut a = actor();
        a.update(RUN_FRAME_MS);
        assert_eq!(a.run_frame(), 1);

        a.duck();
        a.update(RUN_FRAME_MS);
        a.update(RUN_FRAME_MS);
        assert_eq!(a.run_frame(), 1);
    }

    #[test]
    fn test_blink_is_brief() {
        let mut a = actor();
        a.update(FIRST_BLINK_MS);
        assert!(a.is_blinking());
        a.update(BLINK_DURATION_MS);
        assert!(!a.is_blinking());
    }
}
