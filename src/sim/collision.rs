//! Collision detection between the runner and live obstacles
//!
//! Axis-aligned rectangles only. Any overlap is fatal, so the first hit found
//! is all the tick needs.

use super::obstacle::Obstacle;
use super::rect::Rect;

/// Index of the first obstacle whose bounding rect overlaps `actor`
pub fn first_collision(actor: &Rect, obstacles: &[Obstacle]) -> Option<usize> {
    obstacles
        .iter()
        .position(|o| actor.overlaps(&o.bounding_rect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::Actor;
    use crate::sim::obstacle::ObstacleKind;
    use crate::sim::stage::Stage;
    use crate::tuning::Tuning;

    const GROUND: f32 = 640.0;

    fn obstacle(kind: ObstacleKind, x: f32) -> Obstacle {
        Obstacle::new(kind, x, GROUND, Stage::FIRST, 0.0, &Tuning::default())
    }

    fn actor() -> Actor {
        Actor::new(120.0, GROUND, &Tuning::default())
    }

    #[test]
    fn test_no_obstacles_no_collision() {
        assert_eq!(first_collision(&actor().bounding_rect(), &[]), None);
    }

    #[test]
    fn test_overlapping_cactus_collides() {
        let a = actor();
        let obstacles = vec![obstacle(ObstacleKind::Cactus, 900.0), obstacle(ObstacleKind::Cactus, 140.0)];
        assert_eq!(first_collision(&a.bounding_rect(), &obstacles), Some(1));
    }

    #[test]
    fn test_insets_forgive_near_misses() {
        let a = actor();
        // Sprite boxes touch by 8px horizontally but the insets (10 + 5) keep them apart
        let o = obstacle(ObstacleKind::Cactus, a.x + a.width - 8.0);
        assert!(a.sprite_box().overlaps(&o.sprite_box()));
        assert_eq!(first_collision(&a.bounding_rect(), &[o]), None);
    }

    #[test]
    fn test_ducking_clears_flying_bat() {
        let mut a = actor();
        let bat = obstacle(ObstacleKind::Bat, a.x);
        assert_eq!(first_collision(&a.bounding_rect(), std::slice::from_ref(&bat)), Some(0));

        a.duck();
        assert_eq!(first_collision(&a.bounding_rect(), &[bat]), None);
    }

    #[test]
    fn test_jumping_clears_low_rock() {
        let mut a = actor();
        let rock = obstacle(ObstacleKind::Rock, a.x + 10.0);
        a.jump();
        for _ in 0..10 {
            a.update(16.0);
        }
        assert_eq!(first_collision(&a.bounding_rect(), &[rock]), None);
    }
}
