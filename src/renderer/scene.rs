//! Scene composition
//!
//! Draw order: backdrop, obstacles, actor, ground line. Everything reads the
//! simulation state; nothing here mutates it.

use glam::Vec2;

use super::shapes::{circle, ellipse, polygon, quad, rect, triangle, with_alpha};
use super::vertex::{Vertex, colors};
use crate::platform::Environment;
use crate::sim::stage::ObstaclePalette;
use crate::sim::{Actor, GameState, Obstacle, ObstacleKind};

/// Ground line thickness (px)
const GROUND_LINE_WIDTH: f32 = 3.0;

/// Append the full frame
pub fn compose(state: &GameState, environment: &dyn Environment, out: &mut Vec<Vertex>) {
    environment.render(out);
    for obstacle in &state.obstacles {
        draw_obstacle(obstacle, out);
    }
    draw_actor(&state.actor, out);
    quad(
        out,
        0.0,
        state.ground_y - GROUND_LINE_WIDTH / 2.0,
        state.width,
        GROUND_LINE_WIDTH,
        colors::GROUND_LINE,
    );
}

pub fn draw_obstacle(o: &Obstacle, out: &mut Vec<Vertex>) {
    let b = o.sprite_box();
    let ObstaclePalette {
        primary,
        secondary,
        accent,
        highlight,
    } = o.stage.theme().obstacles;
    let (x, y, w, h) = (b.x, b.y, b.w, b.h);
    let center = b.center();
    // Cosmetic flicker for animated kinds
    let frame = o.anim_frame() as f32;

    match o.kind {
        ObstacleKind::Cactus => {
            quad(out, x + w * 0.35, y, w * 0.3, h, accent);
            quad(out, x, y + h * 0.3, w * 0.35, w * 0.2, accent);
            quad(out, x, y + h * 0.1, w * 0.15, h * 0.3, accent);
            quad(out, x + w * 0.65, y + h * 0.45, w * 0.35, w * 0.2, accent);
            quad(out, x + w * 0.85, y + h * 0.25, w * 0.15, h * 0.3, accent);
        }
        ObstacleKind::Rock => {
            ellipse(out, center, w / 2.0, h / 2.0, primary);
            ellipse(out, center - Vec2::new(w * 0.15, h * 0.15), w * 0.15, h * 0.15, secondary);
        }
        ObstacleKind::Log => {
            quad(out, x, y, w, h, primary);
            ellipse(out, Vec2::new(x + w, center.y), h * 0.3, h / 2.0, secondary);
            for i in 1..4 {
                quad(out, x + w * i as f32 / 4.0, y + 2.0, 1.5, h - 4.0, secondary);
            }
        }
        ObstacleKind::Vine => {
            quad(out, x + w * 0.35, y, w * 0.3, h, primary);
            for i in 0..4 {
                let leaf_y = y + h * (0.15 + 0.22 * i as f32);
                let side = if i % 2 == 0 { -1.0 } else { 1.0 };
                ellipse(out, Vec2::new(center.x + side * w * 0.3, leaf_y), w * 0.35, 4.0, accent);
            }
        }
        ObstacleKind::Tree => {
            quad(out, x + w * 0.35, y + h * 0.4, w * 0.3, h * 0.6, secondary);
            circle(out, Vec2::new(center.x, y + h * 0.3), w * 0.5, primary);
            circle(out, Vec2::new(center.x - w * 0.15, y + h * 0.25), w * 0.15, accent);
        }
        ObstacleKind::Crystal => {
            let glow = 0.5 + 0.1 * frame;
            polygon(
                out,
                &[
                    Vec2::new(center.x, y),
                    Vec2::new(x + w, y + h * 0.35),
                    Vec2::new(x + w * 0.8, y + h),
                    Vec2::new(x + w * 0.2, y + h),
                    Vec2::new(x, y + h * 0.35),
                ],
                secondary,
            );
            triangle(
                out,
                Vec2::new(center.x, y + 4.0),
                Vec2::new(x + w * 0.7, y + h * 0.4),
                Vec2::new(x + w * 0.4, y + h * 0.6),
                with_alpha(accent, glow),
            );
        }
        ObstacleKind::Shadow => {
            ellipse(out, center, w / 2.0, h / 2.0, with_alpha(primary, 0.85));
            for dx in [-0.15, 0.15] {
                circle(out, Vec2::new(center.x + w * dx, center.y - h * 0.1), 2.5, highlight);
            }
        }
        ObstacleKind::Bat => {
            let flap = if o.anim_frame() % 2 == 0 { 0.0 } else { h * 0.3 };
            ellipse(out, center, w * 0.18, h * 0.35, primary);
            triangle(
                out,
                Vec2::new(center.x - 3.0, center.y),
                Vec2::new(x, y + flap),
                Vec2::new(x + w * 0.2, center.y + h * 0.3),
                primary,
            );
            triangle(
                out,
                Vec2::new(center.x + 3.0, center.y),
                Vec2::new(x + w, y + flap),
                Vec2::new(x + w * 0.8, center.y + h * 0.3),
                primary,
            );
            circle(out, center - Vec2::new(2.0, 2.0), 1.5, highlight);
            circle(out, center + Vec2::new(2.0, -2.0), 1.5, highlight);
        }
        ObstacleKind::Icicle => {
            quad(out, x, y, w, h * 0.2, secondary);
            triangle(
                out,
                Vec2::new(x, y + h * 0.2),
                Vec2::new(x + w, y + h * 0.2),
                Vec2::new(center.x, y + h),
                primary,
            );
        }
        ObstacleKind::Snowball => {
            circle(out, center, w / 2.0, highlight);
            circle(out, center - Vec2::new(w * 0.15, w * 0.15), w * 0.12, secondary);
        }
        ObstacleKind::Ice => {
            quad(out, x, y, w, h, with_alpha(primary, 0.85));
            quad(out, x + 3.0, y + 3.0, w * 0.4, 3.0, highlight);
        }
        ObstacleKind::Fireball => {
            let pulse = 1.0 + 0.08 * frame;
            circle(out, center, w * 0.5 * pulse, with_alpha(secondary, 0.6));
            circle(out, center, w * 0.35, primary);
            circle(out, center, w * 0.18, highlight);
        }
        ObstacleKind::Lava => {
            quad(out, x, y + h * 0.3, w, h * 0.7, primary);
            for i in 0..3 {
                let bubble_x = x + w * (0.2 + 0.3 * i as f32);
                let r = 3.0 + ((frame + i as f32) % 4.0);
                circle(out, Vec2::new(bubble_x, y + h * 0.35), r, secondary);
            }
        }
        ObstacleKind::Volcano => {
            polygon(
                out,
                &[
                    Vec2::new(x, y + h),
                    Vec2::new(x + w * 0.35, y + h * 0.15),
                    Vec2::new(x + w * 0.65, y + h * 0.15),
                    Vec2::new(x + w, y + h),
                ],
                primary,
            );
            quad(out, x + w * 0.35, y + h * 0.1, w * 0.3, h * 0.08, highlight);
            circle(out, Vec2::new(center.x, y + h * 0.05 - frame), 3.0, accent);
        }
        ObstacleKind::Unknown => rect(out, b, primary),
    }
}

pub fn draw_actor(actor: &Actor, out: &mut Vec<Vertex>) {
    let b = actor.sprite_box();
    let (x, y, w, h) = (b.x, b.y, b.w, b.h);

    // Legs (hidden while ducking)
    if !actor.is_ducking() {
        let phase = actor.run_frame() as f32 * std::f32::consts::FRAC_PI_2;
        let left = phase.sin() * 5.0;
        let right = phase.cos() * 5.0;
        quad(out, x + w * 0.3 - 6.0, y + h * 0.8 + left.min(0.0), 12.0, h * 0.2, colors::ACTOR_BODY);
        quad(out, x + w * 0.6 - 6.0, y + h * 0.8 + right.min(0.0), 12.0, h * 0.2, colors::ACTOR_BODY);
    }

    // Tail
    triangle(
        out,
        Vec2::new(x + w * 0.15, y + h * 0.5),
        Vec2::new(x - w * 0.15, y + h * 0.7),
        Vec2::new(x + w * 0.2, y + h * 0.75),
        colors::ACTOR_BODY,
    );

    // Body and belly
    let body = Vec2::new(x + w / 2.0, y + h * 0.6);
    ellipse(out, body, w * 0.42, h * 0.42, colors::ACTOR_OUTLINE);
    ellipse(out, body, w * 0.4, h * 0.4, colors::ACTOR_BODY);
    ellipse(out, body + Vec2::new(0.0, h * 0.05), w * 0.25, h * 0.25, colors::ACTOR_BELLY);
    for (sx, sy, r) in [(0.3, 0.4, 4.0), (0.7, 0.5, 3.0), (0.5, 0.3, 5.0)] {
        circle(out, Vec2::new(x + w * sx, y + h * sy), r, colors::ACTOR_SPOTS);
    }

    // Head, snout and eyes
    let head_r = w * 0.35;
    let head = Vec2::new(x + w * 0.6, y + h * if actor.is_ducking() { 0.3 } else { 0.15 });
    circle(out, head, head_r + 1.5, colors::ACTOR_OUTLINE);
    circle(out, head, head_r, colors::ACTOR_BODY);
    ellipse(
        out,
        head + Vec2::new(head_r * 0.6, head_r * 0.2),
        head_r * 0.4,
        head_r * 0.25,
        colors::ACTOR_BODY,
    );
    let eye_r = 8.0_f32.min(head_r * 0.4);
    for dx in [-eye_r, eye_r] {
        let eye = head + Vec2::new(dx, -head_r * 0.2);
        if actor.is_blinking() {
            quad(out, eye.x - eye_r, eye.y - 1.0, eye_r * 2.0, 2.0, colors::ACTOR_EYE);
        } else {
            circle(out, eye, eye_r, colors::ACTOR_EYE_WHITE);
            circle(out, eye, eye_r * 0.6, colors::ACTOR_EYE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::NullEnvironment;
    use crate::renderer::Backdrop;
    use crate::sim::Stage;
    use crate::tuning::Tuning;

    fn state_with_all_kinds() -> GameState {
        let mut state = GameState::new(1200.0, 800.0, Tuning::default());
        for kind in ObstacleKind::ALL.into_iter().chain([ObstacleKind::Unknown]) {
            state.spawn_obstacle(kind);
        }
        state
    }

    #[test]
    fn test_every_obstacle_kind_draws_something() {
        let state = state_with_all_kinds();
        for o in &state.obstacles {
            let mut out = Vec::new();
            draw_obstacle(o, &mut out);
            assert!(!out.is_empty(), "{:?} drew nothing", o.kind);
            assert_eq!(out.len() % 3, 0);
        }
    }

    #[test]
    fn test_ground_line_drawn_last() {
        let state = GameState::new(1200.0, 800.0, Tuning::default());
        let mut out = Vec::new();
        compose(&state, &NullEnvironment, &mut out);
        let last = out.last().unwrap();
        assert_eq!(last.color, colors::GROUND_LINE);
        assert!((last.position[1] - (640.0 + GROUND_LINE_WIDTH / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_backdrop_drawn_first() {
        let state = state_with_all_kinds();
        let backdrop = Backdrop::new(1200.0, 800.0, Stage::new(2));
        let mut out = Vec::new();
        compose(&state, &backdrop, &mut out);
        assert_eq!(out[0].color, Stage::new(2).theme().sky[0]);
    }

    #[test]
    fn test_ducking_actor_draws_lower() {
        let mut state = GameState::new(1200.0, 800.0, Tuning::default());
        state.start();
        let top = |actor: &Actor| {
            let mut out = Vec::new();
            draw_actor(actor, &mut out);
            out.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min)
        };
        let standing = top(&state.actor);
        state.actor.duck();
        assert!(top(&state.actor) > standing);
    }
}
