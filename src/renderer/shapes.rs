//! Shape generation for 2D primitives
//!
//! Every helper appends triangles (canvas pixels, y down) to `out`.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::vertex::Vertex;
use crate::sim::Rect;
use crate::sim::stage::Color;

/// Same colour with a different alpha
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], alpha]
}

/// Filled axis-aligned rectangle
pub fn quad(out: &mut Vec<Vertex>, x: f32, y: f32, w: f32, h: f32, color: Color) {
    gradient_quad(out, x, y, w, h, color, color);
}

pub fn rect(out: &mut Vec<Vertex>, r: Rect, color: Color) {
    quad(out, r.x, r.y, r.w, r.h, color);
}

/// Rectangle blending from `top` to `bottom`
pub fn gradient_quad(
    out: &mut Vec<Vertex>,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    top: Color,
    bottom: Color,
) {
    let (x1, y1) = (x + w, y + h);
    out.extend_from_slice(&[
        Vertex::new(x, y, top),
        Vertex::new(x1, y, top),
        Vertex::new(x, y1, bottom),
        Vertex::new(x, y1, bottom),
        Vertex::new(x1, y, top),
        Vertex::new(x1, y1, bottom),
    ]);
}

pub fn triangle(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: Color) {
    out.extend_from_slice(&[
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]);
}

/// Convex polygon as a triangle fan around its first point
pub fn polygon(out: &mut Vec<Vertex>, points: &[Vec2], color: Color) {
    if points.len() < 3 {
        return;
    }
    for pair in points[1..].windows(2) {
        triangle(out, points[0], pair[0], pair[1], color);
    }
}

/// Thick line segment
pub fn line(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, width: f32, color: Color) {
    let dir = (b - a).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    polygon(out, &[a + perp, b + perp, b - perp, a - perp], color);
}

/// Filled elliptical sector between two angles (radians, clockwise on screen)
#[allow(clippy::too_many_arguments)]
pub fn ellipse_arc(
    out: &mut Vec<Vertex>,
    center: Vec2,
    rx: f32,
    ry: f32,
    start: f32,
    end: f32,
    color: Color,
    segments: u32,
) {
    let segments = segments.max(3);
    let span = end - start;
    for i in 0..segments {
        let t1 = start + span * (i as f32 / segments as f32);
        let t2 = start + span * ((i + 1) as f32 / segments as f32);
        triangle(
            out,
            center,
            center + Vec2::new(rx * t1.cos(), ry * t1.sin()),
            center + Vec2::new(rx * t2.cos(), ry * t2.sin()),
            color,
        );
    }
}

pub fn ellipse(out: &mut Vec<Vertex>, center: Vec2, rx: f32, ry: f32, color: Color) {
    ellipse_arc(out, center, rx, ry, 0.0, TAU, color, segments_for(rx.max(ry)));
}

/// Lower half of an ellipse (the canvas `0..PI` sweep)
pub fn half_ellipse(out: &mut Vec<Vertex>, center: Vec2, rx: f32, ry: f32, color: Color) {
    ellipse_arc(out, center, rx, ry, 0.0, PI, color, segments_for(rx.max(ry)) / 2);
}

pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: Color) {
    ellipse(out, center, radius, radius, color);
}

/// Fewer segments for small shapes
fn segments_for(radius: f32) -> u32 {
    ((radius * 0.8) as u32).clamp(8, 48)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_quad_covers_corners() {
        let mut out = Vec::new();
        quad(&mut out, 10.0, 20.0, 30.0, 40.0, RED);
        assert_eq!(out.len(), 6);
        let xs: Vec<f32> = out.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = out.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 10.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 40.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), 20.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 60.0);
    }

    #[test]
    fn test_gradient_colours_by_row() {
        let mut out = Vec::new();
        let blue = [0.0, 0.0, 1.0, 1.0];
        gradient_quad(&mut out, 0.0, 0.0, 10.0, 10.0, RED, blue);
        for v in &out {
            let expected = if v.position[1] == 0.0 { RED } else { blue };
            assert_eq!(v.color, expected);
        }
    }

    #[test]
    fn test_polygon_fan() {
        let mut out = Vec::new();
        polygon(&mut out, &[Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y], RED);
        assert_eq!(out.len(), 6);
        polygon(&mut out, &[Vec2::ZERO, Vec2::X], RED);
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn test_circle_stays_within_radius() {
        let mut out = Vec::new();
        let c = Vec2::new(50.0, 50.0);
        circle(&mut out, c, 20.0, RED);
        assert_eq!(out.len() % 3, 0);
        for v in &out {
            let p = Vec2::from(v.position);
            assert!(p.distance(c) <= 20.0 + 1e-3);
        }
    }

    #[test]
    fn test_half_ellipse_is_below_center() {
        let mut out = Vec::new();
        half_ellipse(&mut out, Vec2::new(0.0, 100.0), 50.0, 10.0, RED);
        assert!(out.iter().all(|v| v.position[1] >= 100.0 - 1e-3));
    }

    #[test]
    fn test_with_alpha() {
        assert_eq!(with_alpha(RED, 0.25), [1.0, 0.0, 0.0, 0.25]);
    }
}
