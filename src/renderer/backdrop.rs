//! Parallax backdrop
//!
//! Six layers scroll at different fractions of the game speed. Each layer's
//! offset wraps back to zero once it has travelled a full canvas width. What
//! the layers draw depends on the current stage's theme.

use glam::Vec2;
use std::f32::consts::TAU;

use super::shapes::{
    circle, ellipse, gradient_quad, half_ellipse, line, polygon, quad, triangle, with_alpha,
};
use super::vertex::Vertex;
use crate::platform::Environment;
use crate::sim::stage::{Stage, StageTheme};

/// Backdrop layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Sky,
    Mountains,
    Clouds,
    Midground,
    Foreground,
    Particles,
}

/// Scroll factor per layer, back to front
pub const LAYERS: [(LayerKind, f32); 6] = [
    (LayerKind::Sky, 0.0),
    (LayerKind::Mountains, 0.5),
    (LayerKind::Clouds, 1.0),
    (LayerKind::Midground, 2.0),
    (LayerKind::Foreground, 3.0),
    (LayerKind::Particles, 4.0),
];

#[derive(Debug, Clone, Copy)]
pub struct ParallaxLayer {
    pub kind: LayerKind,
    pub factor: f32,
    /// Horizontal scroll, always in (-width, 0]
    pub offset: f32,
}

/// The concrete scenery behind the simulation
#[derive(Debug, Clone)]
pub struct Backdrop {
    width: f32,
    height: f32,
    stage: Stage,
    layers: [ParallaxLayer; 6],
    /// Time spent scrolling (ms); drives clouds, stars and particles
    animation_ms: f32,
}

impl Backdrop {
    pub fn new(width: f32, height: f32, stage: Stage) -> Self {
        Self {
            width,
            height,
            stage,
            layers: LAYERS.map(|(kind, factor)| ParallaxLayer {
                kind,
                factor,
                offset: 0.0,
            }),
            animation_ms: 0.0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    pub fn layer_offset(&self, kind: LayerKind) -> f32 {
        self.layers
            .iter()
            .find(|l| l.kind == kind)
            .map_or(0.0, |l| l.offset)
    }

    fn theme(&self) -> &'static StageTheme {
        self.stage.theme()
    }

    /// Gentle sway applied on top of the cloud layer's scroll
    fn cloud_sway(&self) -> f32 {
        (self.animation_ms * 0.001).sin() * 20.0
    }

    /// Particle phase in [0, TAU)
    fn particle_phase(&self) -> f32 {
        (self.animation_ms * 0.05) % TAU
    }

    fn render_layer(&self, layer: &ParallaxLayer, out: &mut Vec<Vertex>) {
        match layer.kind {
            LayerKind::Sky => self.render_sky(out),
            LayerKind::Mountains => self.render_mountains(layer.offset, out),
            LayerKind::Clouds => self.render_clouds(layer.offset, out),
            LayerKind::Midground => self.render_midground(layer.offset, out),
            LayerKind::Foreground => self.render_foreground(layer.offset, out),
            LayerKind::Particles => self.render_particles(out),
        }
    }

    fn render_sky(&self, out: &mut Vec<Vertex>) {
        let theme = self.theme();
        gradient_quad(out, 0.0, 0.0, self.width, self.height, theme.sky[0], theme.sky[1]);

        let [a1, a2, a3] = theme.accents;
        let t = self.animation_ms;
        match self.stage.number() {
            // Sun with rays
            1 => {
                let c = Vec2::new(self.width * 0.8, self.height * 0.2);
                circle(out, c, 80.0, with_alpha(a1, 0.25));
                circle(out, c, 40.0, a1);
                for i in 0..8 {
                    let angle = i as f32 / 8.0 * TAU;
                    let dir = Vec2::new(angle.cos(), angle.sin());
                    line(out, c + dir * 50.0, c + dir * 70.0, 3.0, with_alpha(a1, 0.4));
                }
            }
            // Canopy
            2 => {
                let mut x = 0.0_f32;
                while x < self.width {
                    let leaf = 60.0 + (x * 0.01).sin() * 20.0;
                    half_ellipse(out, Vec2::new(x, self.height * 0.15), 30.0, leaf, with_alpha(a1, 0.25));
                    x += 50.0;
                }
            }
            // Moon and twinkling stars
            3 => {
                let c = Vec2::new(self.width * 0.8, self.height * 0.2);
                circle(out, c, 35.0, a3);
                circle(out, c + Vec2::new(-10.0, -5.0), 8.0, with_alpha(a2, 0.25));
                circle(out, c + Vec2::new(8.0, 10.0), 5.0, with_alpha(a2, 0.25));
                for i in 0..20 {
                    let x = (i as f32 * 137.5) % self.width;
                    let y = (i as f32 * 50.0) % (self.height * 0.6);
                    let size = 1.0 + (t * 0.003 + i as f32).sin();
                    if size > 0.1 {
                        circle(out, Vec2::new(x, y), size, a3);
                    }
                }
            }
            // Aurora
            4 => {
                let mut x = 0.0_f32;
                while x < self.width {
                    let wave = 100.0 + (x * 0.01 + t * 0.002).sin() * 50.0;
                    ellipse(out, Vec2::new(x, self.height * 0.2), 80.0, wave, with_alpha(a1, 0.15));
                    x += 100.0;
                }
            }
            // Embers
            _ => {
                for i in 0..15 {
                    let x = (i as f32 * 80.0 + t * 0.1) % self.width;
                    let y = self.height * 0.1 + (i as f32 + t * 0.003).sin() * 30.0;
                    let size = 2.0 + (t * 0.005 + i as f32).sin() * 2.0;
                    if size > 0.1 {
                        circle(out, Vec2::new(x, y), size, a2);
                    }
                }
            }
        }
    }

    fn render_mountains(&self, offset: f32, out: &mut Vec<Vertex>) {
        let color = with_alpha(self.theme().accents[0], 0.38);
        let (w, h) = (150.0, 120.0);
        let top = self.height * 0.4;
        let mut x = offset;
        while x < self.width + 200.0 {
            let base = Vec2::new(x, top + h);
            let peak1 = Vec2::new(x + w * 0.3, top);
            let saddle = Vec2::new(x + w * 0.7, top + h * 0.3);
            let peak2 = Vec2::new(x + w, top);
            let end = Vec2::new(x + w * 1.2, top + h);
            // Two peaks over a shared base
            triangle(out, base, peak1, Vec2::new(x + w * 0.6, top + h), color);
            polygon(out, &[Vec2::new(x + w * 0.4, top + h), saddle, peak2, end], color);
            x += 200.0;
        }
    }

    fn render_clouds(&self, offset: f32, out: &mut Vec<Vertex>) {
        let color = with_alpha(self.theme().sky[0], 0.25);
        let sway = self.cloud_sway();
        for (start, y, size) in [(0.0, 0.25, 80.0), (150.0, 0.35, 60.0)] {
            let mut x = offset + sway + start;
            while x < self.width + 300.0 {
                cloud(out, Vec2::new(x, self.height * y), size, color);
                x += 300.0;
            }
        }
    }

    fn render_midground(&self, offset: f32, out: &mut Vec<Vertex>) {
        let theme = self.theme();
        let [a1, a2, a3] = theme.accents;
        let h = self.height;
        match self.stage.number() {
            // Dunes
            1 => repeat(offset, self.width + 400.0, 400.0, |x| {
                half_ellipse(out, Vec2::new(x, h * 0.7), 200.0, 50.0, with_alpha(theme.ground, 0.5));
            }),
            // Trees
            2 => repeat(offset, self.width + 150.0, 150.0, |x| {
                quad(out, x + 20.0, h * 0.5, 10.0, h * 0.3, a1);
                circle(out, Vec2::new(x + 25.0, h * 0.5), 25.0, a1);
            }),
            // Crystals
            3 => repeat(offset, self.width + 200.0, 200.0, |x| {
                spike(out, x, h * 0.7, 30.0, h * 0.2, with_alpha(a2, 0.38));
            }),
            // Ice spikes
            4 => repeat(offset, self.width + 250.0, 250.0, |x| {
                spike(out, x, h * 0.7, 20.0, h * 0.3, with_alpha(a3, 0.5));
            }),
            // Lava flows
            _ => repeat(offset, self.width + 300.0, 300.0, |x| {
                ellipse(out, Vec2::new(x, h * 0.75), 100.0, 15.0, a1);
            }),
        }
    }

    fn render_foreground(&self, offset: f32, out: &mut Vec<Vertex>) {
        let theme = self.theme();
        quad(out, 0.0, self.height * 0.8, self.width, self.height * 0.2, theme.ground);
        let speck = with_alpha(theme.accents[0], 0.25);
        repeat(offset, self.width + 100.0, 100.0, |x| {
            circle(out, Vec2::new(x, self.height * 0.85), 5.0, speck);
        });
    }

    fn render_particles(&self, out: &mut Vec<Vertex>) {
        let [a1, a2, a3] = self.theme().accents;
        let p = self.particle_phase();
        let (w, h) = (self.width.max(1.0), self.height.max(1.0));
        match self.stage.number() {
            // Sand
            1 => {
                for i in 0..10 {
                    let fi = i as f32;
                    let x = (fi * 120.0 + p * 50.0) % w;
                    let y = h * 0.6 + (fi + p).sin() * 20.0;
                    circle(out, Vec2::new(x, y), 2.0, with_alpha(a1, 0.38));
                }
            }
            // Pollen
            2 => {
                for i in 0..8 {
                    let fi = i as f32;
                    let x = (fi * 150.0 + p * 30.0) % w;
                    let y = h * 0.4 + (fi * 2.0 + p).sin() * 40.0;
                    circle(out, Vec2::new(x, y), 3.0, with_alpha(a3, 0.5));
                }
            }
            // Fireflies
            3 => {
                for i in 0..12 {
                    let fi = i as f32;
                    let x = (fi * 100.0 + (fi + p).sin() * 50.0).rem_euclid(w);
                    let y = h * 0.5 + (fi * 1.5 + p).cos() * 60.0;
                    let brightness = (p * 2.0 + fi).sin() * 0.5 + 0.5;
                    circle(out, Vec2::new(x, y), 2.0, with_alpha(a3, brightness));
                }
            }
            // Snow
            4 => {
                for i in 0..15 {
                    let fi = i as f32;
                    let x = (fi * 80.0 + p * 20.0) % w;
                    let y = (p * 100.0 + fi * 50.0) % h;
                    circle(out, Vec2::new(x, y), 3.0, a3);
                }
            }
            // Ash
            _ => {
                for i in 0..20 {
                    let fi = i as f32;
                    let x = (fi * 60.0 + p * 40.0) % w;
                    let y = (p * 80.0 + fi * 40.0) % h;
                    circle(out, Vec2::new(x, y), 2.0, with_alpha(a2, 0.38));
                }
            }
        }
    }
}

impl Environment for Backdrop {
    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn update(&mut self, dt: f32, speed: f32) {
        for layer in &mut self.layers {
            layer.offset -= speed * layer.factor * dt / 100.0;
            if layer.offset <= -self.width {
                layer.offset = 0.0;
            }
        }
        self.animation_ms += dt;
    }

    fn change_stage(&mut self, stage: Stage) {
        if stage != self.stage {
            log::debug!("Backdrop now {}", stage.name());
        }
        self.stage = stage;
    }

    fn render(&self, out: &mut Vec<Vertex>) {
        for layer in &self.layers {
            self.render_layer(layer, out);
        }
    }
}

/// Call `draw` at `start, start + step, ...` while below `end`
fn repeat(start: f32, end: f32, step: f32, mut draw: impl FnMut(f32)) {
    let mut x = start;
    while x < end {
        draw(x);
        x += step;
    }
}

fn cloud(out: &mut Vec<Vertex>, c: Vec2, size: f32, color: [f32; 4]) {
    circle(out, c, size * 0.5, color);
    for (dx, dy, r) in [(0.3, 0.0, 0.4), (-0.3, 0.0, 0.4), (0.6, 0.2, 0.3), (-0.6, 0.2, 0.3)] {
        circle(out, c + Vec2::new(dx, dy) * size, size * r, color);
    }
}

/// Upward-pointing triangle standing on `base_y`
fn spike(out: &mut Vec<Vertex>, x: f32, base_y: f32, width: f32, height: f32, color: [f32; 4]) {
    triangle(
        out,
        Vec2::new(x, base_y),
        Vec2::new(x + width / 2.0, base_y - height),
        Vec2::new(x + width, base_y),
        color,
    );
}
