//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in canvas pixels (y down) with a colour
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Fixed colours (stage colours live in the theme table)
pub mod colors {
    use crate::sim::stage::{Color, rgb};

    pub const GROUND_LINE: Color = rgb(0x8B4513);

    pub const ACTOR_BODY: Color = rgb(0x32CD32);
    pub const ACTOR_BELLY: Color = rgb(0x90EE90);
    pub const ACTOR_OUTLINE: Color = rgb(0x228B22);
    pub const ACTOR_SPOTS: Color = rgb(0x006400);
    pub const ACTOR_EYE: Color = rgb(0x000000);
    pub const ACTOR_EYE_WHITE: Color = rgb(0xFFFFFF);

    pub const CLEAR: Color = [0.02, 0.02, 0.05, 1.0];
}
