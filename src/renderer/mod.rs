//! WebGPU rendering module
//!
//! The scene is tessellated on the CPU into coloured triangles in canvas
//! pixels; the pipeline maps them to clip space and draws them in one pass.

pub mod backdrop;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use backdrop::Backdrop;
pub use pipeline::RenderState;
pub use vertex::Vertex;
