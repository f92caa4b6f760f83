//! Vertex types for 2D meshes

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
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

    /// Bytes per vertex in a packed buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Colors for scene elements that bodies don't carry themselves
pub mod colors {
    pub const ARENA_WALL: [f32; 4] = [0.3, 0.3, 0.4, 1.0];
    pub const SEGMENT: [f32; 4] = [0.9, 0.85, 0.3, 1.0];
    pub const PINNED_OUTLINE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
