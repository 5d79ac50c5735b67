//! Vertex format for tessellated geometry.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Vertex emitted by the fill and stroke expanders.
///
/// `uv.x` runs across a stroke or fringe (0 and 1 at the two edges, 0.5 on
/// the centerline); `uv.y` is 1 on solid geometry and 0 at the faded outer
/// edge of a cap fringe. Backends turn these into coverage.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in drawing space
    pub position: [f32; 2],
    /// Coverage coordinates
    pub uv: [f32; 2],
}

impl Vertex {
    /// Create a new vertex.
    pub fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
        }
    }

    /// Create a vertex from a position.
    pub fn at(position: Vec2, u: f32, v: f32) -> Self {
        Self::new(position.x, position.y, u, v)
    }

    /// Position as a vector.
    pub fn pos(&self) -> Vec2 {
        Vec2::from(self.position)
    }
}
