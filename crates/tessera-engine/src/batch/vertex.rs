use bytemuck::{Pod, Zeroable};

use crate::coords::{Color, Vec2};

/// Caller-facing vertex: 2D position, texture coordinate and color.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TriVert {
    pub pos: Vec2,
    pub uv: Vec2,
    pub color: Color,
}

impl TriVert {
    #[inline]
    pub const fn new(pos: Vec2, uv: Vec2, color: Color) -> Self {
        Self { pos, uv, color }
    }

    /// Untextured vertex (uv at the origin).
    #[inline]
    pub const fn solid(pos: Vec2, color: Color) -> Self {
        Self::new(pos, Vec2::zero(), color)
    }
}

/// GPU vertex as stored in a batch: position with synthesized depth.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    #[inline]
    pub fn from_tri_vert(v: TriVert, z: f32) -> Self {
        Self {
            pos: [v.pos.x, v.pos.y, z],
            uv: [v.uv.x, v.uv.y],
            color: v.color.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}
