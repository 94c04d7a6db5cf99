//! Canonical `wgpu::VertexBufferLayout` for terrain tile rendering.
//!
//! Renderers drawing tiles reference [`TERRAIN_VERTEX_LAYOUT`] so the shader
//! inputs never drift from [`TerrainVertex`].
//!
//! | Location | Offset | Format    | Field    |
//! |----------|--------|-----------|----------|
//! | 0        | 0      | Float32x3 | position |
//! | 1        | 12     | Float32x3 | normal   |
//! | 2        | 24     | Float32x2 | uv       |
//! | 3        | 32     | Float32x4 | tangent  |

use std::mem;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::terrain_mesh::TerrainVertex;

/// Vertex attributes for the terrain mesh format.
pub const TERRAIN_VERTEX_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: mem::offset_of!(TerrainVertex, position) as u64,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: mem::offset_of!(TerrainVertex, normal) as u64,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: mem::offset_of!(TerrainVertex, uv) as u64,
        shader_location: 2,
    },
    VertexAttribute {
        format: VertexFormat::Float32x4,
        offset: mem::offset_of!(TerrainVertex, tangent) as u64,
        shader_location: 3,
    },
];

/// The vertex buffer layout for terrain tile pipelines.
pub const TERRAIN_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<TerrainVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &TERRAIN_VERTEX_ATTRIBUTES,
};

const _: () = assert!(
    mem::size_of::<TerrainVertex>() == 48,
    "TerrainVertex size changed, update TERRAIN_VERTEX_LAYOUT"
);
const _: () = assert!(TERRAIN_VERTEX_ATTRIBUTES[1].offset == 12);
const _: () = assert!(TERRAIN_VERTEX_ATTRIBUTES[2].offset == 24);
const _: () = assert!(TERRAIN_VERTEX_ATTRIBUTES[3].offset == 32);
