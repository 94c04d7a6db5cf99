//! Terrain mesh data structure holding vertices and indices produced by the mesh builder.

use bytemuck::{Pod, Zeroable};

/// A single vertex of a terrain tile.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
    /// Texture coordinates: the global sample index `(x, y)`.
    pub uv: [f32; 2],
    /// Tangent along increasing `u`; `w` holds the bitangent handedness (+1 or -1).
    pub tangent: [f32; 4],
}

/// The mesh output of a terrain build.
///
/// Contains interleaved vertex data and triangle indices ready for GPU upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainMesh {
    /// Vertex buffer.
    pub vertices: Vec<TerrainVertex>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all vertices and indices, keeping the allocations for reuse.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when the mesh has no vertices at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Approximate bytes held by the vertex and index buffers.
    pub fn byte_size(&self) -> usize {
        self.vertices.len() * size_of::<TerrainVertex>() + self.indices.len() * size_of::<u32>()
    }

    /// Vertex data as raw bytes for buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes for buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
