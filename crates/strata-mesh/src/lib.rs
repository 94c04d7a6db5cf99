//! Terrain meshing: height field patches to triangle meshes with smooth
//! normals, tangents, and a GPU-ready vertex layout.

pub mod builder;
pub mod tangents;
pub mod terrain_mesh;
pub mod vertex_format;

pub use builder::{build_terrain_mesh, build_terrain_mesh_into, sample_normal};
pub use tangents::compute_tangents;
pub use terrain_mesh::{TerrainMesh, TerrainVertex};
pub use vertex_format::{TERRAIN_VERTEX_ATTRIBUTES, TERRAIN_VERTEX_LAYOUT};
