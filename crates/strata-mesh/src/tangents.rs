//! Per-vertex tangent derivation from positions, UVs, and normals.
//!
//! Accumulates the UV-space derivative directions of every triangle onto its
//! corners, then Gram-Schmidt orthogonalizes against the vertex normal and
//! records bitangent handedness in `tangent.w`.

use glam::{Vec2, Vec3};

use crate::terrain_mesh::TerrainVertex;

/// Triangles whose UV determinant is below this are skipped.
const DEGENERATE_UV_AREA: f32 = 1e-12;

/// Fill `tangent` for every vertex from the triangle list.
///
/// Vertices not referenced by any triangle get a tangent perpendicular to
/// their normal, leaning toward +x (the direction of increasing `u`).
pub fn compute_tangents(vertices: &mut [TerrainVertex], indices: &[u32]) {
    let mut tan1 = vec![Vec3::ZERO; vertices.len()];
    let mut tan2 = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = Vec3::from(vertices[i0].position);
        let e1 = Vec3::from(vertices[i1].position) - p0;
        let e2 = Vec3::from(vertices[i2].position) - p0;

        let uv0 = Vec2::from(vertices[i0].uv);
        let d1 = Vec2::from(vertices[i1].uv) - uv0;
        let d2 = Vec2::from(vertices[i2].uv) - uv0;

        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() < DEGENERATE_UV_AREA {
            continue;
        }
        let r = 1.0 / det;
        let sdir = (e1 * d2.y - e2 * d1.y) * r;
        let tdir = (e2 * d1.x - e1 * d2.x) * r;

        for i in [i0, i1, i2] {
            tan1[i] += sdir;
            tan2[i] += tdir;
        }
    }

    for (i, vertex) in vertices.iter_mut().enumerate() {
        let n = Vec3::from(vertex.normal);
        let t = (tan1[i] - n * n.dot(tan1[i]))
            .try_normalize()
            .unwrap_or_else(|| fallback_tangent(n));
        let w = if n.cross(t).dot(tan2[i]) < 0.0 {
            -1.0
        } else {
            1.0
        };
        vertex.tangent = [t.x, t.y, t.z, w];
    }
}

fn fallback_tangent(n: Vec3) -> Vec3 {
    (Vec3::X - n * n.x)
        .try_normalize()
        .unwrap_or_else(|| n.any_orthonormal_vector())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(position: [f32; 3], uv: [f32; 2]) -> TerrainVertex {
        TerrainVertex {
            position,
            normal: [0.0, 1.0, 0.0],
            uv,
            tangent: [0.0; 4],
        }
    }

    #[test]
    fn test_flat_triangle_tangent_follows_u() {
        let mut vertices = vec![
            vertex([0.0, 0.0, 0.0], [0.0, 0.0]),
            vertex([0.0, 0.0, 1.0], [0.0, 1.0]),
            vertex([1.0, 0.0, 0.0], [1.0, 0.0]),
        ];
        compute_tangents(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert_eq!(v.tangent, [1.0, 0.0, 0.0, -1.0]);
        }
    }

    #[test]
    fn test_unreferenced_vertex_gets_perpendicular_tangent() {
        let mut vertices = vec![TerrainVertex {
            normal: Vec3::new(0.6, 0.8, 0.0).to_array(),
            ..vertex([0.0; 3], [0.0; 2])
        }];
        compute_tangents(&mut vertices, &[]);
        let t = Vec3::new(
            vertices[0].tangent[0],
            vertices[0].tangent[1],
            vertices[0].tangent[2],
        );
        assert!((t.length() - 1.0).abs() < 1e-5);
        assert!(t.dot(Vec3::new(0.6, 0.8, 0.0)).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_uvs_are_skipped() {
        let mut vertices = vec![
            vertex([0.0, 0.0, 0.0], [0.0, 0.0]),
            vertex([0.0, 0.0, 1.0], [0.0, 0.0]),
            vertex([1.0, 0.0, 0.0], [0.0, 0.0]),
        ];
        compute_tangents(&mut vertices, &[0, 1, 2]);
        assert!(vertices.iter().all(|v| v.tangent[..3] == [1.0, 0.0, 0.0]));
    }
}
