//! Height field to triangle mesh conversion.
//!
//! Emits one vertex per sample in an inclusive index rectangle, with normals
//! taken from a central-difference gradient over the *global* field so that
//! patches sharing an edge produce identical normals along it. Each 2x2 block
//! of samples becomes two triangles whose diagonal alternates with the parity
//! of the running vertex counter, yielding a checkerboard of diagonals that
//! lines up across tile seams when the tile size is even.

use glam::{UVec2, Vec3};
use strata_terrain::HeightField;

use crate::tangents::compute_tangents;
use crate::terrain_mesh::{TerrainMesh, TerrainVertex};

/// Build the mesh for samples `start..=end` (inclusive on both axes).
///
/// Vertex `(x, y)` is placed at `scale * (x, normalized(x, y), y)`, typically
/// with `scale = field.sample_spacing()`.
pub fn build_terrain_mesh(field: &HeightField, start: UVec2, end: UVec2, scale: Vec3) -> TerrainMesh {
    let mut mesh = TerrainMesh::new();
    build_terrain_mesh_into(&mut mesh, field, start, end, scale);
    mesh
}

/// Like [`build_terrain_mesh`] but rebuilds `mesh` in place, reusing its buffers.
///
/// Ranges reaching past the field are clamped to its last sample, and a
/// start past the end collapses onto the end. A rectangle one sample wide or
/// tall yields vertices but no triangles.
pub fn build_terrain_mesh_into(
    mesh: &mut TerrainMesh,
    field: &HeightField,
    start: UVec2,
    end: UVec2,
    scale: Vec3,
) {
    debug_assert!(
        start.cmple(end).all() && end.cmplt(field.size()).all(),
        "sample rectangle {start}..={end} outside {}x{} field",
        field.width(),
        field.height()
    );
    let end = end.min(field.size() - UVec2::ONE);
    let start = start.min(end);

    mesh.clear();
    let columns = (end.x - start.x + 1) as usize;
    let rows = end.y - start.y + 1;
    mesh.vertices.reserve(columns * rows as usize);
    mesh.indices
        .reserve((columns - 1) * (rows as usize - 1) * 6);

    for x in start.x..=end.x {
        for y in start.y..=end.y {
            let position = scale * Vec3::new(x as f32, field.normalized(x, y), y as f32);
            let normal = sample_normal(field, x, y, scale);
            mesh.vertices.push(TerrainVertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: [x as f32, y as f32],
                tangent: [0.0; 4],
            });
        }
    }

    // `k` is the vertex index of the quad's (x, y) corner; vertices run
    // column by column, so (x, y+1) is k+1 and (x+1, y) is k+rows.
    let mut k: u32 = 0;
    for _ in start.x..end.x {
        for _ in start.y..end.y {
            let sw = k;
            let nw = k + 1;
            let se = k + rows;
            let ne = k + rows + 1;
            if k % 2 == 1 {
                mesh.indices.extend_from_slice(&[sw, nw, se, se, nw, ne]);
            } else {
                mesh.indices.extend_from_slice(&[nw, ne, se, se, sw, nw]);
            }
            k += 1;
        }
        // Skip the column's last vertex.
        k += 1;
    }

    compute_tangents(&mut mesh.vertices, &mesh.indices);
}

/// Surface normal at sample `(x, y)` from central differences, one-sided at the field edges.
///
/// The normal is `cross(depth, width)` where `width` spans `x-1 -> x+1` and
/// `depth` spans `y-1 -> y+1`, which points toward +y for a flat field.
pub fn sample_normal(field: &HeightField, x: u32, y: u32, scale: Vec3) -> Vec3 {
    let x1 = x.saturating_sub(1);
    let x2 = (x + 1).min(field.width() - 1);
    let y1 = y.saturating_sub(1);
    let y2 = (y + 1).min(field.height() - 1);

    let width = scale
        * Vec3::new(
            (x2 - x1) as f32,
            field.normalized(x2, y) - field.normalized(x1, y),
            0.0,
        );
    let depth = scale
        * Vec3::new(
            0.0,
            field.normalized(x, y2) - field.normalized(x, y1),
            (y2 - y1) as f32,
        );

    let width = width.normalize_or_zero();
    let depth = depth.normalize_or_zero();
    depth.cross(width).try_normalize().unwrap_or(Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_terrain::MAX_SAMPLE_VALUE;

    fn unit_dims(w: u32, h: u32) -> Vec3 {
        Vec3::new((w - 1) as f32, 1.0, (h - 1) as f32)
    }

    fn peak_field() -> HeightField {
        HeightField::from_fn(3, 3, unit_dims(3, 3), |x, y| {
            if (x, y) == (1, 1) { u16::MAX } else { 0 }
        })
        .unwrap()
    }

    fn normal_of(mesh: &TerrainMesh, i: usize) -> Vec3 {
        Vec3::from(mesh.vertices[i].normal)
    }

    #[test]
    fn test_full_range_vertex_and_index_counts() {
        let field = HeightField::flat(5, 4, 0, unit_dims(5, 4)).unwrap();
        let mesh = build_terrain_mesh(&field, UVec2::ZERO, UVec2::new(4, 3), Vec3::ONE);
        assert_eq!(mesh.vertex_count(), 20);
        assert_eq!(mesh.triangle_count(), 4 * 3 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_vertex_positions_and_uvs_use_global_indices() {
        let field =
            HeightField::from_fn(8, 8, unit_dims(8, 8), |x, y| (x * 100 + y) as u16).unwrap();
        let scale = Vec3::new(2.0, 50.0, 3.0);
        let mesh = build_terrain_mesh(&field, UVec2::new(2, 3), UVec2::new(4, 5), scale);

        // Column-major: vertex 0 is (2,3), vertex 1 is (2,4), vertex 3 is (3,3).
        assert_eq!(mesh.vertices[0].uv, [2.0, 3.0]);
        assert_eq!(mesh.vertices[1].uv, [2.0, 4.0]);
        assert_eq!(mesh.vertices[3].uv, [3.0, 3.0]);

        let expected = scale * Vec3::new(3.0, 303.0 / MAX_SAMPLE_VALUE, 3.0);
        assert_eq!(mesh.vertices[3].position, expected.to_array());
    }

    #[test]
    fn test_peak_center_normal_is_vertical() {
        let field = peak_field();
        let mesh = build_terrain_mesh(&field, UVec2::ZERO, UVec2::new(2, 2), Vec3::ONE);
        assert_eq!(mesh.vertex_count(), 9);

        // Vertex index for (x, y) is x * 3 + y.
        let center = normal_of(&mesh, 4);
        assert!((center - Vec3::Y).length() < 1e-6, "center normal {center}");

        for i in 0..9 {
            let n = normal_of(&mesh, i);
            assert!(
                n.y <= center.y + 1e-6,
                "vertex {i} normal {n} rises above the peak normal {center}"
            );
        }
        // Edge midpoints see the peak and tilt away from it.
        for i in [1, 3, 5, 7] {
            assert!(
                normal_of(&mesh, i).y < center.y,
                "vertex {i} next to the peak should tilt"
            );
        }
        // (1, 0) tilts toward -z, away from the peak at +z.
        assert!(normal_of(&mesh, 3).z < 0.0);
    }

    #[test]
    fn test_normals_are_unit_length() {
        let field = HeightField::from_fn(6, 6, unit_dims(6, 6), |x, y| {
            ((x * 7919 + y * 104_729) % 65_536) as u16
        })
        .unwrap();
        let mesh =
            build_terrain_mesh(&field, UVec2::ZERO, UVec2::new(5, 5), Vec3::new(1.0, 4.0, 1.0));
        for v in &mesh.vertices {
            let len = Vec3::from(v.normal).length();
            assert!((len - 1.0).abs() < 1e-5, "normal length {len}");
            assert!(v.normal[1] > 0.0, "terrain normals face up");
        }
    }

    #[test]
    fn test_triangles_face_up_on_flat_ground() {
        let field = HeightField::flat(5, 5, 1000, unit_dims(5, 5)).unwrap();
        let mesh = build_terrain_mesh(&field, UVec2::ZERO, UVec2::new(4, 4), Vec3::ONE);
        for tri in mesh.indices.chunks_exact(3) {
            let p = |i: u32| Vec3::from(mesh.vertices[i as usize].position);
            let n = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            assert!(n.y > 0.0, "triangle {tri:?} faces down");
        }
    }

    #[test]
    fn test_diagonals_alternate_in_checkerboard() {
        let field = HeightField::flat(5, 5, 0, unit_dims(5, 5)).unwrap();
        let mesh = build_terrain_mesh(&field, UVec2::ZERO, UVec2::new(4, 4), Vec3::ONE);
        // Each quad's first triangle starts with nw (even k) or sw (odd k).
        // Rows = 5 is odd, so parity of k equals parity of x + y.
        for (q, quad) in mesh.indices.chunks_exact(6).enumerate() {
            let (x, y) = (q / 4, q % 4);
            let k = (x * 5 + y) as u32;
            let expected_first = if (x + y) % 2 == 1 { k } else { k + 1 };
            assert_eq!(quad[0], expected_first, "quad ({x}, {y})");
        }
    }

    #[test]
    fn test_adjacent_patches_share_edge_normals_bit_for_bit() {
        let field = HeightField::from_fn(9, 9, unit_dims(9, 9), |x, y| {
            ((x * x * 811 + y * 2_003 + x * y * 97) % 65_536) as u16
        })
        .unwrap();
        let scale = Vec3::new(1.5, 80.0, 1.5);
        let left = build_terrain_mesh(&field, UVec2::new(0, 0), UVec2::new(4, 8), scale);
        let right = build_terrain_mesh(&field, UVec2::new(4, 0), UVec2::new(8, 8), scale);

        // Left's last column and right's first column are both x = 4.
        for y in 0..9 {
            let l = &left.vertices[4 * 9 + y];
            let r = &right.vertices[y];
            assert_eq!(l.uv, r.uv);
            assert_eq!(l.position, r.position);
            assert_eq!(
                l.normal.map(f32::to_bits),
                r.normal.map(f32::to_bits),
                "normal mismatch at y={y}"
            );
        }
    }

    #[test]
    fn test_single_column_is_vertex_only() {
        let field = HeightField::flat(4, 4, 0, unit_dims(4, 4)).unwrap();
        let mesh = build_terrain_mesh(&field, UVec2::new(3, 0), UVec2::new(3, 3), Vec3::ONE);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_single_row_is_vertex_only() {
        let field = HeightField::flat(4, 4, 0, unit_dims(4, 4)).unwrap();
        let mesh = build_terrain_mesh(&field, UVec2::new(0, 2), UVec2::new(3, 2), Vec3::ONE);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.indices.is_empty());
        assert!(mesh.vertices.iter().all(|v| v.tangent[0] == 1.0));
    }

    #[test]
    fn test_rebuild_into_replaces_previous_contents() {
        let field = HeightField::flat(6, 6, 0, unit_dims(6, 6)).unwrap();
        let mut mesh = build_terrain_mesh(&field, UVec2::ZERO, UVec2::new(5, 5), Vec3::ONE);
        build_terrain_mesh_into(&mut mesh, &field, UVec2::ZERO, UVec2::new(1, 1), Vec3::ONE);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_flat_tangents_point_along_x() {
        let field = HeightField::flat(3, 3, 0, unit_dims(3, 3)).unwrap();
        let mesh = build_terrain_mesh(&field, UVec2::ZERO, UVec2::new(2, 2), Vec3::ONE);
        for v in &mesh.vertices {
            assert!((Vec3::new(v.tangent[0], v.tangent[1], v.tangent[2]) - Vec3::X).length() < 1e-6);
            assert_eq!(v.tangent[3], -1.0);
        }
    }
}
