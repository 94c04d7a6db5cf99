use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::{UVec2, Vec3};
use strata_mesh::{TerrainMesh, build_terrain_mesh, build_terrain_mesh_into};
use strata_terrain::{HeightmapParams, generate_height_field};

fn bench_build_tile_64(c: &mut Criterion) {
    let field = generate_height_field(
        HeightmapParams::default(),
        257,
        257,
        Vec3::new(256.0, 400.0, 256.0),
    )
    .expect("valid field");
    let scale = field.sample_spacing();
    c.bench_function("build_tile_64", |bencher| {
        bencher.iter(|| {
            black_box(build_terrain_mesh(
                &field,
                black_box(UVec2::new(64, 64)),
                black_box(UVec2::new(128, 128)),
                scale,
            ))
        })
    });
}

fn bench_rebuild_tile_64_in_place(c: &mut Criterion) {
    let field = generate_height_field(
        HeightmapParams::default(),
        257,
        257,
        Vec3::new(256.0, 400.0, 256.0),
    )
    .expect("valid field");
    let scale = field.sample_spacing();
    let mut mesh = TerrainMesh::new();
    c.bench_function("rebuild_tile_64_in_place", |bencher| {
        bencher.iter(|| {
            build_terrain_mesh_into(
                &mut mesh,
                &field,
                black_box(UVec2::new(64, 64)),
                black_box(UVec2::new(128, 128)),
                scale,
            );
            black_box(mesh.vertex_count())
        })
    });
}

criterion_group!(benches, bench_build_tile_64, bench_rebuild_tile_64_in_place);
criterion_main!(benches);
