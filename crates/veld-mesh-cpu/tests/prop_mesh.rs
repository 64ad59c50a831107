use proptest::prelude::*;
use std::sync::Arc;
use veld_chunk::generate_chunk_terrain;
use veld_mesh_cpu::build_chunk_mesh;
use veld_world::{CHUNK_SIZE, ChunkCoord, HeightTileCache, TerrainSampler, WorldGenParams};

fn sampler(seed: i32) -> TerrainSampler {
    TerrainSampler::new(
        seed,
        Arc::new(WorldGenParams::default()),
        1,
        Arc::new(HeightTileCache::new(16)),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // Any chunk anywhere meshes into buffers with the fixed grid topology:
    // (size+1)^2 vertices, 2*size^2 triangles, all indices in range, and a
    // bounding box spanning the sampled heights.
    #[test]
    fn any_chunk_builds_valid_buffers(cx in -60i32..=60, cz in -60i32..=60, seed in 0i32..200) {
        let s = sampler(seed);
        let t = generate_chunk_terrain(&s, ChunkCoord::new(cx, 0, cz), CHUNK_SIZE);
        let cpu = build_chunk_mesh(&t).unwrap();
        let n = CHUNK_SIZE + 1;
        prop_assert_eq!(cpu.mesh.vertex_count(), n * n);
        prop_assert_eq!(cpu.mesh.triangle_count(), CHUNK_SIZE * CHUNK_SIZE * 2);
        let verts = cpu.mesh.vertex_count() as u16;
        prop_assert!(cpu.mesh.indices().iter().all(|&i| i < verts));
        prop_assert!(cpu.bbox.min.y <= cpu.bbox.max.y);
    }
}
