//! Startup preload: builds the chunks around the spawn point on a worker
//! pool so first-frame streaming serves from a warm cache instead of
//! synthesizing everything on the hot path.

use std::sync::Arc;
use std::thread;

use hashbrown::HashMap;
use rayon::ThreadPoolBuilder;
use veld_chunk::{ChunkTerrain, generate_chunk_terrain};
use veld_geom::Vec3;
use veld_mesh_cpu::{ChunkMeshCPU, build_chunk_mesh, build_flat_chunk_mesh};
use veld_scatter::{FeatureInstance, scatter_chunk, settlement_buildings_in_chunk};
use veld_world::{ChunkCoord, World};

/// A fully built chunk waiting for the streaming loop to claim it. Stamped
/// with the worldgen revision it was built against; a stale stamp means the
/// chunk is regenerated instead of used.
pub struct PrebuiltChunk {
    pub worldgen_rev: u32,
    pub terrain: ChunkTerrain,
    pub mesh: ChunkMeshCPU,
    pub features: Vec<FeatureInstance>,
}

#[derive(Default)]
pub struct PreloadCache {
    pub worldgen_rev: u32,
    pub chunks: HashMap<ChunkCoord, PrebuiltChunk>,
}

impl PreloadCache {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Builds every chunk within the configured preload radius of `spawn`,
/// restricted to the interesting biome codes when the list is non-empty.
/// `progress` is called as (done, total) after each chunk, filtered ones
/// included, so callers can drive a startup bar.
pub fn preload<F>(world: &Arc<World>, spawn: Vec3, mut progress: F) -> PreloadCache
where
    F: FnMut(usize, usize),
{
    let params = world.params();
    let radius = params.preload_radius;
    let codes = params.preload_codes.clone();
    let rev = world.worldgen_rev();
    let center = world.chunk_at(spawn.x, spawn.z);

    let mut coords = Vec::new();
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            coords.push(ChunkCoord::new(center.cx + dx, 0, center.cz + dz));
        }
    }
    let total = coords.len();
    if total == 0 {
        return PreloadCache {
            worldgen_rev: rev,
            chunks: HashMap::new(),
        };
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(total);
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("veld-preload-{i}"))
        .build()
        .expect("preload worker pool");
    let (tx, rx) = crossbeam_channel::unbounded::<(ChunkCoord, Option<PrebuiltChunk>)>();

    // One sampler per worker batch; samplers share the height tile cache.
    for batch in coords.chunks(total.div_ceil(workers)) {
        let batch: Vec<ChunkCoord> = batch.to_vec();
        let tx = tx.clone();
        let world = Arc::clone(world);
        let codes = codes.clone();
        pool.spawn(move || {
            let sampler = world.make_sampler();
            let feature_seed = world.seed as u32;
            for coord in batch {
                let biome = sampler.biome_for_chunk(coord, world.chunk_size);
                if !codes.is_empty() && !codes.iter().any(|c| c == &biome.code) {
                    let _ = tx.send((coord, None));
                    continue;
                }
                let terrain = generate_chunk_terrain(&sampler, coord, world.chunk_size);
                let mesh = match build_chunk_mesh(&terrain) {
                    Ok(mesh) => mesh,
                    Err(e) => {
                        log::warn!("preload mesh build failed for {coord:?}: {e}");
                        build_flat_chunk_mesh(coord, world.chunk_size)
                    }
                };
                let mut features = scatter_chunk(&sampler, &terrain, feature_seed);
                features.extend(settlement_buildings_in_chunk(
                    &sampler,
                    &terrain,
                    feature_seed,
                ));
                let _ = tx.send((
                    coord,
                    Some(PrebuiltChunk {
                        worldgen_rev: rev,
                        terrain,
                        mesh,
                        features,
                    }),
                ));
            }
        });
    }
    drop(tx);

    let mut chunks = HashMap::new();
    let mut done = 0usize;
    for (coord, built) in rx {
        done += 1;
        if let Some(pre) = built {
            chunks.insert(coord, pre);
        }
        progress(done, total);
    }
    log::info!(
        "preloaded {} of {} chunks around {:?}",
        chunks.len(),
        total,
        center
    );
    PreloadCache {
        worldgen_rev: rev,
        chunks,
    }
}
