use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use crate::chunk_coord::ChunkCoord;
use crate::sampler::TerrainSampler;
use crate::tile_cache::HeightTileCache;
use crate::worldgen::{BiomeDefinition, WorldGenParams};
use crate::CHUNK_SIZE;

/// Process-wide world handle: the seed, the current worldgen parameters, and
/// the shared height tile cache. Parameters swap atomically (hot reload) and
/// every swap bumps the revision so cached data keyed to older params is
/// ignored.
pub struct World {
    pub seed: i32,
    pub chunk_size: usize,
    gen_params: Arc<RwLock<Arc<WorldGenParams>>>,
    worldgen_rev: AtomicU32,
    tiles: Arc<HeightTileCache>,
}

impl World {
    pub fn new(seed: i32) -> Self {
        Self::with_params(seed, WorldGenParams::default())
    }

    pub fn with_params(seed: i32, params: WorldGenParams) -> Self {
        Self {
            seed,
            chunk_size: CHUNK_SIZE,
            gen_params: Arc::new(RwLock::new(Arc::new(params))),
            worldgen_rev: AtomicU32::new(1),
            tiles: Arc::new(HeightTileCache::new(256)),
        }
    }

    pub fn params(&self) -> Arc<WorldGenParams> {
        let guard = self.gen_params.read().unwrap();
        Arc::clone(&*guard)
    }

    pub fn worldgen_rev(&self) -> u32 {
        self.worldgen_rev.load(Ordering::Acquire)
    }

    /// Swaps in new parameters, bumps the revision, and drops cached tiles.
    pub fn update_worldgen_params(&self, params: WorldGenParams) {
        if let Ok(mut guard) = self.gen_params.write() {
            *guard = Arc::new(params);
        }
        self.worldgen_rev.fetch_add(1, Ordering::AcqRel);
        self.tiles.invalidate_all();
    }

    /// Builds a sampler snapshot against the current parameters. Rebuild
    /// whenever [`World::worldgen_rev`] moves past the sampler's revision.
    pub fn make_sampler(&self) -> TerrainSampler {
        TerrainSampler::new(
            self.seed,
            self.params(),
            self.worldgen_rev(),
            Arc::clone(&self.tiles),
        )
    }

    /// Biome governing an arbitrary world point. Debug/HUD-oriented; chunk
    /// generation goes through [`TerrainSampler`] instead.
    pub fn biome_at(&self, wx: f32, wz: f32) -> Arc<BiomeDefinition> {
        self.make_sampler().resolver.resolve(wx, wz)
    }

    /// Ground elevation query for external callers (player ground clamping).
    pub fn elevation_at(&self, wx: f32, wz: f32) -> f32 {
        self.make_sampler().elevation_at(wx, wz)
    }

    /// Chunk containing a world position, on the streamed ground layer.
    pub fn chunk_at(&self, wx: f32, wz: f32) -> ChunkCoord {
        ChunkCoord::from_world(wx, wz, self.chunk_size)
    }

    pub fn tile_cache(&self) -> &Arc<HeightTileCache> {
        &self.tiles
    }
}
