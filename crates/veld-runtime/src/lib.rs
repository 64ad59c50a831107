//! Chunk streaming: the store of resident chunks and the per-tick
//! reconciliation that keeps exactly the chunks near the player loaded.
#![forbid(unsafe_code)]

mod preload;

use std::sync::Arc;

use hashbrown::HashMap;
use veld_chunk::{ChunkTerrain, generate_chunk_terrain};
use veld_geom::Vec3;
use veld_mesh_cpu::{ChunkMeshCPU, build_chunk_mesh, build_flat_chunk_mesh};
use veld_scatter::{FeatureInstance, scatter_chunk, settlement_buildings_in_chunk};
use veld_world::{BiomeDefinition, ChunkCoord, TerrainSampler, World};

pub use preload::{PrebuiltChunk, PreloadCache, preload};

/// Opaque drawable handle returned by the rendering collaborator.
pub type RenderHandle = u64;

/// Narrow interface to the rendering collaborator: upload a finished chunk,
/// and dispose it exactly once when the chunk leaves the retention window.
pub trait RenderSink {
    fn upload_chunk(
        &mut self,
        coord: ChunkCoord,
        mesh: &ChunkMeshCPU,
        features: &[FeatureInstance],
    ) -> RenderHandle;
    fn dispose_chunk(&mut self, coord: ChunkCoord, handle: RenderHandle);
}

/// A resident chunk: terrain fixed at construction, its mesh and feature
/// instances (owned exclusively, released together on unload), and the
/// renderer handle once uploaded.
pub struct Chunk {
    pub terrain: ChunkTerrain,
    pub mesh: ChunkMeshCPU,
    pub features: Vec<FeatureInstance>,
    pub handle: Option<RenderHandle>,
    pub loaded: bool,
}

impl Chunk {
    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.terrain.coord
    }

    #[inline]
    pub fn biome(&self) -> &Arc<BiomeDefinition> {
        &self.terrain.biome
    }
}

/// Coordinate-keyed map of resident chunks. Exactly one chunk per loaded
/// coordinate; duplicate inserts are a caller bug.
#[derive(Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkStore {
    pub fn insert(&mut self, chunk: Chunk) {
        let coord = chunk.coord();
        let prev = self.chunks.insert(coord, chunk);
        debug_assert!(prev.is_none(), "duplicate chunk insert at {coord:?}");
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord)
    }

    #[inline]
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    #[inline]
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }
}

/// Per-tick reconciliation of the resident chunk set against the target set
/// derived from the player position. Loads consult the preload cache before
/// falling back to live synthesis; unloads release renderer resources
/// exactly once. Both directions are idempotent and set-based.
pub struct StreamingManager {
    world: Arc<World>,
    sampler: TerrainSampler,
    store: ChunkStore,
    preloaded: HashMap<ChunkCoord, PrebuiltChunk>,
    feature_seed: u32,
}

impl StreamingManager {
    pub fn new(world: Arc<World>) -> Self {
        let sampler = world.make_sampler();
        let feature_seed = world.seed as u32;
        Self {
            world,
            sampler,
            store: ChunkStore::default(),
            preloaded: HashMap::new(),
            feature_seed,
        }
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Installs preloaded chunks; consumed coordinate by coordinate as the
    /// streaming loop first needs them.
    pub fn set_preloaded(&mut self, cache: PreloadCache) {
        self.preloaded = cache.chunks;
    }

    pub fn preloaded_remaining(&self) -> usize {
        self.preloaded.len()
    }

    /// One streaming step. Computes the target coordinate set around the
    /// player, loads what is missing (nearest chunks first), and unloads
    /// what fell outside.
    pub fn tick(&mut self, player_pos: Vec3, sink: &mut dyn RenderSink) {
        self.refresh_sampler();
        let center = self.world.chunk_at(player_pos.x, player_pos.z);
        let rd = self.sampler.params.render_distance;

        let mut missing: Vec<ChunkCoord> = Vec::new();
        for dz in -rd..=rd {
            for dx in -rd..=rd {
                let coord = ChunkCoord::new(center.cx + dx, 0, center.cz + dz);
                if !self.store.contains(coord) {
                    missing.push(coord);
                }
            }
        }
        missing.sort_by_key(|c| c.distance_sq(center));
        for coord in missing {
            self.load_chunk(coord, sink);
        }

        let stale: Vec<ChunkCoord> = self
            .store
            .coords()
            .filter(|c| {
                c.cy != 0 || (c.cx - center.cx).abs() > rd || (c.cz - center.cz).abs() > rd
            })
            .collect();
        for coord in stale {
            self.unload_chunk(coord, sink);
        }
    }

    /// Disposes every resident chunk. Used when a worldgen config reload
    /// makes the whole resident set stale; the next tick repopulates it.
    pub fn invalidate_all(&mut self, sink: &mut dyn RenderSink) {
        let all: Vec<ChunkCoord> = self.store.coords().collect();
        for coord in all {
            self.unload_chunk(coord, sink);
        }
        self.preloaded.clear();
    }

    /// Runs the feature pass for an already-registered chunk. Returns false
    /// (after a warning) when the coordinate is not resident; the guard is
    /// defensive, not a workflow.
    pub fn scatter_into(&mut self, coord: ChunkCoord) -> bool {
        let Some(chunk) = self.store.get(coord) else {
            log::warn!("feature scatter requested for unloaded chunk {coord:?}; skipping");
            return false;
        };
        if !chunk.features.is_empty() {
            return true;
        }
        let mut features = scatter_chunk(&self.sampler, &chunk.terrain, self.feature_seed);
        features.extend(settlement_buildings_in_chunk(
            &self.sampler,
            &chunk.terrain,
            self.feature_seed,
        ));
        if let Some(chunk) = self.store.get_mut(coord) {
            chunk.features = features;
        }
        true
    }

    fn refresh_sampler(&mut self) {
        let rev = self.world.worldgen_rev();
        if rev != self.sampler.worldgen_rev {
            self.sampler = self.world.make_sampler();
        }
    }

    fn load_chunk(&mut self, coord: ChunkCoord, sink: &mut dyn RenderSink) {
        let chunk = match self.take_preloaded(coord) {
            Some(pre) => Chunk {
                terrain: pre.terrain,
                mesh: pre.mesh,
                features: pre.features,
                handle: None,
                loaded: false,
            },
            None => self.synthesize(coord),
        };
        self.store.insert(chunk);
        // Features scatter only after the chunk is registered.
        self.scatter_into(coord);
        if let Some(chunk) = self.store.get_mut(coord) {
            let handle = sink.upload_chunk(coord, &chunk.mesh, &chunk.features);
            chunk.handle = Some(handle);
            chunk.loaded = true;
        }
    }

    fn unload_chunk(&mut self, coord: ChunkCoord, sink: &mut dyn RenderSink) {
        if let Some(mut chunk) = self.store.remove(coord) {
            chunk.loaded = false;
            if let Some(handle) = chunk.handle.take() {
                sink.dispose_chunk(coord, handle);
            }
        }
    }

    fn take_preloaded(&mut self, coord: ChunkCoord) -> Option<PrebuiltChunk> {
        let pre = self.preloaded.remove(&coord)?;
        if pre.worldgen_rev == self.sampler.worldgen_rev {
            Some(pre)
        } else {
            log::debug!("preloaded chunk {coord:?} is stale; regenerating");
            None
        }
    }

    fn synthesize(&self, coord: ChunkCoord) -> Chunk {
        let terrain = generate_chunk_terrain(&self.sampler, coord, self.world.chunk_size);
        let mesh = match build_chunk_mesh(&terrain) {
            Ok(mesh) => mesh,
            Err(e) => {
                log::warn!("mesh build failed for chunk {coord:?}: {e}; using flat fallback");
                build_flat_chunk_mesh(coord, self.world.chunk_size)
            }
        };
        Chunk {
            terrain,
            mesh,
            features: Vec::new(),
            handle: None,
            loaded: false,
        }
    }
}
