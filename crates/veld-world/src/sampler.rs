use std::sync::Arc;

use crate::chunk_coord::ChunkCoord;
use crate::noise::NoiseField;
use crate::resolver::BiomeResolver;
use crate::tile_cache::{HeightTile, HeightTileCache, TileKey};
use crate::worldgen::{BiomeDefinition, WorldGenParams};

/// Per-biome fractal elevation. Pure function of (biome, x, z): identical
/// inputs yield bit-identical output, which is what keeps independently
/// generated neighboring chunks agreeing along shared edges.
pub struct HeightField {
    noise: NoiseField,
}

impl HeightField {
    pub fn new(seed: i32) -> Self {
        Self {
            noise: NoiseField::new(seed),
        }
    }

    pub fn elevation(&self, biome: &BiomeDefinition, wx: f32, wz: f32) -> f32 {
        let h = self.noise.fbm2(wx, wz, &biome.height.fractal)
            * biome.height.scale
            * biome.height.amplitude;
        if h.is_finite() {
            h
        } else {
            // A misconfigured octave schedule must not stall streaming.
            log::warn!(
                "non-finite elevation at ({wx}, {wz}) in biome {}; substituting 0",
                biome.name
            );
            0.0
        }
    }
}

/// Snapshot of everything chunk generation needs: the biome resolver, the
/// height field, the params revision it was built against, and the shared
/// height tile cache. Cheap to rebuild whenever the revision moves.
pub struct TerrainSampler {
    pub resolver: BiomeResolver,
    pub height: HeightField,
    pub params: Arc<WorldGenParams>,
    pub worldgen_rev: u32,
    tiles: Arc<HeightTileCache>,
}

impl TerrainSampler {
    pub fn new(
        seed: i32,
        params: Arc<WorldGenParams>,
        worldgen_rev: u32,
        tiles: Arc<HeightTileCache>,
    ) -> Self {
        Self {
            resolver: BiomeResolver::new(seed, &params),
            height: HeightField::new(seed),
            params,
            worldgen_rev,
            tiles,
        }
    }

    /// The biome governing a chunk, resolved from its center world point.
    pub fn biome_for_chunk(&self, coord: ChunkCoord, size: usize) -> Arc<BiomeDefinition> {
        let (cx, cz) = coord.center_world(size);
        self.resolver.resolve(cx, cz)
    }

    /// Ground elevation at an arbitrary world point, under whatever biome
    /// governs that point. Exposed so callers can do their own clamping.
    pub fn elevation_at(&self, wx: f32, wz: f32) -> f32 {
        let biome = self.resolver.resolve(wx, wz);
        self.height.elevation(&biome, wx, wz)
    }

    /// Edge-inclusive (size+1)² height tile for a chunk footprint, computed
    /// under the chunk's own biome and cached by base coordinate.
    pub fn height_tile(&self, coord: ChunkCoord, size: usize) -> Arc<HeightTile> {
        let (bx, bz) = coord.base_world(size);
        let key = TileKey::new(bx as i32, bz as i32, size + 1);
        if let Some(tile) = self.tiles.get(&key, self.worldgen_rev) {
            return tile;
        }
        let biome = self.biome_for_chunk(coord, size);
        let samples = size + 1;
        let mut heights = Vec::with_capacity(samples * samples);
        for j in 0..samples {
            for i in 0..samples {
                let wx = bx + i as f32;
                let wz = bz + j as f32;
                heights.push(self.height.elevation(&biome, wx, wz));
            }
        }
        let tile = HeightTile::new(key, self.worldgen_rev, heights);
        self.tiles.insert(Arc::clone(&tile));
        tile
    }

    pub fn tile_cache(&self) -> &Arc<HeightTileCache> {
        &self.tiles
    }
}
