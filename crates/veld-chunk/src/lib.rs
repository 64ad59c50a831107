//! Chunk height grids and single-pass terrain generation.
#![forbid(unsafe_code)]

use std::sync::Arc;

use veld_world::{BiomeDefinition, ChunkCoord, HeightTile, TerrainSampler};

/// Edge-inclusive elevation samples over one chunk footprint: a chunk of
/// side `size` carries `(size + 1)²` samples so both boundary grid lines are
/// present. Fixed at construction; chunks are built in one pass and never
/// edited afterward.
#[derive(Clone, Debug)]
pub struct HeightGrid {
    pub coord: ChunkCoord,
    pub size: usize,
    samples: Arc<[f32]>,
}

impl HeightGrid {
    pub fn new(coord: ChunkCoord, size: usize, samples: Arc<[f32]>) -> Self {
        let expect = (size + 1) * (size + 1);
        debug_assert_eq!(samples.len(), expect);
        Self {
            coord,
            size,
            samples,
        }
    }

    #[inline]
    pub fn samples_per_axis(&self) -> usize {
        self.size + 1
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        j * self.samples_per_axis() + i
    }

    /// Elevation at grid index (i, j); i and j run 0..=size.
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f32 {
        self.samples[self.idx(i, j)]
    }

    #[inline]
    pub fn raw(&self) -> &Arc<[f32]> {
        &self.samples
    }

    /// World-space (x, z) of grid index (i, j).
    #[inline]
    pub fn world_at(&self, i: usize, j: usize) -> (f32, f32) {
        let (bx, bz) = self.coord.base_world(self.size);
        (bx + i as f32, bz + j as f32)
    }

    /// The row or column of samples along one edge of the footprint.
    pub fn edge(&self, edge: GridEdge) -> Vec<f32> {
        let n = self.samples_per_axis();
        match edge {
            GridEdge::West => (0..n).map(|j| self.at(0, j)).collect(),
            GridEdge::East => (0..n).map(|j| self.at(n - 1, j)).collect(),
            GridEdge::North => (0..n).map(|i| self.at(i, 0)).collect(),
            GridEdge::South => (0..n).map(|i| self.at(i, n - 1)).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridEdge {
    West,
    East,
    North,
    South,
}

/// A chunk's generated terrain: its biome (resolved once from the footprint
/// center) and its height grid. Both are fixed at construction.
#[derive(Clone, Debug)]
pub struct ChunkTerrain {
    pub coord: ChunkCoord,
    pub biome: Arc<BiomeDefinition>,
    pub grid: HeightGrid,
}

impl ChunkTerrain {
    /// Elevation at a local offset within the footprint, bilinearly
    /// interpolated between the four surrounding grid samples.
    pub fn elevation_local(&self, lx: f32, lz: f32) -> f32 {
        let max = self.grid.size as f32;
        let lx = lx.clamp(0.0, max);
        let lz = lz.clamp(0.0, max);
        let i = (lx.floor() as usize).min(self.grid.size - 1);
        let j = (lz.floor() as usize).min(self.grid.size - 1);
        let fx = lx - i as f32;
        let fz = lz - j as f32;
        let h00 = self.grid.at(i, j);
        let h10 = self.grid.at(i + 1, j);
        let h01 = self.grid.at(i, j + 1);
        let h11 = self.grid.at(i + 1, j + 1);
        let a = h00 + (h10 - h00) * fx;
        let b = h01 + (h11 - h01) * fx;
        a + (b - a) * fz
    }
}

/// Generates a chunk's terrain: biome from the chunk center, then an
/// edge-inclusive height tile under that biome (served from the sampler's
/// tile cache when warm).
pub fn generate_chunk_terrain(sampler: &TerrainSampler, coord: ChunkCoord, size: usize) -> ChunkTerrain {
    let biome = sampler.biome_for_chunk(coord, size);
    let tile: Arc<HeightTile> = sampler.height_tile(coord, size);
    let grid = HeightGrid::new(coord, size, Arc::clone(tile.heights()));
    ChunkTerrain {
        coord,
        biome,
        grid,
    }
}
