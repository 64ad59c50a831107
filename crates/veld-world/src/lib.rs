//! World model: chunk coordinates, climate noise, biome resolution, and the
//! per-biome fractal height field.
#![forbid(unsafe_code)]

/// World units per chunk side. The height grid carries one extra sample per
/// axis so both edges of the footprint are included.
pub const CHUNK_SIZE: usize = 32;

mod chunk_coord;
mod noise;
mod resolver;
mod sampler;
mod tile_cache;
mod world;
pub mod worldgen;

pub use chunk_coord::ChunkCoord;
pub use noise::{FractalParams, NoiseField};
pub use resolver::BiomeResolver;
pub use sampler::{HeightField, TerrainSampler};
pub use tile_cache::{HeightTile, HeightTileCache, HeightTileCacheStats, TileKey};
pub use world::World;
pub use worldgen::{
    BiomeDefinition, FeatureDescriptor, FeatureKind, GrassParams, HeightParams, SettlementParams,
    SurfaceParams, WorldGenConfig, WorldGenParams, load_params_from_path,
};
