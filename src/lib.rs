//! Facade over the terrain crates: one `Engine` owning the world, the chunk
//! streaming loop, and the worldgen config hot-reload plumbing.
#![forbid(unsafe_code)]

mod engine;

pub use engine::Engine;
pub use veld_chunk::{ChunkTerrain, GridEdge, HeightGrid, generate_chunk_terrain};
pub use veld_geom::{Aabb, Transform, Vec3};
pub use veld_mesh_cpu::{ChunkMeshCPU, MaterialDesc, MeshBuild, build_chunk_mesh};
pub use veld_runtime::{
    Chunk, ChunkStore, PrebuiltChunk, PreloadCache, RenderHandle, RenderSink, StreamingManager,
    preload,
};
pub use veld_scatter::{FeatureInstance, FeatureShape, scatter_chunk};
pub use veld_world::{
    BiomeDefinition, CHUNK_SIZE, ChunkCoord, World, WorldGenConfig, WorldGenParams,
    load_params_from_path,
};

/// Env-driven logger setup (`RUST_LOG`). Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
