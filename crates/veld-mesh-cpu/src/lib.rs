//! CPU mesh building for heightfield chunks.
#![forbid(unsafe_code)]

mod material;
mod mesh_build;

use std::fmt;

use veld_chunk::{ChunkTerrain, HeightGrid};
use veld_geom::{Aabb, Vec3};
use veld_world::ChunkCoord;

pub use material::{MaterialDesc, material_for_biome};
pub use mesh_build::MeshBuild;

/// Finished chunk mesh plus its material and local-space bounds. Positions
/// are chunk-local; the chunk's world transform is its base coordinate.
#[derive(Clone, Debug)]
pub struct ChunkMeshCPU {
    pub coord: ChunkCoord,
    pub mesh: MeshBuild,
    pub material: MaterialDesc,
    pub bbox: Aabb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshBuildError {
    /// Height grid sample count does not match the chunk footprint.
    GridShape { expected: usize, got: usize },
}

impl fmt::Display for MeshBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshBuildError::GridShape { expected, got } => {
                write!(f, "height grid has {got} samples, expected {expected}")
            }
        }
    }
}

impl std::error::Error for MeshBuildError {}

/// Triangulates a chunk's height grid: one vertex per grid sample, two
/// triangles per cell with winding (a, b, d) / (b, c, d) where a..d are the
/// cell corners, UVs tiled by the biome's texture scale, normals from
/// accumulated face normals.
pub fn build_chunk_mesh(terrain: &ChunkTerrain) -> Result<ChunkMeshCPU, MeshBuildError> {
    let grid = &terrain.grid;
    let n = grid.samples_per_axis();
    let expected = n * n;
    if grid.raw().len() != expected {
        return Err(MeshBuildError::GridShape {
            expected,
            got: grid.raw().len(),
        });
    }
    let material = material_for_biome(&terrain.biome);
    Ok(assemble(terrain.coord, grid, material, |i, j| grid.at(i, j)))
}

/// Flat zero-elevation stand-in used when a chunk's real mesh cannot be
/// built; keeps the coordinate resolvable instead of leaving a hole.
pub fn build_flat_chunk_mesh(coord: ChunkCoord, size: usize) -> ChunkMeshCPU {
    let samples = vec![0.0f32; (size + 1) * (size + 1)];
    let grid = HeightGrid::new(coord, size, samples.into());
    assemble(coord, &grid, MaterialDesc::FALLBACK, |_, _| 0.0)
}

fn assemble(
    coord: ChunkCoord,
    grid: &HeightGrid,
    material: MaterialDesc,
    height: impl Fn(usize, usize) -> f32,
) -> ChunkMeshCPU {
    let n = grid.samples_per_axis();
    let mut mesh = MeshBuild::default();
    mesh.reserve(n * n, (n - 1) * (n - 1) * 2);

    let mut bbox = Aabb::new(
        Vec3::new(0.0, f32::INFINITY, 0.0),
        Vec3::new((n - 1) as f32, f32::NEG_INFINITY, (n - 1) as f32),
    );
    for j in 0..n {
        for i in 0..n {
            let h = height(i, j);
            let p = Vec3::new(i as f32, h, j as f32);
            bbox.min.y = bbox.min.y.min(h);
            bbox.max.y = bbox.max.y.max(h);
            mesh.push_vertex(p, (i as f32 * material.texture_tile, j as f32 * material.texture_tile));
        }
    }

    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let a = (j * n + i) as u16;
            let b = ((j + 1) * n + i) as u16;
            let c = ((j + 1) * n + i + 1) as u16;
            let d = (j * n + i + 1) as u16;
            mesh.push_triangle(a, b, d);
            mesh.push_triangle(b, c, d);
        }
    }

    mesh.recompute_normals();
    ChunkMeshCPU {
        coord,
        mesh,
        material,
        bbox,
    }
}
