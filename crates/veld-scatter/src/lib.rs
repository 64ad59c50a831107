//! Feature scattering: probabilistic placement of biome-appropriate content
//! (trees, stones, flowers, grass, settlement buildings) onto a chunk. All
//! randomness is hash-keyed by world seed and coordinates, so a chunk always
//! scatters the same way for a given seed.
#![forbid(unsafe_code)]

mod hash;

use std::f32::consts::TAU;

use veld_chunk::ChunkTerrain;
use veld_geom::{Transform, Vec3};
use veld_world::{FeatureDescriptor, FeatureKind, SettlementParams, TerrainSampler};

pub use hash::{hash3, rand01, rand_range};

/// One placed feature: a world transform parented to the owning chunk plus
/// the shape parameters the rendering collaborator needs to build it.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureInstance {
    pub transform: Transform,
    pub shape: FeatureShape,
}

/// Closed set of shape-construction strategies, one per feature category.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureShape {
    Tree {
        trunk_height: f32,
        trunk_radius: f32,
        canopy_radius: f32,
        tint: [f32; 3],
    },
    Stone {
        radius: f32,
        tint: [f32; 3],
    },
    Flower {
        petal_count: u32,
        stem_height: f32,
        tint: [f32; 3],
    },
    GrassTuft {
        blade_count: u32,
        color: [f32; 3],
    },
    Building {
        width: f32,
        depth: f32,
        height: f32,
    },
}

/// Number of instances a density places over an area: `floor(density * area)`.
/// Zero, negative, or non-finite densities place nothing.
#[inline]
pub fn instance_count(density: f32, area: f32) -> usize {
    if !density.is_finite() || density <= 0.0 {
        return 0;
    }
    (density * area).floor() as usize
}

// Per-kind salts decorrelating the draw streams.
const SALT_POS_X: u32 = 0x51a3_0d91;
const SALT_POS_Z: u32 = 0x2b7e_1519;
const SALT_YAW: u32 = 0x6a09_e667;
const SALT_SIZE: u32 = 0xbb67_ae85;
const SALT_TINT: u32 = 0x3c6e_f372;
const SALT_COUNT: u32 = 0xa54f_f53a;
const SALT_GRASS: u32 = 0x510e_527f;
const SALT_GATE: u32 = 0x9b05_688c;

fn kind_salt(kind: FeatureKind) -> u32 {
    match kind {
        FeatureKind::Tree => 0x1f83_d9ab,
        FeatureKind::Stone => 0x5be0_cd19,
        FeatureKind::Flower => 0xcbbb_9d5d,
    }
}

/// Scatters every descriptor-driven feature plus the biome's grass layer
/// over a chunk. Only the ground layer carries features; chunks on other
/// vertical layers yield nothing.
pub fn scatter_chunk(
    sampler: &TerrainSampler,
    terrain: &ChunkTerrain,
    seed: u32,
) -> Vec<FeatureInstance> {
    if terrain.coord.cy != 0 {
        return Vec::new();
    }
    let size = terrain.grid.size;
    let area = (size * size) as f32;
    let mut out = Vec::new();

    for desc in &terrain.biome.features {
        if !desc.density.is_finite() || desc.density < 0.0 {
            log::warn!(
                "biome {} has malformed {:?} density {}; skipping descriptor",
                terrain.biome.name,
                desc.kind,
                desc.density
            );
            continue;
        }
        let count = instance_count(desc.density, area);
        for k in 0..count {
            out.push(place_instance(sampler, terrain, seed, desc, k as i32));
        }
    }

    let grass = terrain.biome.grass;
    for k in 0..instance_count(grass.density, area) {
        let (transform, key) = draw_transform(sampler, terrain, seed ^ SALT_GRASS, k as i32, 0.8, 1.2);
        let blade_count = 5 + hash3(key.0, key.1, k as i32, seed ^ SALT_GRASS) % 8;
        out.push(FeatureInstance {
            transform,
            shape: FeatureShape::GrassTuft {
                blade_count,
                color: jitter_color(grass.color, seed ^ SALT_GRASS, key, k as i32),
            },
        });
    }

    out
}

fn place_instance(
    sampler: &TerrainSampler,
    terrain: &ChunkTerrain,
    seed: u32,
    desc: &FeatureDescriptor,
    k: i32,
) -> FeatureInstance {
    let salt = kind_salt(desc.kind);
    let (transform, key) = draw_transform(
        sampler,
        terrain,
        seed ^ salt,
        k,
        desc.size_min,
        desc.size_max,
    );
    let tint = jitter_color(desc.color, seed ^ salt, key, k);
    let shape = match desc.kind {
        FeatureKind::Tree => FeatureShape::Tree {
            trunk_height: rand_range(seed ^ salt, key.0, key.1, k, SALT_SIZE ^ 1, 3.0, 7.0),
            trunk_radius: rand_range(seed ^ salt, key.0, key.1, k, SALT_SIZE ^ 2, 0.15, 0.45),
            canopy_radius: rand_range(seed ^ salt, key.0, key.1, k, SALT_SIZE ^ 3, 1.2, 3.0),
            tint,
        },
        FeatureKind::Stone => FeatureShape::Stone {
            radius: rand_range(seed ^ salt, key.0, key.1, k, SALT_SIZE ^ 1, 0.3, 1.4),
            tint,
        },
        FeatureKind::Flower => FeatureShape::Flower {
            petal_count: 4 + hash3(key.0, key.1, k, seed ^ salt ^ SALT_COUNT) % 5,
            stem_height: rand_range(seed ^ salt, key.0, key.1, k, SALT_SIZE ^ 1, 0.2, 0.6),
            tint,
        },
    };
    FeatureInstance { transform, shape }
}

/// Draws a uniform local position inside the footprint, grounds it on the
/// height field at that world point, and rolls yaw + uniform scale.
fn draw_transform(
    sampler: &TerrainSampler,
    terrain: &ChunkTerrain,
    seed: u32,
    k: i32,
    size_min: f32,
    size_max: f32,
) -> (Transform, (i32, i32)) {
    let size = terrain.grid.size as f32;
    let key = (terrain.coord.cx, terrain.coord.cz);
    let lx = rand01(seed, key.0, key.1, k, SALT_POS_X) * size;
    let lz = rand01(seed, key.0, key.1, k, SALT_POS_Z) * size;
    let (bx, bz) = terrain.coord.base_world(terrain.grid.size);
    let wx = bx + lx;
    let wz = bz + lz;
    let y = sampler.height.elevation(&terrain.biome, wx, wz);
    let transform = Transform {
        position: Vec3::new(wx, y, wz),
        yaw: rand01(seed, key.0, key.1, k, SALT_YAW) * TAU,
        scale: rand_range(seed, key.0, key.1, k, SALT_SIZE, size_min, size_max),
    };
    (transform, key)
}

fn jitter_color(base: [f32; 3], seed: u32, key: (i32, i32), k: i32) -> [f32; 3] {
    let j = rand_range(seed, key.0, key.1, k, SALT_TINT, 0.9, 1.1);
    [
        (base[0] * j).clamp(0.0, 1.0),
        (base[1] * j).clamp(0.0, 1.0),
        (base[2] * j).clamp(0.0, 1.0),
    ]
}

// --- Grid-scale settlements ---

/// A settlement cell that passed its manifest gate: a handful of buildings
/// clustered near the cell center.
#[derive(Clone, Debug)]
pub struct Settlement {
    pub cell: (i32, i32),
    /// Building footprint centers in world (x, z) with shape draws applied
    /// when instantiated.
    pub building_sites: Vec<(f32, f32)>,
}

/// Evaluates the coarse settlement grid for one cell. Deterministic per
/// (seed, cell); `None` when the random gate keeps the cell empty.
pub fn settlement_for_cell(
    seed: u32,
    cell_x: i32,
    cell_z: i32,
    params: &SettlementParams,
    chunk_size: usize,
) -> Option<Settlement> {
    if !params.enable {
        return None;
    }
    if rand01(seed, cell_x, cell_z, 0, SALT_GATE) >= params.probability {
        return None;
    }
    let span = (params.buildings_max - params.buildings_min).max(0) as u32;
    let count = params.buildings_min
        + (hash3(cell_x, cell_z, 1, seed ^ SALT_COUNT) % (span + 1)) as i32;
    let cell_world = (params.cell_chunks as f32) * chunk_size as f32;
    let center_x = (cell_x as f32 + 0.5) * cell_world;
    let center_z = (cell_z as f32 + 0.5) * cell_world;
    // Cluster within a two-chunk radius of the cell center.
    let spread = chunk_size as f32 * 2.0;
    let building_sites = (0..count.max(0))
        .map(|b| {
            (
                center_x + rand_range(seed, cell_x, cell_z, b, SALT_POS_X, -spread, spread),
                center_z + rand_range(seed, cell_x, cell_z, b, SALT_POS_Z, -spread, spread),
            )
        })
        .collect();
    Some(Settlement {
        cell: (cell_x, cell_z),
        building_sites,
    })
}

/// Building instances whose sites fall inside the given chunk's footprint.
/// Evaluated per chunk so streaming stays chunk-granular even though the
/// trigger grid is coarser.
pub fn settlement_buildings_in_chunk(
    sampler: &TerrainSampler,
    terrain: &ChunkTerrain,
    seed: u32,
) -> Vec<FeatureInstance> {
    if terrain.coord.cy != 0 {
        return Vec::new();
    }
    let params = sampler.params.settlements;
    let cell_x = terrain.coord.cx.div_euclid(params.cell_chunks);
    let cell_z = terrain.coord.cz.div_euclid(params.cell_chunks);
    let Some(settlement) = settlement_for_cell(seed, cell_x, cell_z, &params, terrain.grid.size)
    else {
        return Vec::new();
    };
    let size = terrain.grid.size as f32;
    let (bx, bz) = terrain.coord.base_world(terrain.grid.size);
    settlement
        .building_sites
        .iter()
        .enumerate()
        .filter(|(_, (wx, wz))| *wx >= bx && *wx < bx + size && *wz >= bz && *wz < bz + size)
        .map(|(b, (wx, wz))| {
            let b = b as i32;
            let y = sampler.elevation_at(*wx, *wz);
            FeatureInstance {
                transform: Transform {
                    position: Vec3::new(*wx, y, *wz),
                    yaw: rand01(seed, cell_x, cell_z, b, SALT_YAW) * TAU,
                    scale: 1.0,
                },
                shape: FeatureShape::Building {
                    width: rand_range(seed, cell_x, cell_z, b, SALT_SIZE ^ 1, 4.0, 8.0),
                    depth: rand_range(seed, cell_x, cell_z, b, SALT_SIZE ^ 2, 4.0, 8.0),
                    height: rand_range(seed, cell_x, cell_z, b, SALT_SIZE ^ 3, 3.0, 6.0),
                },
            }
        })
        .collect()
}
