//! Worldgen configuration: TOML-deserialized config structs with defaults,
//! flattened into read-only runtime parameter tables. Biomes are data, not
//! code: one [`BiomeDefinition`] record per climate archetype, shared
//! process-wide behind `Arc`.

use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::noise::FractalParams;

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub climate: ClimateConfig,
    #[serde(default = "default_biome_table")]
    pub biomes: Vec<BiomeConfig>,
    #[serde(default)]
    pub settlements: SettlementConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
    #[serde(default)]
    pub preload: PreloadConfig,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            climate: ClimateConfig::default(),
            biomes: default_biome_table(),
            settlements: SettlementConfig::default(),
            streaming: StreamingConfig::default(),
            preload: PreloadConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClimateConfig {
    #[serde(default = "default_temp_freq")]
    pub temperature_frequency: f32,
    #[serde(default = "default_moisture_freq")]
    pub moisture_frequency: f32,
}
fn default_temp_freq() -> f32 {
    0.004
}
fn default_moisture_freq() -> f32 {
    0.006
}
impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            temperature_frequency: default_temp_freq(),
            moisture_frequency: default_moisture_freq(),
        }
    }
}

/// Closed set of scatterable feature categories. Shape construction for each
/// kind lives in the scatter crate; biome tables only carry data.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Tree,
    Stone,
    Flower,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BiomeConfig {
    pub name: String,
    /// Köppen-style classification code, e.g. "Af", "BWh", "ET".
    pub code: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub precipitation: f32,
    #[serde(default)]
    pub humidity: f32,
    #[serde(default)]
    pub temp_min: Option<f32>,
    #[serde(default)]
    pub temp_max: Option<f32>,
    #[serde(default)]
    pub moisture_min: Option<f32>,
    #[serde(default)]
    pub moisture_max: Option<f32>,
    #[serde(default)]
    pub height: HeightConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub features: Vec<FeatureConfig>,
    #[serde(default)]
    pub grass: GrassConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HeightConfig {
    #[serde(default = "default_height_scale")]
    pub scale: f32,
    #[serde(default = "default_height_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_height_freq")]
    pub frequency: f32,
    #[serde(default = "d_oct")]
    pub octaves: i32,
    #[serde(default = "d_pers")]
    pub persistence: f32,
    #[serde(default = "d_lac")]
    pub lacunarity: f32,
}
fn default_height_scale() -> f32 {
    1.0
}
fn default_height_amplitude() -> f32 {
    10.0
}
fn default_height_freq() -> f32 {
    0.02
}
fn d_oct() -> i32 {
    4
}
fn d_pers() -> f32 {
    0.5
}
fn d_lac() -> f32 {
    2.0
}
impl Default for HeightConfig {
    fn default() -> Self {
        Self {
            scale: default_height_scale(),
            amplitude: default_height_amplitude(),
            frequency: default_height_freq(),
            octaves: d_oct(),
            persistence: d_pers(),
            lacunarity: d_lac(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default = "default_base_color")]
    pub base_color: [f32; 3],
    #[serde(default = "default_texture_tile")]
    pub texture_tile: f32,
    #[serde(default = "default_slope_grass_max")]
    pub slope_grass_max: f32,
    #[serde(default = "default_slope_rock_min")]
    pub slope_rock_min: f32,
}
fn default_base_color() -> [f32; 3] {
    [0.35, 0.55, 0.25]
}
fn default_texture_tile() -> f32 {
    0.25
}
fn default_slope_grass_max() -> f32 {
    0.55
}
fn default_slope_rock_min() -> f32 {
    0.8
}
impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            base_color: default_base_color(),
            texture_tile: default_texture_tile(),
            slope_grass_max: default_slope_grass_max(),
            slope_rock_min: default_slope_rock_min(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FeatureConfig {
    pub kind: FeatureKind,
    /// Instances per square world unit; scaled by chunk area and floored at
    /// placement time.
    pub density: f32,
    #[serde(default = "default_size_min")]
    pub size_min: f32,
    #[serde(default = "default_size_max")]
    pub size_max: f32,
    #[serde(default = "default_feature_color")]
    pub color: [f32; 3],
}
fn default_size_min() -> f32 {
    0.8
}
fn default_size_max() -> f32 {
    1.3
}
fn default_feature_color() -> [f32; 3] {
    [0.5, 0.5, 0.5]
}

#[derive(Clone, Debug, Deserialize)]
pub struct GrassConfig {
    #[serde(default)]
    pub density: f32,
    #[serde(default = "default_grass_color")]
    pub color: [f32; 3],
}
fn default_grass_color() -> [f32; 3] {
    [0.33, 0.52, 0.2]
}
impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            density: 0.0,
            color: default_grass_color(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SettlementConfig {
    #[serde(default = "default_settlements_enable")]
    pub enable: bool,
    /// Side length of one settlement cell, in chunks.
    #[serde(default = "default_cell_chunks")]
    pub cell_chunks: i32,
    /// Chance that a cell manifests a settlement at all.
    #[serde(default = "default_settlement_prob")]
    pub probability: f32,
    #[serde(default = "default_buildings_min")]
    pub buildings_min: i32,
    #[serde(default = "default_buildings_max")]
    pub buildings_max: i32,
}
fn default_settlements_enable() -> bool {
    true
}
fn default_cell_chunks() -> i32 {
    32
}
fn default_settlement_prob() -> f32 {
    0.25
}
fn default_buildings_min() -> i32 {
    3
}
fn default_buildings_max() -> i32 {
    7
}
impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            enable: default_settlements_enable(),
            cell_chunks: default_cell_chunks(),
            probability: default_settlement_prob(),
            buildings_min: default_buildings_min(),
            buildings_max: default_buildings_max(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct StreamingConfig {
    /// Chunk radius kept resident around the player on each axis.
    #[serde(default = "default_render_distance")]
    pub render_distance: i32,
}
fn default_render_distance() -> i32 {
    4
}
impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: default_render_distance(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PreloadConfig {
    #[serde(default = "default_preload_radius")]
    pub radius: i32,
    /// Biome codes worth precomputing; empty means every biome.
    #[serde(default)]
    pub codes: Vec<String>,
}
fn default_preload_radius() -> i32 {
    6
}
impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            radius: default_preload_radius(),
            codes: Vec::new(),
        }
    }
}

// --- Flattened runtime parameters (snapshot of config) ---

#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub temperature_frequency: f32,
    pub moisture_frequency: f32,
    pub biomes: Vec<Arc<BiomeDefinition>>,
    pub settlements: SettlementParams,
    pub render_distance: i32,
    pub preload_radius: i32,
    pub preload_codes: Vec<String>,
}

/// One climate/terrain archetype. Immutable after construction; chunks hold
/// `Arc` references and never copy.
#[derive(Clone, Debug)]
pub struct BiomeDefinition {
    pub name: String,
    pub code: String,
    pub temperature: f32,
    pub precipitation: f32,
    pub humidity: f32,
    pub temp_min: f32,
    pub temp_max: f32,
    pub moisture_min: f32,
    pub moisture_max: f32,
    pub height: HeightParams,
    pub surface: SurfaceParams,
    pub features: Vec<FeatureDescriptor>,
    pub grass: GrassParams,
}

impl BiomeDefinition {
    /// Descriptor for one feature kind, if the biome carries it. Absent
    /// descriptors mean zero instances, never an error.
    pub fn feature(&self, kind: FeatureKind) -> Option<&FeatureDescriptor> {
        self.features.iter().find(|f| f.kind == kind)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HeightParams {
    pub scale: f32,
    pub amplitude: f32,
    pub fractal: FractalParams,
}

#[derive(Clone, Copy, Debug)]
pub struct SurfaceParams {
    pub base_color: [f32; 3],
    pub texture_tile: f32,
    pub slope_grass_max: f32,
    pub slope_rock_min: f32,
}

#[derive(Clone, Debug)]
pub struct FeatureDescriptor {
    pub kind: FeatureKind,
    pub density: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub color: [f32; 3],
}

#[derive(Clone, Copy, Debug)]
pub struct GrassParams {
    pub density: f32,
    pub color: [f32; 3],
}

#[derive(Clone, Copy, Debug)]
pub struct SettlementParams {
    pub enable: bool,
    pub cell_chunks: i32,
    pub probability: f32,
    pub buildings_min: i32,
    pub buildings_max: i32,
}

impl WorldGenParams {
    pub fn default() -> Self {
        Self::from_config(&WorldGenConfig::default())
    }

    pub fn from_config(cfg: &WorldGenConfig) -> Self {
        let table = if cfg.biomes.is_empty() {
            log::warn!("worldgen config has no biomes; falling back to built-in table");
            default_biome_table()
        } else {
            cfg.biomes.clone()
        };
        let biomes = table
            .iter()
            .map(|b| {
                Arc::new(BiomeDefinition {
                    name: b.name.clone(),
                    code: b.code.clone(),
                    temperature: b.temperature,
                    precipitation: b.precipitation,
                    humidity: b.humidity,
                    temp_min: b.temp_min.unwrap_or(0.0),
                    temp_max: b.temp_max.unwrap_or(1.0),
                    moisture_min: b.moisture_min.unwrap_or(0.0),
                    moisture_max: b.moisture_max.unwrap_or(1.0),
                    height: HeightParams {
                        scale: b.height.scale,
                        amplitude: b.height.amplitude,
                        fractal: FractalParams {
                            frequency: b.height.frequency,
                            octaves: b.height.octaves,
                            persistence: b.height.persistence,
                            lacunarity: b.height.lacunarity,
                        },
                    },
                    surface: SurfaceParams {
                        base_color: b.surface.base_color,
                        texture_tile: b.surface.texture_tile,
                        slope_grass_max: b.surface.slope_grass_max,
                        slope_rock_min: b.surface.slope_rock_min,
                    },
                    features: b
                        .features
                        .iter()
                        .map(|f| FeatureDescriptor {
                            kind: f.kind,
                            density: f.density,
                            size_min: f.size_min,
                            size_max: f.size_max,
                            color: f.color,
                        })
                        .collect(),
                    grass: GrassParams {
                        density: b.grass.density,
                        color: b.grass.color,
                    },
                })
            })
            .collect();
        Self {
            temperature_frequency: cfg.climate.temperature_frequency,
            moisture_frequency: cfg.climate.moisture_frequency,
            biomes,
            settlements: SettlementParams {
                enable: cfg.settlements.enable,
                cell_chunks: cfg.settlements.cell_chunks.max(1),
                probability: cfg.settlements.probability,
                buildings_min: cfg.settlements.buildings_min.max(0),
                buildings_max: cfg
                    .settlements
                    .buildings_max
                    .max(cfg.settlements.buildings_min.max(0)),
            },
            render_distance: cfg.streaming.render_distance.max(0),
            preload_radius: cfg.preload.radius.max(0),
            preload_codes: cfg.preload.codes.clone(),
        }
    }
}

pub fn load_params_from_path(path: &Path) -> Result<WorldGenParams, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: WorldGenConfig = toml::from_str(&s)?;
    Ok(WorldGenParams::from_config(&cfg))
}

// --- Built-in biome table ---
//
// Threshold intervals are half-open [min, max) over normalized climate in
// [0, 1], matched in declaration order; the final entry is a full-range
// catch-all so classification is total.

fn biome(name: &str, code: &str) -> BiomeConfig {
    BiomeConfig {
        name: name.to_string(),
        code: code.to_string(),
        temperature: 0.0,
        precipitation: 0.0,
        humidity: 0.0,
        temp_min: None,
        temp_max: None,
        moisture_min: None,
        moisture_max: None,
        height: HeightConfig::default(),
        surface: SurfaceConfig::default(),
        features: Vec::new(),
        grass: GrassConfig::default(),
    }
}

fn feature(kind: FeatureKind, density: f32, color: [f32; 3]) -> FeatureConfig {
    FeatureConfig {
        kind,
        density,
        size_min: default_size_min(),
        size_max: default_size_max(),
        color,
    }
}

pub(crate) fn default_biome_table() -> Vec<BiomeConfig> {
    let mut out = Vec::new();

    let mut tundra = biome("Tundra", "ET");
    tundra.temperature = -8.0;
    tundra.precipitation = 250.0;
    tundra.humidity = 0.6;
    tundra.temp_max = Some(0.22);
    tundra.height = HeightConfig {
        scale: 0.8,
        frequency: 0.012,
        octaves: 4,
        ..HeightConfig::default()
    };
    tundra.surface.base_color = [0.72, 0.74, 0.78];
    tundra.features = vec![
        feature(FeatureKind::Stone, 0.003, [0.55, 0.56, 0.6]),
        feature(FeatureKind::Flower, 0.0005, [0.85, 0.85, 0.95]),
    ];
    tundra.grass = GrassConfig {
        density: 0.005,
        color: [0.55, 0.58, 0.45],
    };
    out.push(tundra);

    let mut taiga = biome("Taiga", "Dfc");
    taiga.temperature = 2.0;
    taiga.precipitation = 500.0;
    taiga.humidity = 0.7;
    taiga.temp_max = Some(0.42);
    taiga.moisture_min = Some(0.4);
    taiga.height = HeightConfig {
        scale: 1.4,
        frequency: 0.018,
        octaves: 5,
        ..HeightConfig::default()
    };
    taiga.surface.base_color = [0.2, 0.35, 0.22];
    taiga.features = vec![
        feature(FeatureKind::Tree, 0.015, [0.1, 0.3, 0.15]),
        feature(FeatureKind::Stone, 0.002, [0.5, 0.5, 0.52]),
    ];
    taiga.grass = GrassConfig {
        density: 0.02,
        color: [0.28, 0.42, 0.24],
    };
    out.push(taiga);

    let mut steppe = biome("Steppe", "BSk");
    steppe.temperature = 8.0;
    steppe.precipitation = 300.0;
    steppe.humidity = 0.4;
    steppe.temp_max = Some(0.42);
    steppe.height = HeightConfig {
        scale: 0.6,
        frequency: 0.01,
        octaves: 3,
        ..HeightConfig::default()
    };
    steppe.surface.base_color = [0.55, 0.52, 0.3];
    steppe.features = vec![
        feature(FeatureKind::Stone, 0.001, [0.55, 0.52, 0.48]),
        feature(FeatureKind::Flower, 0.001, [0.9, 0.8, 0.3]),
    ];
    steppe.grass = GrassConfig {
        density: 0.06,
        color: [0.55, 0.55, 0.3],
    };
    out.push(steppe);

    let mut desert = biome("Desert", "BWh");
    desert.temperature = 30.0;
    desert.precipitation = 50.0;
    desert.humidity = 0.15;
    desert.temp_min = Some(0.65);
    desert.moisture_max = Some(0.3);
    desert.height = HeightConfig {
        scale: 0.3,
        frequency: 0.008,
        octaves: 3,
        ..HeightConfig::default()
    };
    desert.surface = SurfaceConfig {
        base_color: [0.85, 0.75, 0.5],
        texture_tile: 0.15,
        ..SurfaceConfig::default()
    };
    desert.features = vec![
        feature(FeatureKind::Stone, 0.0015, [0.7, 0.6, 0.45]),
        feature(FeatureKind::Tree, 0.0002, [0.35, 0.5, 0.3]),
    ];
    out.push(desert);

    let mut rainforest = biome("Rainforest", "Af");
    rainforest.temperature = 27.0;
    rainforest.precipitation = 2500.0;
    rainforest.humidity = 0.9;
    rainforest.temp_min = Some(0.65);
    rainforest.moisture_min = Some(0.65);
    rainforest.height = HeightConfig {
        scale: 1.2,
        frequency: 0.025,
        octaves: 5,
        ..HeightConfig::default()
    };
    rainforest.surface.base_color = [0.15, 0.4, 0.15];
    rainforest.features = vec![
        feature(FeatureKind::Tree, 0.03, [0.12, 0.38, 0.12]),
        feature(FeatureKind::Flower, 0.004, [0.9, 0.3, 0.5]),
    ];
    rainforest.grass = GrassConfig {
        density: 0.05,
        color: [0.2, 0.45, 0.18],
    };
    out.push(rainforest);

    let mut savanna = biome("Savanna", "Aw");
    savanna.temperature = 25.0;
    savanna.precipitation = 800.0;
    savanna.humidity = 0.5;
    savanna.temp_min = Some(0.65);
    savanna.height = HeightConfig {
        scale: 0.5,
        frequency: 0.01,
        octaves: 3,
        ..HeightConfig::default()
    };
    savanna.surface.base_color = [0.65, 0.6, 0.3];
    savanna.features = vec![feature(FeatureKind::Tree, 0.003, [0.4, 0.45, 0.2])];
    savanna.grass = GrassConfig {
        density: 0.07,
        color: [0.6, 0.58, 0.28],
    };
    out.push(savanna);

    let mut mediterranean = biome("Mediterranean", "Csa");
    mediterranean.temperature = 17.0;
    mediterranean.precipitation = 450.0;
    mediterranean.humidity = 0.55;
    mediterranean.temp_min = Some(0.55);
    mediterranean.temp_max = Some(0.65);
    mediterranean.moisture_max = Some(0.4);
    mediterranean.height = HeightConfig {
        scale: 0.9,
        frequency: 0.016,
        octaves: 4,
        ..HeightConfig::default()
    };
    mediterranean.surface.base_color = [0.5, 0.5, 0.28];
    mediterranean.features = vec![
        feature(FeatureKind::Tree, 0.008, [0.3, 0.42, 0.2]),
        feature(FeatureKind::Stone, 0.001, [0.6, 0.58, 0.52]),
        feature(FeatureKind::Flower, 0.002, [0.85, 0.5, 0.75]),
    ];
    mediterranean.grass = GrassConfig {
        density: 0.03,
        color: [0.45, 0.5, 0.25],
    };
    out.push(mediterranean);

    // Catch-all; full climate range so classification never falls through.
    let mut forest = biome("Forest", "Cfb");
    forest.temperature = 12.0;
    forest.precipitation = 900.0;
    forest.humidity = 0.7;
    forest.height = HeightConfig {
        scale: 1.0,
        frequency: 0.02,
        octaves: 4,
        ..HeightConfig::default()
    };
    forest.surface.base_color = [0.3, 0.5, 0.22];
    forest.features = vec![
        feature(FeatureKind::Tree, 0.02, [0.18, 0.4, 0.16]),
        feature(FeatureKind::Stone, 0.001, [0.52, 0.52, 0.54]),
        feature(FeatureKind::Flower, 0.003, [0.9, 0.75, 0.3]),
    ];
    forest.grass = GrassConfig {
        density: 0.05,
        color: [0.32, 0.5, 0.2],
    };
    out.push(forest);

    out
}
