use std::sync::Arc;

use crate::noise::NoiseField;
use crate::worldgen::{BiomeDefinition, WorldGenParams};

/// Maps a world (x, z) to one biome via two low-frequency climate fields
/// (temperature, moisture), each normalized into [0, 1]. Thresholds are
/// half-open intervals checked in declaration order; the last biome in the
/// table doubles as the fallback so every point classifies to exactly one
/// definition.
///
/// Classification is horizontal-only by design: elevation feeds off the
/// resolved biome, never the other way around.
pub struct BiomeResolver {
    temperature: NoiseField,
    moisture: NoiseField,
    temperature_frequency: f32,
    moisture_frequency: f32,
    biomes: Vec<Arc<BiomeDefinition>>,
}

impl BiomeResolver {
    pub fn new(seed: i32, params: &WorldGenParams) -> Self {
        debug_assert!(!params.biomes.is_empty());
        Self {
            temperature: NoiseField::new(seed ^ 0x1203_5F31),
            moisture: NoiseField::new(((seed as u32) ^ 0x92E3_A1B2u32) as i32),
            temperature_frequency: params.temperature_frequency,
            moisture_frequency: params.moisture_frequency,
            biomes: params.biomes.clone(),
        }
    }

    /// Normalized (temperature, moisture) climate sample at a world point.
    #[inline]
    pub fn climate_at(&self, wx: f32, wz: f32) -> (f32, f32) {
        let t = self
            .temperature
            .sample2(wx * self.temperature_frequency, wz * self.temperature_frequency);
        let m = self
            .moisture
            .sample2(wx * self.moisture_frequency, wz * self.moisture_frequency);
        (
            (t * 0.5 + 0.5).clamp(0.0, 1.0),
            (m * 0.5 + 0.5).clamp(0.0, 1.0),
        )
    }

    pub fn resolve(&self, wx: f32, wz: f32) -> Arc<BiomeDefinition> {
        let (temp, moist) = self.climate_at(wx, wz);
        Arc::clone(self.classify(temp, moist))
    }

    /// First biome whose [min, max) climate intervals contain the sample;
    /// falls back to the last table entry.
    pub fn classify(&self, temp: f32, moist: f32) -> &Arc<BiomeDefinition> {
        for def in &self.biomes {
            if temp >= def.temp_min
                && temp < def.temp_max
                && moist >= def.moisture_min
                && moist < def.moisture_max
            {
                return def;
            }
        }
        self.biomes.last().expect("biome table is never empty")
    }

    pub fn biomes(&self) -> &[Arc<BiomeDefinition>] {
        &self.biomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> BiomeResolver {
        BiomeResolver::new(42, &WorldGenParams::default())
    }

    #[test]
    fn classification_is_total_over_dense_climate_grid() {
        let r = resolver();
        // Every (temp, moist) point in the unit square maps to exactly one
        // biome, including the closed upper edge handled by the fallback.
        for ti in 0..=100 {
            for mi in 0..=100 {
                let temp = ti as f32 / 100.0;
                let moist = mi as f32 / 100.0;
                let def = r.classify(temp, moist);
                assert!(!def.name.is_empty(), "unclassified point ({temp},{moist})");
            }
        }
    }

    #[test]
    fn priority_order_breaks_overlaps() {
        let r = resolver();
        // Cold + wet satisfies both Taiga and the Steppe temperature band;
        // declaration order must pick Taiga.
        assert_eq!(r.classify(0.3, 0.8).code, "Dfc");
        assert_eq!(r.classify(0.3, 0.1).code, "BSk");
        assert_eq!(r.classify(0.1, 0.5).code, "ET");
        assert_eq!(r.classify(0.9, 0.1).code, "BWh");
        assert_eq!(r.classify(0.9, 0.9).code, "Af");
        assert_eq!(r.classify(0.9, 0.5).code, "Aw");
        assert_eq!(r.classify(0.5, 0.5).code, "Cfb");
    }

    #[test]
    fn resolve_is_deterministic() {
        let a = resolver();
        let b = resolver();
        for i in 0..50 {
            let x = i as f32 * 97.3 - 1000.0;
            let z = i as f32 * -41.7 + 250.0;
            assert_eq!(a.resolve(x, z).name, b.resolve(x, z).name);
        }
    }
}
