use proptest::prelude::*;
use veld_world::{BiomeResolver, WorldGenParams};

proptest! {
    // Every climate sample in the unit square classifies to exactly one
    // biome; the trailing catch-all closes the half-open upper edges.
    #[test]
    fn classification_is_total(temp in 0.0f32..=1.0, moist in 0.0f32..=1.0) {
        let r = BiomeResolver::new(7, &WorldGenParams::default());
        let def = r.classify(temp, moist);
        prop_assert!(!def.name.is_empty());
    }

    // Resolution is a pure function of (seed, position).
    #[test]
    fn resolution_is_pure(seed in 0i32..500, x in -1.0e4f32..1.0e4, z in -1.0e4f32..1.0e4) {
        let params = WorldGenParams::default();
        let a = BiomeResolver::new(seed, &params);
        let b = BiomeResolver::new(seed, &params);
        prop_assert_eq!(&a.resolve(x, z).name, &b.resolve(x, z).name);
    }
}
