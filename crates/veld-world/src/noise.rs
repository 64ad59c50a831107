use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;

/// Coherent-noise scalar field. Output stays near [-1, 1] and is a pure
/// function of the input coordinates; the generator holds no mutable state
/// after construction.
pub struct NoiseField {
    noise: FastNoiseLite,
}

impl NoiseField {
    /// Builds a field with unit base frequency; callers scale coordinates
    /// themselves so one field serves every octave.
    pub fn new(seed: i32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(1.0));
        Self { noise }
    }

    #[inline]
    pub fn sample2(&self, x: f32, z: f32) -> f32 {
        self.noise.get_noise_2d(x, z)
    }

    #[inline]
    pub fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        self.noise.get_noise_3d(x, y, z)
    }

    /// Multi-octave fractal sum, normalized by accumulated amplitude so the
    /// result stays in roughly [-1, 1] regardless of octave count.
    pub fn fbm2(&self, x: f32, z: f32, fractal: &FractalParams) -> f32 {
        let mut amp = 1.0_f32;
        let mut freq = fractal.frequency.max(1.0e-6);
        let mut sum = 0.0_f32;
        let mut max_amp = 0.0_f32;
        for _ in 0..fractal.octaves.max(1) {
            sum += self.sample2(x * freq, z * freq) * amp;
            max_amp += amp;
            amp *= fractal.persistence;
            freq *= fractal.lacunarity;
        }
        if max_amp > 0.0 { sum / max_amp } else { sum }
    }
}

/// Octave schedule for [`NoiseField::fbm2`].
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct FractalParams {
    pub frequency: f32,
    pub octaves: i32,
    pub persistence: f32,
    pub lacunarity: f32,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            frequency: 0.02,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_deterministic_and_bounded() {
        let a = NoiseField::new(1337);
        let b = NoiseField::new(1337);
        for i in 0..200 {
            let x = i as f32 * 0.73 - 40.0;
            let z = i as f32 * -1.19 + 7.0;
            let v = a.sample2(x, z);
            assert_eq!(v.to_bits(), b.sample2(x, z).to_bits());
            assert!(v.abs() <= 1.1, "sample {v} escaped expected range");
        }
    }

    #[test]
    fn volume_sample_is_deterministic_and_bounded() {
        let a = NoiseField::new(21);
        let b = NoiseField::new(21);
        for i in 0..100 {
            let (x, y, z) = (i as f32 * 0.9, i as f32 * -0.4, i as f32 * 1.3);
            let v = a.sample3(x, y, z);
            assert_eq!(v.to_bits(), b.sample3(x, y, z).to_bits());
            assert!(v.abs() <= 1.1, "sample {v} escaped expected range");
        }
    }

    #[test]
    fn fbm_normalization_keeps_range() {
        let n = NoiseField::new(7);
        let fr = FractalParams {
            frequency: 0.05,
            octaves: 6,
            persistence: 0.6,
            lacunarity: 2.0,
        };
        for i in 0..200 {
            let v = n.fbm2(i as f32 * 1.37, i as f32 * -0.61, &fr);
            assert!(v.abs() <= 1.1, "fbm {v} escaped expected range");
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        let mut same = 0;
        for i in 0..64 {
            let x = i as f32 * 3.1;
            if a.sample2(x, x) == b.sample2(x, x) {
                same += 1;
            }
        }
        assert!(same < 64);
    }
}
