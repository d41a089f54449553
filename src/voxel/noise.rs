//! Coherent noise used to shape the terrain surface.

use noise::{NoiseFn, Perlin};

/// Seeded, deterministic fractal noise over the xz plane.
///
/// `frequency` is the feature size in world units: larger values stretch
/// the pattern out. `amplitude` scales the first octave; each further octave
/// doubles the sampling rate and halves the contribution.
pub trait NoiseField: Send + Sync {
    fn fractal_2d(&self, x: f32, z: f32, octaves: u32, frequency: f32, amplitude: f32) -> f32;
}

/// Perlin-based [`NoiseField`].
#[derive(Clone, Debug)]
pub struct FractalPerlin {
    perlin: Perlin,
    seed: u32,
}

impl FractalPerlin {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl NoiseField for FractalPerlin {
    fn fractal_2d(&self, x: f32, z: f32, octaves: u32, frequency: f32, amplitude: f32) -> f32 {
        let x = x as f64;
        let z = z as f64;
        let frequency = frequency as f64;
        let amplitude = amplitude as f64;

        let mut gain = 1.0;
        let mut sum = 0.0;
        for _ in 0..octaves {
            let value = self.perlin.get([x * gain / frequency, z * gain / frequency]);
            sum += value * amplitude / gain;
            gain *= 2.0;
        }
        sum as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_deterministic() {
        let a = FractalPerlin::new(3);
        let b = FractalPerlin::new(3);
        for i in 0..32 {
            let x = i as f32 * 7.3 - 40.0;
            let z = i as f32 * -3.1 + 12.0;
            assert_eq!(a.fractal_2d(x, z, 6, 120.0, 32.0), b.fractal_2d(x, z, 6, 120.0, 32.0));
        }
    }

    #[test]
    fn seeds_produce_different_fields() {
        let a = FractalPerlin::new(3);
        let b = FractalPerlin::new(5);
        let differs = (0..64).any(|i| {
            let x = i as f32 * 13.7 + 0.5;
            a.fractal_2d(x, x * 0.3, 4, 80.0, 8.0) != b.fractal_2d(x, x * 0.3, 4, 80.0, 8.0)
        });
        assert!(differs);
    }

    #[test]
    fn zero_octaves_is_silent() {
        let noise = FractalPerlin::new(1);
        assert_eq!(noise.fractal_2d(12.5, -3.25, 0, 80.0, 8.0), 0.0);
    }

    #[test]
    fn output_is_bounded_by_octave_amplitudes() {
        // Perlin stays within [-1, 1], so the sum is bounded by amp * (1 + 1/2 + 1/4 + ...).
        let noise = FractalPerlin::new(9);
        for i in 0..256 {
            let v = noise.fractal_2d(i as f32 * 3.7, i as f32 * 1.9, 4, 80.0, 8.0);
            assert!(v.abs() <= 16.0, "{v}");
        }
    }
}
