//! Density synthesis: ground plus domain-warped mountains.

use bevy::math::{UVec3, Vec3};

use crate::constants::{DENSITY_MAX, DENSITY_MIN};
use crate::voxel::noise::NoiseField;
use crate::voxel::types::DensityGrid;

/// Octave count, feature size and height range of one noise lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseLayer {
    pub octaves: u32,
    pub frequency: f32,
    pub amplitude: f32,
}

impl NoiseLayer {
    /// Rolling ground, roughly +-8 units around the surface level.
    pub const GROUND: Self = Self {
        octaves: 4,
        frequency: 80.0,
        amplitude: 8.0,
    };
    /// Offset applied to the mountain lookup coordinates.
    pub const WARP: Self = Self {
        octaves: 3,
        frequency: 120.0,
        amplitude: 32.0,
    };
    /// Mountain height; the amplitude bounds the peak height.
    pub const MOUNTAIN: Self = Self {
        octaves: 6,
        frequency: 120.0,
        amplitude: 32.0,
    };

    pub fn sample(&self, noise: &dyn NoiseField, x: f32, z: f32) -> f32 {
        noise.fractal_2d(x, z, self.octaves, self.frequency, self.amplitude)
    }
}

pub fn sample_ground(noise: &dyn NoiseField, x: f32, z: f32) -> f32 {
    NoiseLayer::GROUND.sample(noise, x, z)
}

/// Never positive: mountains only ever raise the terrain.
pub fn sample_mountains(noise: &dyn NoiseField, x: f32, z: f32) -> f32 {
    let w = NoiseLayer::WARP.sample(noise, x, z);
    NoiseLayer::MOUNTAIN.sample(noise, x + w, z + w).min(0.0)
}

/// Column height term. Density is `height + worldY`, so a negative height
/// pushes the zero crossing upwards.
pub fn sample_height(noise: &dyn NoiseField, x: f32, z: f32) -> f32 {
    sample_mountains(noise, x, z) + sample_ground(noise, x, z)
}

/// Fill a padded grid of `dims` cells whose (0,0,0) cell sits at `origin`.
///
/// Negative density is solid, positive is empty, and every value is clamped
/// to [-1, 1]. The height is evaluated once per (x, z) column.
pub fn build_density(
    noise: &dyn NoiseField,
    origin: Vec3,
    surface_level: f32,
    dims: UVec3,
) -> DensityGrid {
    let mut voxels = DensityGrid::new(dims);

    for x in 0..dims.x {
        for z in 0..dims.z {
            let world_x = x as f32 + origin.x;
            let world_z = z as f32 + origin.z;
            let height = sample_height(noise, world_x, world_z);

            for y in 0..dims.y {
                let world_y = y as f32 + origin.y - surface_level;
                voxels.set(x, y, z, (height + world_y).clamp(DENSITY_MIN, DENSITY_MAX));
            }
        }
    }

    voxels
}
