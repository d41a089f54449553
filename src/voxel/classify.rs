use bevy::math::Vec3;

use crate::constants::{FLAT_THRESHOLD, SLOPE_EXPONENT};

/// Per-vertex texture blend weights derived from slope.
///
/// Rock takes whatever is left over (`1 - flat - slope`); the material
/// works that out, it is not stored here.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlendWeights {
    /// Sand on near-horizontal ground. Either 0 or 1.
    pub flat: f32,
    /// Gravel, fading out as the surface turns vertical.
    pub slope: f32,
}

impl BlendWeights {
    pub fn from_normal(normal: Vec3) -> Self {
        let up = normal.dot(Vec3::Y);
        Self {
            flat: if up.max(0.0) >= FLAT_THRESHOLD { 1.0 } else { 0.0 },
            slope: up.abs().powf(SLOPE_EXPONENT),
        }
    }

    /// Packed as a vertex colour: red = flat, green = slope.
    pub fn to_color(self) -> [f32; 4] {
        [self.flat, self.slope, 0.0, 0.0]
    }
}

pub fn classify_normals(normals: &[[f32; 3]]) -> Vec<[f32; 4]> {
    normals
        .iter()
        .map(|n| BlendWeights::from_normal(Vec3::from_array(*n)).to_color())
        .collect()
}
