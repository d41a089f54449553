//! Gradient normals and their trilinear reconstruction at mesh vertices.

use bevy::math::{UVec3, Vec3};

use crate::constants::NORMAL_BORDER;
use crate::error::TerrainError;
use crate::voxel::types::{DensityGrid, NormalGrid};

/// Central-difference gradient of `voxels`, normalized, in a new grid.
///
/// The gradient points from solid towards empty space, so no flip is needed.
/// Only cells at least [`NORMAL_BORDER`] away from every face are written;
/// the rest stay zero, as do cells with a flat gradient.
pub fn calculate_normals(voxels: &DensityGrid) -> NormalGrid {
    let dims = voxels.dims();
    let mut normals = NormalGrid::new(dims);

    if dims.min_element() <= 2 * NORMAL_BORDER {
        return normals;
    }

    for x in NORMAL_BORDER..dims.x - NORMAL_BORDER {
        for y in NORMAL_BORDER..dims.y - NORMAL_BORDER {
            for z in NORMAL_BORDER..dims.z - NORMAL_BORDER {
                let dx = voxels.get(x + 1, y, z) - voxels.get(x - 1, y, z);
                let dy = voxels.get(x, y + 1, z) - voxels.get(x, y - 1, z);
                let dz = voxels.get(x, y, z + 1) - voxels.get(x, y, z - 1);

                normals.set(x, y, z, Vec3::new(dx, dy, dz).normalize_or_zero());
            }
        }
    }

    normals
}

/// Range of grid coordinates a vertex may occupy to be resampled.
pub fn resample_bounds(dims: UVec3) -> (Vec3, Vec3) {
    let min = Vec3::splat(NORMAL_BORDER as f32);
    let max = (dims.as_ivec3() - 1 - NORMAL_BORDER as i32).as_vec3();
    (min, max)
}

/// Blend the 8 normals around `pos` (grid coordinates).
///
/// Blends along x, then z, then y. A vertex outside [`resample_bounds`] is a
/// broken extractor contract and is rejected, never clamped. A vertex exactly
/// on the upper bound reads its `+1` neighbours with zero weight.
pub fn trilinear_normal(normals: &NormalGrid, pos: Vec3) -> Result<Vec3, TerrainError> {
    let (min, max) = resample_bounds(normals.dims());
    if !(pos.cmpge(min).all() && pos.cmple(max).all()) {
        return Err(TerrainError::VertexOutOfRange {
            position: pos,
            min,
            max,
        });
    }

    let cell = pos.floor();
    let f = pos - cell;
    let (x, y, z) = (cell.x as u32, cell.y as u32, cell.z as u32);
    let n = |dx: u32, dy: u32, dz: u32| normals.get(x + dx, y + dy, z + dz);

    let x0 = n(0, 0, 0) * (1.0 - f.x) + n(1, 0, 0) * f.x;
    let x1 = n(0, 0, 1) * (1.0 - f.x) + n(1, 0, 1) * f.x;
    let x2 = n(0, 1, 0) * (1.0 - f.x) + n(1, 1, 0) * f.x;
    let x3 = n(0, 1, 1) * (1.0 - f.x) + n(1, 1, 1) * f.x;

    let z0 = x0 * (1.0 - f.z) + x1 * f.z;
    let z1 = x2 * (1.0 - f.z) + x3 * f.z;

    Ok(z0 * (1.0 - f.y) + z1 * f.y)
}

/// Resample a normal for every vertex in `positions`.
pub fn resample_normals(normals: &NormalGrid, positions: &[[f32; 3]]) -> Result<Vec<[f32; 3]>, TerrainError> {
    positions
        .iter()
        .map(|p| trilinear_normal(normals, Vec3::from_array(*p)).map(|n| n.to_array()))
        .collect()
}
