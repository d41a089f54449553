//! One-shot 3x3x3 box filter over a density grid.

use crate::constants::SMOOTH_BORDER;
use crate::voxel::types::DensityGrid;

/// Every offset in {-1, 0, 1}^3.
const NEIGHBOURHOOD: [(i32, i32, i32); 27] = {
    let mut offsets = [(0, 0, 0); 27];
    let mut i = 0;
    while i < 27 {
        offsets[i] = (i as i32 % 3 - 1, (i as i32 / 3) % 3 - 1, i as i32 / 9 - 1);
        i += 1;
    }
    offsets
};

/// Average each interior cell with its 26 neighbours into a new grid.
///
/// Cells within [`SMOOTH_BORDER`] of any face are left at zero rather than
/// copied from `voxels`. Neighbouring chunks rely on that fade, so keep it.
pub fn smooth_voxels(voxels: &DensityGrid) -> DensityGrid {
    let dims = voxels.dims();
    let mut smoothed = DensityGrid::new(dims);

    if dims.min_element() <= 2 * SMOOTH_BORDER {
        return smoothed;
    }

    for x in SMOOTH_BORDER..dims.x - SMOOTH_BORDER {
        for y in SMOOTH_BORDER..dims.y - SMOOTH_BORDER {
            for z in SMOOTH_BORDER..dims.z - SMOOTH_BORDER {
                let sum: f32 = NEIGHBOURHOOD
                    .iter()
                    .map(|&(dx, dy, dz)| {
                        voxels.get(
                            x.wrapping_add_signed(dx),
                            y.wrapping_add_signed(dy),
                            z.wrapping_add_signed(dz),
                        )
                    })
                    .sum();
                smoothed.set(x, y, z, sum / NEIGHBOURHOOD.len() as f32);
            }
        }
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::types::Grid3;
    use bevy::math::UVec3;
    use proptest::prelude::*;

    fn hashed(p: UVec3) -> f32 {
        let n = p.x.wrapping_mul(374761393) ^ p.y.wrapping_mul(668265263) ^ p.z.wrapping_mul(2246822519);
        (n % 2001) as f32 / 1000.0 - 1.0
    }

    fn neighbourhood_mean(grid: &DensityGrid, x: u32, y: u32, z: u32) -> f32 {
        let mut sum = 0.0;
        for dz in 0..3 {
            for dy in 0..3 {
                for dx in 0..3 {
                    sum += grid.get(x + dx - 1, y + dy - 1, z + dz - 1);
                }
            }
        }
        sum / 27.0
    }

    #[test]
    fn offsets_cover_the_cube_once() {
        let mut seen = std::collections::HashSet::new();
        for offset in NEIGHBOURHOOD {
            assert!(seen.insert(offset));
            assert!([-1, 0, 1].contains(&offset.0));
            assert!([-1, 0, 1].contains(&offset.1));
            assert!([-1, 0, 1].contains(&offset.2));
        }
        assert_eq!(seen.len(), 27);
    }

    #[test]
    fn border_cells_fade_to_zero() {
        let grid = Grid3::from_fn(UVec3::splat(6), |_| 0.75);
        let smoothed = smooth_voxels(&grid);
        for i in 0..6 {
            for j in 0..6 {
                assert_eq!(smoothed.get(0, i, j), 0.0);
                assert_eq!(smoothed.get(5, i, j), 0.0);
                assert_eq!(smoothed.get(i, 0, j), 0.0);
                assert_eq!(smoothed.get(i, 5, j), 0.0);
                assert_eq!(smoothed.get(i, j, 0), 0.0);
                assert_eq!(smoothed.get(i, j, 5), 0.0);
            }
        }
        assert!((smoothed.get(1, 1, 1) - 0.75).abs() < 1e-6);
        assert!((smoothed.get(4, 4, 4) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn source_grid_is_untouched() {
        let grid = Grid3::from_fn(UVec3::new(5, 6, 7), hashed);
        let copy = grid.clone();
        smooth_voxels(&grid);
        assert_eq!(grid, copy);
    }

    #[test]
    fn tiny_grids_are_all_border() {
        let grid = Grid3::from_fn(UVec3::new(2, 8, 8), |_| 1.0);
        assert!(smooth_voxels(&grid).iter().all(|d| *d == 0.0));
    }

    proptest! {
        #[test]
        fn interior_is_the_neighbourhood_mean(
            w in 3u32..8,
            h in 3u32..8,
            l in 3u32..8,
            salt in any::<u32>(),
        ) {
            let grid = Grid3::from_fn(UVec3::new(w, h, l), |p| hashed(p + UVec3::splat(salt % 1024)));
            let smoothed = smooth_voxels(&grid);
            for x in 1..w - 1 {
                for y in 1..h - 1 {
                    for z in 1..l - 1 {
                        let expected = neighbourhood_mean(&grid, x, y, z);
                        prop_assert!((smoothed.get(x, y, z) - expected).abs() < 1e-5);
                    }
                }
            }
        }
    }
}
