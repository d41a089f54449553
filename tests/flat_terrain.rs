//! A single chunk over constant noise must produce a flat plane at y = 0.

use bevy::math::{IVec3, UVec3, Vec3};
use voxel_terrain::voxel::chunk::ChunkBuilder;
use voxel_terrain::voxel::meshing::{ExtractorConfig, MarchingExtractor};
use voxel_terrain::voxel::noise::NoiseField;

struct ZeroNoise;

impl NoiseField for ZeroNoise {
    fn fractal_2d(&self, _: f32, _: f32, _: u32, _: f32, _: f32) -> f32 {
        0.0
    }
}

fn flat_chunk() -> ChunkBuilder {
    // Interior spans world y in [-2, 2] so the plane crosses the middle.
    let mut builder = ChunkBuilder::new(IVec3::ZERO, Vec3::new(0.0, -2.0, 0.0), UVec3::splat(4), 0.0);
    builder.create_voxels(&ZeroNoise);
    builder
}

#[test]
fn density_is_clamped_world_height() {
    let chunk = flat_chunk();
    let voxels = chunk.voxels();
    assert_eq!(voxels.dims(), UVec3::splat(9));
    for x in 0..9 {
        for y in 0..9 {
            for z in 0..9 {
                let world_y = chunk.origin().y + y as f32;
                assert_eq!(voxels.get(x, y, z), world_y.clamp(-1.0, 1.0));
            }
        }
    }
}

#[test]
fn extraction_yields_a_level_plane_at_world_zero() {
    let mut chunk = flat_chunk();
    chunk.smooth_voxels();
    chunk.calculate_normals();

    let extractor = MarchingExtractor::new(ExtractorConfig::default());
    let origin = chunk.origin();
    let (_, mesh) = chunk.finish(&extractor).unwrap();
    let mesh = mesh.expect("plane crosses the chunk");

    assert!(mesh.triangle_count() > 0);
    for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
        let world = origin + Vec3::from_array(*p);
        assert!(world.y.abs() < 1e-4, "vertex off the plane: {world}");
        assert!(Vec3::from_array(*n).abs_diff_eq(Vec3::Y, 1e-5), "normal {n:?}");
    }
    for c in &mesh.colors {
        assert_eq!(c[0], 1.0);
        assert!((c[1] - 1.0).abs() < 1e-5 && c[2] == 0.0 && c[3] == 0.0, "weights {c:?}");
    }
}

#[test]
fn smoothing_keeps_the_plane_in_place() {
    let mut chunk = flat_chunk();
    let before = chunk.voxels().get(4, 4, 4);
    chunk.smooth_voxels();
    assert_eq!(before, 0.0);
    assert!(chunk.voxels().get(4, 4, 4).abs() < 1e-6);
    assert_eq!(chunk.voxels().get(0, 4, 4), 0.0);
    assert_eq!(chunk.voxels().get(4, 8, 4), 0.0);
}
