//! Criterion benchmarks for the per-chunk pipeline.
//!
//! Run with: cargo bench --bench chunk_pipeline

use bevy::math::{IVec3, UVec3, Vec3};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use voxel_terrain::voxel::chunk::ChunkBuilder;
use voxel_terrain::voxel::meshing::{ExtractionMode, ExtractorConfig, MarchingExtractor};
use voxel_terrain::voxel::noise::FractalPerlin;

fn surface_chunk() -> ChunkBuilder {
    ChunkBuilder::new(IVec3::ZERO, Vec3::new(0.0, -12.0, 0.0), UVec3::splat(25), 0.0)
}

fn bench_stages(c: &mut Criterion) {
    let noise = FractalPerlin::new(3);
    let mut group = c.benchmark_group("chunk_stages");

    group.bench_function("density", |b| {
        b.iter(|| {
            let mut chunk = surface_chunk();
            chunk.create_voxels(black_box(&noise));
            chunk
        });
    });

    let mut sampled = surface_chunk();
    sampled.create_voxels(&noise);

    group.bench_function("smooth", |b| {
        b.iter(|| {
            let mut chunk = sampled.clone();
            chunk.smooth_voxels();
            chunk
        });
    });

    group.bench_function("normals", |b| {
        b.iter(|| {
            let mut chunk = sampled.clone();
            chunk.calculate_normals();
            chunk
        });
    });

    group.finish();
}

fn bench_full_chunk(c: &mut Criterion) {
    let noise = FractalPerlin::new(3);
    let mut group = c.benchmark_group("chunk_full");

    for mode in [ExtractionMode::Cubes, ExtractionMode::Tetrahedra] {
        let extractor = MarchingExtractor::new(ExtractorConfig {
            mode,
            ..Default::default()
        });
        group.bench_function(format!("{mode:?}"), |b| {
            b.iter(|| {
                let mut chunk = surface_chunk();
                chunk.create_voxels(&noise);
                chunk.smooth_voxels();
                chunk.calculate_normals();
                chunk.finish(&extractor).ok().and_then(|(_, mesh)| mesh).map(|m| m.triangle_count())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stages, bench_full_chunk);
criterion_main!(benches);
