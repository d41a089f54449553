use bevy::math::{IVec3, UVec3, Vec3};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::{ConfigError, TerrainConfig};
use crate::error::TerrainError;
use crate::voxel::chunk::{Chunk, ChunkBuilder};
use crate::voxel::meshing::{IsosurfaceExtractor, MeshData};
use crate::voxel::noise::NoiseField;

/// Receives finished chunk meshes, e.g. a renderer or physics world.
///
/// `origin` is the world translation to apply to the mesh, whose positions
/// are in chunk grid coordinates. The sink takes ownership of the mesh.
pub trait MeshSink {
    fn submit_mesh(&mut self, coords: IVec3, origin: Vec3, mesh: MeshData);
}

impl<F: FnMut(IVec3, Vec3, MeshData)> MeshSink for F {
    fn submit_mesh(&mut self, coords: IVec3, origin: Vec3, mesh: MeshData) {
        self(coords, origin, mesh)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
    pub chunks: usize,
    pub meshed_chunks: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Chunks laid out on a lattice, centred on x/z and split around y = 0.
#[derive(Debug)]
pub struct ChunkGrid {
    chunk_counts: UVec3,
    voxel_dims: UVec3,
    chunks_above_ground: u32,
    surface_level: f32,
    smooth_voxels: bool,
    calculate_normals: bool,
    chunks: Vec<Chunk>,
}

impl ChunkGrid {
    pub fn new(config: &TerrainConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        if config.chunks_above_ground == 0 {
            warn!("no chunk rows above y = 0; terrain above the surface level is cut off");
        }
        debug!("cave seed {} is reserved, no cave pass is applied", config.cave_seed);

        Ok(Self {
            chunk_counts: config.chunk_counts(),
            voxel_dims: config.voxel_dims(),
            chunks_above_ground: config.chunks_above_ground as u32,
            surface_level: config.surface_level,
            smooth_voxels: config.smooth_voxels,
            calculate_normals: config.calculate_normals,
            chunks: Vec::new(),
        })
    }

    pub fn chunk_counts(&self) -> UVec3 {
        self.chunk_counts
    }

    pub fn voxel_dims(&self) -> UVec3 {
        self.voxel_dims
    }

    /// Translation applied to every chunk.
    pub fn offset(&self) -> Vec3 {
        let counts = self.chunk_counts.as_vec3();
        let dims = self.voxel_dims.as_vec3();
        let rows_below = self.chunk_counts.y as f32 - self.chunks_above_ground as f32;
        Vec3::new(
            counts.x * dims.x * -0.5,
            -rows_below * dims.y,
            counts.z * dims.z * -0.5,
        )
    }

    /// World position of the first interior voxel of the chunk at `coords`.
    pub fn chunk_position(&self, coords: UVec3) -> Vec3 {
        (coords * self.voxel_dims).as_vec3() + self.offset()
    }

    /// Lattice coordinates in build order: x, then y, then z innermost.
    pub fn lattice(&self) -> impl Iterator<Item = UVec3> + use<> {
        let counts = self.chunk_counts;
        (0..counts.x).flat_map(move |x| {
            (0..counts.y).flat_map(move |y| (0..counts.z).map(move |z| UVec3::new(x, y, z)))
        })
    }

    fn lattice_index(&self, coords: UVec3) -> usize {
        let counts = self.chunk_counts;
        ((coords.x * counts.y + coords.y) * counts.z + coords.z) as usize
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Only populated after [`Self::build`].
    pub fn chunk(&self, coords: UVec3) -> Option<&Chunk> {
        if coords.cmplt(self.chunk_counts).all() {
            self.chunks.get(self.lattice_index(coords))
        } else {
            None
        }
    }

    /// Run one chunk through density, smoothing, normals and meshing.
    pub fn build_chunk(
        &self,
        coords: UVec3,
        noise: &dyn NoiseField,
        extractor: &dyn IsosurfaceExtractor,
    ) -> Result<(Chunk, Option<MeshData>), TerrainError> {
        let mut builder = ChunkBuilder::new(
            coords.as_ivec3(),
            self.chunk_position(coords),
            self.voxel_dims,
            self.surface_level,
        );
        builder.create_voxels(noise);
        if self.smooth_voxels {
            builder.smooth_voxels();
        }
        if self.calculate_normals {
            builder.calculate_normals();
        }
        builder.finish(extractor)
    }

    /// Build every chunk in parallel, then hand the meshes to `sink` on the
    /// calling thread in lattice order. Chunks without a surface are skipped.
    pub fn build(
        &mut self,
        noise: &dyn NoiseField,
        extractor: &dyn IsosurfaceExtractor,
        sink: &mut dyn MeshSink,
    ) -> Result<GridStats, TerrainError> {
        info!(
            "building {}x{}x{} chunks of {}x{}x{} voxels, offset {}",
            self.chunk_counts.x,
            self.chunk_counts.y,
            self.chunk_counts.z,
            self.voxel_dims.x,
            self.voxel_dims.y,
            self.voxel_dims.z,
            self.offset()
        );

        let coords: Vec<UVec3> = self.lattice().collect();
        let built = coords
            .par_iter()
            .map(|&c| self.build_chunk(c, noise, extractor))
            .collect::<Result<Vec<_>, _>>()?;

        let mut stats = GridStats {
            chunks: built.len(),
            ..Default::default()
        };
        let mut chunks = Vec::with_capacity(built.len());
        for (chunk, mesh) in built {
            if let Some(mesh) = mesh {
                stats.meshed_chunks += 1;
                stats.vertices += mesh.vertex_count();
                stats.triangles += mesh.triangle_count();
                sink.submit_mesh(chunk.coords(), chunk.origin(), mesh);
            }
            chunks.push(chunk);
        }
        self.chunks = chunks;

        info!(
            "terrain ready: {} of {} chunks meshed, {} vertices, {} triangles",
            stats.meshed_chunks, stats.chunks, stats.vertices, stats.triangles
        );
        Ok(stats)
    }
}
