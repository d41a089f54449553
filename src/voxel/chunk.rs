use bevy::math::{IVec3, UVec3, Vec3};
use log::debug;

use crate::constants::{EXTRACTION_PADDING, ORIGIN_SHIFT, PADDING};
use crate::error::TerrainError;
use crate::voxel::classify::classify_normals;
use crate::voxel::density::build_density;
use crate::voxel::meshing::{IsosurfaceExtractor, MeshData};
use crate::voxel::noise::NoiseField;
use crate::voxel::normals::{calculate_normals, resample_normals};
use crate::voxel::smoothing::smooth_voxels;
use crate::voxel::types::{DensityGrid, NormalGrid};

/// A chunk while its grids are being built.
///
/// Stages run in order: [`Self::create_voxels`], then optionally
/// [`Self::smooth_voxels`] and [`Self::calculate_normals`]. [`Self::finish`]
/// extracts the mesh and consumes the builder, so a meshed chunk can never
/// drift from the grids it was meshed from.
///
/// The grids carry [`PADDING`] extra samples per axis so smoothing, normals
/// and seams can be computed without looking at neighbours.
#[derive(Clone, Debug)]
pub struct ChunkBuilder {
    coords: IVec3,
    origin: Vec3,
    dims: UVec3,
    surface_level: f32,
    voxels: DensityGrid,
    normals: Option<NormalGrid>,
}

impl ChunkBuilder {
    /// `position` is the world position of the chunk's first interior voxel.
    pub fn new(coords: IVec3, position: Vec3, dims: UVec3, surface_level: f32) -> Self {
        Self {
            coords,
            // Grid index i lands on world position origin + i.
            origin: position - Vec3::splat(ORIGIN_SHIFT),
            dims,
            surface_level,
            voxels: DensityGrid::new(dims + PADDING),
            normals: None,
        }
    }

    pub fn create_voxels(&mut self, noise: &dyn NoiseField) {
        self.voxels = build_density(noise, self.origin, self.surface_level, self.dims + PADDING);
    }

    pub fn smooth_voxels(&mut self) {
        self.voxels = smooth_voxels(&self.voxels);
    }

    pub fn calculate_normals(&mut self) {
        self.normals = Some(calculate_normals(&self.voxels));
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn voxels(&self) -> &DensityGrid {
        &self.voxels
    }

    /// Extract the surface and attach normals and blend weights.
    ///
    /// Without a normal field the normals are recomputed from the faces.
    /// The mesh is `None` when nothing crosses the iso-level.
    pub fn finish(self, extractor: &dyn IsosurfaceExtractor) -> Result<(Chunk, Option<MeshData>), TerrainError> {
        let mesh = match extractor.extract(&self.voxels, EXTRACTION_PADDING) {
            Some(mut mesh) => {
                match &self.normals {
                    Some(normals) => mesh.normals = resample_normals(normals, &mesh.positions)?,
                    None => mesh.recalculate_normals(extractor.config().winding),
                }
                mesh.colors = classify_normals(&mesh.normals);
                debug!(
                    "chunk {}: {} vertices, {} triangles",
                    self.coords,
                    mesh.vertex_count(),
                    mesh.triangle_count()
                );
                Some(mesh)
            }
            None => {
                debug!("chunk {} is empty", self.coords);
                None
            }
        };

        let chunk = Chunk {
            coords: self.coords,
            origin: self.origin,
            dims: self.dims,
            surface_level: self.surface_level,
            voxels: self.voxels,
            normals: self.normals,
        };
        Ok((chunk, mesh))
    }
}

/// A meshed chunk. Read-only; its mesh went to whoever called
/// [`ChunkBuilder::finish`].
#[derive(Clone, Debug)]
pub struct Chunk {
    coords: IVec3,
    origin: Vec3,
    dims: UVec3,
    surface_level: f32,
    voxels: DensityGrid,
    normals: Option<NormalGrid>,
}

impl Chunk {
    pub fn coords(&self) -> IVec3 {
        self.coords
    }

    /// World position of grid cell (0, 0, 0).
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    pub fn padded_dims(&self) -> UVec3 {
        self.dims + PADDING
    }

    pub fn surface_level(&self) -> f32 {
        self.surface_level
    }

    pub fn voxels(&self) -> &DensityGrid {
        &self.voxels
    }

    pub fn normals(&self) -> Option<&NormalGrid> {
        self.normals.as_ref()
    }
}
