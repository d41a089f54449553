use bevy::asset::RenderAssetUsages;
use bevy::math::{UVec3, Vec3};
use bevy_mesh::{Indices, Mesh, PrimitiveTopology};
use serde::{Deserialize, Serialize};

use crate::voxel::marching::{march_cubes, march_tetrahedra, MeshBuilder};
use crate::voxel::types::DensityGrid;

/// Triangle order handed to the renderer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winding {
    /// Counter-clockwise seen from the empty side.
    #[default]
    Native,
    /// Clockwise seen from the empty side.
    Reversed,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    #[default]
    Cubes,
    Tetrahedra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Density at which the surface is placed.
    pub iso_level: f32,
    pub winding: Winding,
    pub mode: ExtractionMode,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            iso_level: 0.0,
            winding: Winding::Native,
            mode: ExtractionMode::Cubes,
        }
    }
}

/// Vertex data of one chunk, positions in chunk grid coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Blend weights packed as (flat, slope, 0, 0).
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Unnormalized face normal following the stored winding.
    pub fn face_normal(&self, [a, b, c]: [u32; 3]) -> Vec3 {
        let a = Vec3::from_array(self.positions[a as usize]);
        let b = Vec3::from_array(self.positions[b as usize]);
        let c = Vec3::from_array(self.positions[c as usize]);
        (b - a).cross(c - a)
    }

    pub fn reverse_winding(&mut self) {
        for triangle in self.indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }
    }

    /// Replace the normals with area-weighted averages of the adjacent faces.
    ///
    /// Faces are read according to `winding`, so the result always points
    /// towards the empty side.
    pub fn recalculate_normals(&mut self, winding: Winding) {
        let sign = match winding {
            Winding::Native => 1.0,
            Winding::Reversed => -1.0,
        };
        let mut sums = vec![Vec3::ZERO; self.positions.len()];
        for triangle in self.triangles() {
            let normal = self.face_normal(triangle) * sign;
            for i in triangle {
                sums[i as usize] += normal;
            }
        }
        self.normals = sums.into_iter().map(|n| n.normalize_or_zero().to_array()).collect();
    }

    pub fn into_mesh(self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, self.colors);
        mesh.insert_indices(Indices::U32(self.indices));
        mesh
    }
}

/// Turns a density grid into triangles.
pub trait IsosurfaceExtractor: Send + Sync {
    fn config(&self) -> &ExtractorConfig;

    /// Extract the surface, skipping `padding` samples on every face of the
    /// grid. Returns `None` when nothing crosses the iso-level. Only
    /// positions and indices are filled in, positions in grid coordinates.
    fn extract(&self, voxels: &DensityGrid, padding: u32) -> Option<MeshData>;
}

/// Cube-local extractor: marching cubes or marching tetrahedra.
///
/// Vertices never leave `[padding, dim - 1 - padding]`, and neighbouring
/// chunks whose sample ranges touch produce matching edges.
#[derive(Clone, Debug, Default)]
pub struct MarchingExtractor {
    config: ExtractorConfig,
}

impl MarchingExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

impl IsosurfaceExtractor for MarchingExtractor {
    fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn extract(&self, voxels: &DensityGrid, padding: u32) -> Option<MeshData> {
        let dims = voxels.dims();
        if dims.min_element() < 2 * padding + 2 {
            return None;
        }

        // Minimum corners of the first and last cube.
        let first = UVec3::splat(padding);
        let last = dims - 2 - padding;

        let mut builder = MeshBuilder::new(voxels, self.config.iso_level);
        match self.config.mode {
            ExtractionMode::Cubes => march_cubes(&mut builder, first, last),
            ExtractionMode::Tetrahedra => march_tetrahedra(&mut builder, first, last),
        }

        let mut mesh = builder.finish();
        if mesh.is_empty() {
            return None;
        }
        if self.config.winding == Winding::Reversed {
            mesh.reverse_winding();
        }
        Some(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::types::Grid3;

    const MODES: [ExtractionMode; 2] = [ExtractionMode::Cubes, ExtractionMode::Tetrahedra];

    fn plane(dims: UVec3, level: f32) -> DensityGrid {
        Grid3::from_fn(dims, |p| (p.y as f32 - level).clamp(-1.0, 1.0))
    }

    fn sphere(dims: UVec3, centre: Vec3, radius: f32) -> DensityGrid {
        Grid3::from_fn(dims, |p| (p.as_vec3().distance(centre) - radius).clamp(-1.0, 1.0))
    }

    fn extractor(mode: ExtractionMode, winding: Winding) -> MarchingExtractor {
        MarchingExtractor::new(ExtractorConfig {
            winding,
            mode,
            ..Default::default()
        })
    }

    #[test]
    fn solid_grid_yields_nothing() {
        let grid = Grid3::from_fn(UVec3::splat(9), |_| -1.0);
        for mode in MODES {
            assert!(extractor(mode, Winding::Native).extract(&grid, 2).is_none());
        }
    }

    #[test]
    fn grid_smaller_than_padding_yields_nothing() {
        let grid = plane(UVec3::splat(5), 2.5);
        assert!(MarchingExtractor::default().extract(&grid, 2).is_none());
    }

    #[test]
    fn plane_stays_inside_the_padded_region() {
        for mode in MODES {
            let mesh = extractor(mode, Winding::Native).extract(&plane(UVec3::splat(9), 4.5), 2).unwrap();
            assert!(!mesh.is_empty());
            for p in &mesh.positions {
                assert!((p[1] - 4.5).abs() < 1e-5, "{p:?}");
                assert!((2.0..=6.0).contains(&p[0]) && (2.0..=6.0).contains(&p[2]), "{p:?}");
            }
        }
    }

    #[test]
    fn surface_outside_the_padded_region_is_ignored() {
        // Crossing between samples 0 and 1 lies in the padding.
        let grid = plane(UVec3::splat(9), 0.5);
        assert!(MarchingExtractor::default().extract(&grid, 2).is_none());
    }

    #[test]
    fn iso_level_moves_the_surface() {
        let grid = Grid3::from_fn(UVec3::splat(9), |p| p.y as f32 * 0.1);
        let config = ExtractorConfig {
            iso_level: 0.45,
            ..Default::default()
        };
        let mesh = MarchingExtractor::new(config).extract(&grid, 2).unwrap();
        assert!(mesh.positions.iter().all(|p| (p[1] - 4.5).abs() < 1e-4));
    }

    #[test]
    fn native_winding_faces_empty_space() {
        let centre = Vec3::splat(5.5);
        let grid = sphere(UVec3::splat(12), centre, 2.5);
        for mode in MODES {
            let mesh = extractor(mode, Winding::Native).extract(&grid, 2).unwrap();
            for triangle in mesh.triangles() {
                let mid = triangle
                    .iter()
                    .map(|&i| Vec3::from_array(mesh.positions[i as usize]))
                    .sum::<Vec3>()
                    / 3.0;
                assert!(mesh.face_normal(triangle).dot(mid - centre) >= 0.0);
            }
        }
    }

    #[test]
    fn sphere_mesh_is_closed() {
        let grid = sphere(UVec3::splat(12), Vec3::new(5.3, 5.6, 5.4), 2.7);
        for mode in MODES {
            let mesh = MarchingExtractor::new(ExtractorConfig { mode, ..Default::default() })
                .extract(&grid, 2)
                .unwrap();
            let mut edges = std::collections::HashMap::new();
            for [a, b, c] in mesh.triangles() {
                for (p, q) in [(a, b), (b, c), (c, a)] {
                    *edges.entry((p.min(q), p.max(q))).or_insert(0) += 1;
                }
            }
            assert!(edges.values().all(|n| *n == 2), "{mode:?} mesh has open edges");
        }
    }

    #[test]
    fn reversed_winding_flips_every_triangle() {
        let grid = sphere(UVec3::splat(12), Vec3::splat(5.5), 2.5);
        let native = extractor(ExtractionMode::Cubes, Winding::Native).extract(&grid, 2).unwrap();
        let reversed = extractor(ExtractionMode::Cubes, Winding::Reversed).extract(&grid, 2).unwrap();
        assert_eq!(native.positions, reversed.positions);
        for (a, b) in native.triangles().zip(reversed.triangles()) {
            assert_eq!([a[0], a[2], a[1]], b);
        }
    }

    #[test]
    fn recalculated_normals_point_outwards_for_either_winding() {
        let grid = plane(UVec3::splat(9), 4.5);
        for winding in [Winding::Native, Winding::Reversed] {
            let mut mesh = extractor(ExtractionMode::Cubes, winding).extract(&grid, 2).unwrap();
            mesh.recalculate_normals(winding);
            assert_eq!(mesh.normals.len(), mesh.vertex_count());
            for n in &mesh.normals {
                assert!(Vec3::from_array(*n).abs_diff_eq(Vec3::Y, 1e-5), "{n:?}");
            }
        }
    }

    #[test]
    fn into_mesh_carries_every_attribute() {
        let mut data = MarchingExtractor::default().extract(&plane(UVec3::splat(9), 4.5), 2).unwrap();
        data.recalculate_normals(Winding::Native);
        data.colors = vec![[1.0, 1.0, 0.0, 0.0]; data.vertex_count()];
        let vertices = data.vertex_count();
        let mesh = data.into_mesh();
        assert_eq!(mesh.count_vertices(), vertices);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    }
}
