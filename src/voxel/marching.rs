//! Cube-local surface extraction. Every triangle lies inside the cube that
//! produced it, so a mesh never reaches past the samples it was built from.

use bevy::math::{UVec3, Vec3};
use std::collections::HashMap;

use crate::voxel::meshing::MeshData;
use crate::voxel::tables::{CORNERS, EDGES, TETRAHEDRA, TRI_TABLE};
use crate::voxel::types::DensityGrid;

/// Accumulates triangles, sharing vertices between cubes through their edge.
pub struct MeshBuilder<'a> {
    voxels: &'a DensityGrid,
    iso_level: f32,
    mesh: MeshData,
    edge_vertices: HashMap<(usize, usize), u32>,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(voxels: &'a DensityGrid, iso_level: f32) -> Self {
        Self {
            voxels,
            iso_level,
            mesh: MeshData::new(),
            edge_vertices: HashMap::new(),
        }
    }

    /// Solid side of the surface.
    pub fn is_inside(&self, p: UVec3) -> bool {
        self.voxels.get(p.x, p.y, p.z) < self.iso_level
    }

    /// Order an edge as (inside, outside).
    fn edge(&self, p: UVec3, q: UVec3) -> (UVec3, UVec3) {
        if self.is_inside(p) { (p, q) } else { (q, p) }
    }

    fn edge_vertex(&mut self, inside: UVec3, outside: UVec3) -> u32 {
        let a = self.voxels.index(inside.x, inside.y, inside.z);
        let b = self.voxels.index(outside.x, outside.y, outside.z);
        let va = self.voxels.as_slice()[a];
        let vb = self.voxels.as_slice()[b];

        // A sample sitting exactly on the iso-level is one vertex for every
        // edge that reaches it.
        let key = if vb == self.iso_level { (b, b) } else { (a.min(b), a.max(b)) };
        if let Some(&index) = self.edge_vertices.get(&key) {
            return index;
        }

        // Axes where both ends agree stay exact, so vertices on a chunk face
        // land on the same coordinate in both chunks.
        let t = (self.iso_level - va) / (vb - va);
        let position = inside.as_vec3() + (outside.as_vec3() - inside.as_vec3()) * t;
        let index = self.mesh.positions.len() as u32;
        self.mesh.positions.push(position.to_array());
        self.edge_vertices.insert(key, index);
        index
    }

    /// Add a triangle through three crossing edges, given as (inside, outside).
    /// It is wound counter-clockwise seen from the empty side.
    fn triangle(&mut self, edges: [(UVec3, UVec3); 3]) {
        let [i0, mut i1, mut i2] = edges.map(|(inside, outside)| self.edge_vertex(inside, outside));
        if i0 == i1 || i1 == i2 || i0 == i2 {
            return;
        }

        let outward: Vec3 = edges
            .iter()
            .map(|(inside, outside)| outside.as_vec3() - inside.as_vec3())
            .sum();
        if self.mesh.face_normal([i0, i1, i2]).dot(outward) < 0.0 {
            std::mem::swap(&mut i1, &mut i2);
        }
        self.mesh.indices.extend([i0, i1, i2]);
    }

    /// Finished mesh without vertices that only degenerate triangles used.
    pub fn finish(self) -> MeshData {
        let mut mesh = self.mesh;
        let mut remap = vec![u32::MAX; mesh.positions.len()];
        let mut positions = Vec::with_capacity(mesh.positions.len());
        for index in mesh.indices.iter_mut() {
            let slot = &mut remap[*index as usize];
            if *slot == u32::MAX {
                *slot = positions.len() as u32;
                positions.push(mesh.positions[*index as usize]);
            }
            *index = *slot;
        }
        mesh.positions = positions;
        mesh
    }
}

fn cube_corners(base: UVec3) -> [UVec3; 8] {
    CORNERS.map(|c| base + UVec3::from_array(c))
}

fn cubes(first: UVec3, last: UVec3) -> impl Iterator<Item = UVec3> {
    (first.z..=last.z).flat_map(move |z| {
        (first.y..=last.y).flat_map(move |y| (first.x..=last.x).map(move |x| UVec3::new(x, y, z)))
    })
}

/// Marching cubes over the cubes whose minimum corner lies in [first, last].
pub fn march_cubes(builder: &mut MeshBuilder, first: UVec3, last: UVec3) {
    for base in cubes(first, last) {
        let corners = cube_corners(base);
        let mask = corners
            .iter()
            .enumerate()
            .filter(|(_, c)| builder.is_inside(**c))
            .fold(0usize, |mask, (i, _)| mask | 1 << i);
        if mask == 0 || mask == 255 {
            continue;
        }

        for triangle in TRI_TABLE[mask].chunks_exact(3).take_while(|t| t[0] >= 0) {
            let edges = [triangle[0], triangle[1], triangle[2]].map(|e| {
                let [a, b] = EDGES[e as usize];
                builder.edge(corners[a], corners[b])
            });
            builder.triangle(edges);
        }
    }
}

/// Marching tetrahedra, six per cube.
pub fn march_tetrahedra(builder: &mut MeshBuilder, first: UVec3, last: UVec3) {
    for base in cubes(first, last) {
        let corners = cube_corners(base);

        for tetrahedron in TETRAHEDRA {
            let mut inside = [UVec3::ZERO; 4];
            let mut outside = [UVec3::ZERO; 4];
            let (mut n_in, mut n_out) = (0, 0);
            for p in tetrahedron.map(|i| corners[i]) {
                if builder.is_inside(p) {
                    inside[n_in] = p;
                    n_in += 1;
                } else {
                    outside[n_out] = p;
                    n_out += 1;
                }
            }

            match n_in {
                1 => builder.triangle([
                    (inside[0], outside[0]),
                    (inside[0], outside[1]),
                    (inside[0], outside[2]),
                ]),
                3 => builder.triangle([
                    (inside[0], outside[0]),
                    (inside[1], outside[0]),
                    (inside[2], outside[0]),
                ]),
                2 => {
                    let (a, b, c, d) = (inside[0], inside[1], outside[0], outside[1]);
                    builder.triangle([(a, c), (a, d), (b, d)]);
                    builder.triangle([(a, c), (b, d), (b, c)]);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::types::Grid3;

    #[test]
    fn table_rows_are_whole_triangles() {
        for row in TRI_TABLE {
            let used = row.iter().take_while(|e| **e >= 0).count();
            assert_eq!(used % 3, 0);
            assert!(row[used..].iter().all(|e| *e == -1));
            assert!(row[..used].iter().all(|e| (0..12).contains(e)));
        }
        assert_eq!(TRI_TABLE[0][0], -1);
        assert_eq!(TRI_TABLE[255][0], -1);
    }

    #[test]
    fn edges_join_adjacent_corners() {
        for [a, b] in EDGES {
            let diff: u32 = (0..3).map(|i| CORNERS[a][i].abs_diff(CORNERS[b][i])).sum();
            assert_eq!(diff, 1);
        }
    }

    #[test]
    fn shared_edges_share_vertices() {
        let grid = Grid3::from_fn(UVec3::splat(6), |p| p.y as f32 - 2.5);
        let mut builder = MeshBuilder::new(&grid, 0.0);
        march_cubes(&mut builder, UVec3::ZERO, UVec3::splat(4));
        let mesh = builder.finish();
        // One vertex per vertical edge crossing y = 2.5.
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.triangle_count(), 2 * 25);
    }

    #[test]
    fn samples_on_the_iso_level_collapse_to_one_vertex() {
        let grid = Grid3::from_fn(UVec3::splat(5), |p| p.y as f32 - 2.0);
        let mut builder = MeshBuilder::new(&grid, 0.0);
        march_tetrahedra(&mut builder, UVec3::ZERO, UVec3::splat(3));
        let mesh = builder.finish();
        assert!(mesh.positions.iter().all(|p| p[1] == 2.0));
        assert_eq!(mesh.vertex_count(), 25);
        for triangle in mesh.triangles() {
            assert!(mesh.face_normal(triangle).y > 0.0);
        }
    }
}
