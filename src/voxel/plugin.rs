use bevy::prelude::*;
use std::path::PathBuf;

use crate::config::TerrainConfig;
use crate::constants::CONFIG_PATH;
use crate::error::TerrainError;
use crate::rendering::materials::{setup_terrain_material, TerrainMaterial};
use crate::rendering::splat_material::SplatMaterial;
use crate::voxel::chunk_grid::{ChunkGrid, GridStats, MeshSink};
use crate::voxel::meshing::{MeshData, MarchingExtractor};
use crate::voxel::noise::FractalPerlin;

/// Generates the whole terrain once at startup.
pub struct TerrainPlugin {
    pub config_path: PathBuf,
}

impl Default for TerrainPlugin {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_PATH),
        }
    }
}

/// Marks the entity rendering one chunk.
#[derive(Component, Debug)]
pub struct TerrainChunk {
    pub coords: IVec3,
}

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        let config = TerrainConfig::load_or_default(&self.config_path);

        app
            .insert_resource(config)
            .add_plugins(MaterialPlugin::<SplatMaterial>::default())
            .add_systems(Startup, (setup_terrain_material, generate_terrain).chain());
    }
}

/// Spawns one entity per submitted chunk mesh.
struct ChunkSpawner<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a mut Assets<Mesh>,
    material: Handle<SplatMaterial>,
}

impl MeshSink for ChunkSpawner<'_, '_, '_> {
    fn submit_mesh(&mut self, coords: IVec3, origin: Vec3, mesh: MeshData) {
        let mesh_handle = self.meshes.add(mesh.into_mesh());
        self.commands.spawn((
            Mesh3d(mesh_handle),
            MeshMaterial3d(self.material.clone()),
            Transform::from_translation(origin),
            TerrainChunk { coords },
        ));
    }
}

pub fn build_terrain(config: &TerrainConfig, sink: &mut dyn MeshSink) -> Result<GridStats, TerrainError> {
    let mut grid = ChunkGrid::new(config)?;
    let noise = FractalPerlin::new(config.surface_seed);
    let extractor = MarchingExtractor::new(config.extraction.clone());
    grid.build(&noise, &extractor, sink)
}

fn generate_terrain(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    material: Res<TerrainMaterial>,
    config: Res<TerrainConfig>,
) {
    let mut spawner = ChunkSpawner {
        commands: &mut commands,
        meshes: &mut meshes,
        material: material.handle.clone(),
    };

    match build_terrain(&config, &mut spawner) {
        Ok(stats) => info!(
            "spawned {} terrain chunks ({} triangles)",
            stats.meshed_chunks, stats.triangles
        ),
        Err(e) => error!("terrain generation failed: {e}"),
    }
}
