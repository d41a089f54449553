use bevy::prelude::*;
use voxel_terrain::config::TerrainConfig;
use voxel_terrain::voxel::plugin::TerrainPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(TerrainPlugin::default())
        // Pale sky
        .insert_resource(ClearColor(Color::srgb(0.65, 0.75, 0.9)))
        .add_systems(Startup, (spawn_camera, spawn_sun))
        .run();
}

/// Overview position: outside the terrain footprint, above the top row.
fn camera_position(config: &TerrainConfig) -> Vec3 {
    let size = config.chunk_counts().as_vec3() * config.voxel_dims().as_vec3();
    let height = config.chunks_above_ground.max(0) as f32 * size.y / config.chunk_counts().y.max(1) as f32;
    Vec3::new(size.x * 0.6, height + 20.0, size.z * 0.6)
}

/// Fixed overview camera looking at the centre of the terrain.
fn spawn_camera(mut commands: Commands, config: Res<TerrainConfig>) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(camera_position(&config)).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_sun(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(40.0, 80.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_sits_above_the_default_terrain() {
        let position = camera_position(&TerrainConfig::default());
        assert_eq!(position, Vec3::new(75.0, 45.0, 75.0));
    }

    #[test]
    fn huge_lattice_does_not_overflow() {
        let config = TerrainConfig {
            chunks: [i32::MAX, 2, i32::MAX],
            voxels: [i32::MAX, 25, i32::MAX],
            ..Default::default()
        };
        let position = camera_position(&config);
        assert!(position.is_finite());
        assert!(position.x > 0.0 && position.z > 0.0);
    }
}
