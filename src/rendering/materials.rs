use bevy::prelude::*;

use crate::config::TerrainConfig;
use crate::rendering::splat_material::{SplatMaterial, SplatUniforms};

#[derive(Resource)]
pub struct TerrainMaterial {
    pub handle: Handle<SplatMaterial>,
}

/// Uniforms for the configured texture set.
pub fn splat_uniforms(config: &TerrainConfig) -> SplatUniforms {
    let [r, g, b] = config.material.base_color;
    let tint = |layer: LinearRgba| LinearRgba::rgb(layer.red * r, layer.green * g, layer.blue * b);
    let defaults = SplatUniforms::default();
    SplatUniforms {
        sand: tint(defaults.sand),
        gravel: tint(defaults.gravel),
        rock: tint(defaults.rock),
        tex_scale: config.material.tex_scale,
        ..defaults
    }
}

pub fn setup_terrain_material(
    mut commands: Commands,
    mut materials: ResMut<Assets<SplatMaterial>>,
    asset_server: Res<AssetServer>,
    config: Res<TerrainConfig>,
) {
    let detail_texture = config
        .material
        .texture
        .as_ref()
        .map(|path| asset_server.load(path.clone()));

    let handle = materials.add(SplatMaterial {
        uniforms: splat_uniforms(&config),
        detail_texture,
    });

    commands.insert_resource(TerrainMaterial { handle });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_tint_keeps_layer_colours() {
        let uniforms = splat_uniforms(&TerrainConfig::default());
        let defaults = SplatUniforms::default();
        assert_eq!(uniforms.sand, defaults.sand);
        assert_eq!(uniforms.rock, defaults.rock);
    }

    #[test]
    fn tint_scales_every_layer() {
        let mut config = TerrainConfig::default();
        config.material.base_color = [0.5, 1.0, 0.0];
        let uniforms = splat_uniforms(&config);
        let defaults = SplatUniforms::default();
        assert_eq!(uniforms.gravel.red, defaults.gravel.red * 0.5);
        assert_eq!(uniforms.gravel.green, defaults.gravel.green);
        assert_eq!(uniforms.gravel.blue, 0.0);
    }
}
