use bevy::{
    prelude::*,
    render::render_resource::{AsBindGroup, ShaderType},
};
use bevy_shader::ShaderRef;

pub const SPLAT_SHADER_PATH: &str = "shaders/terrain_splat.wgsl";

/// All splat material uniforms in a single struct for proper GPU alignment
#[derive(Clone, Copy, ShaderType, Debug)]
pub struct SplatUniforms {
    /// Flat ground layer (vertex colour red channel)
    pub sand: LinearRgba,
    /// Sloped ground layer (vertex colour green channel)
    pub gravel: LinearRgba,
    /// Whatever weight the other two layers leave over
    pub rock: LinearRgba,
    /// World units per texture repeat
    pub tex_scale: f32,
    /// Padding for alignment
    pub _padding: Vec3,
}

impl Default for SplatUniforms {
    fn default() -> Self {
        Self {
            sand: LinearRgba::rgb(0.76, 0.70, 0.50),
            gravel: LinearRgba::rgb(0.45, 0.42, 0.38),
            rock: LinearRgba::rgb(0.30, 0.28, 0.27),
            tex_scale: 8.0,
            _padding: Vec3::ZERO,
        }
    }
}

/// Terrain material blending three layers by the per-vertex slope weights
#[derive(Asset, TypePath, AsBindGroup, Clone, Debug, Default)]
pub struct SplatMaterial {
    #[uniform(0)]
    pub uniforms: SplatUniforms,

    /// Detail texture modulating every layer, sampled on the xz plane
    #[texture(1)]
    #[sampler(2)]
    pub detail_texture: Option<Handle<Image>>,
}

impl Material for SplatMaterial {
    fn fragment_shader() -> ShaderRef {
        SPLAT_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Opaque
    }
}
