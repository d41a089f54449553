use bevy::math::UVec3;
use bevy::prelude::Resource;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::loader::{load_config, ConfigError};
use crate::constants::*;
use crate::voxel::meshing::ExtractorConfig;

/// Everything needed to lay out and generate the terrain.
///
/// Counts and dimensions are signed so that a bad YAML value reaches
/// [`TerrainConfig::validate`] instead of failing deserialization with an
/// unhelpful overflow message.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub surface_seed: u32,
    /// Reserved for subsurface features; no cave pass reads it yet.
    pub cave_seed: u32,
    /// Chunk counts along x, y, z.
    pub chunks: [i32; 3],
    /// Interior voxels per chunk along x, y, z.
    pub voxels: [i32; 3],
    /// How many chunk rows sit above the y = 0 plane.
    pub chunks_above_ground: i32,
    pub surface_level: f32,
    pub smooth_voxels: bool,
    pub calculate_normals: bool,
    pub extraction: ExtractorConfig,
    pub material: MaterialConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            surface_seed: DEFAULT_SURFACE_SEED,
            cave_seed: DEFAULT_CAVE_SEED,
            chunks: [
                DEFAULT_WORLD_CHUNKS_X,
                DEFAULT_WORLD_CHUNKS_Y,
                DEFAULT_WORLD_CHUNKS_Z,
            ],
            voxels: [DEFAULT_CHUNK_VOXELS; 3],
            chunks_above_ground: DEFAULT_CHUNKS_ABOVE_GROUND,
            surface_level: 0.0,
            smooth_voxels: true,
            calculate_normals: true,
            extraction: ExtractorConfig::default(),
            material: MaterialConfig::default(),
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, count) in ["x", "y", "z"].iter().zip(self.chunks) {
            if count < 1 {
                return Err(ConfigError::invalid(
                    "chunks",
                    format!("chunk count along {axis} must be at least 1, got {count}"),
                ));
            }
        }
        for (axis, dim) in ["x", "y", "z"].iter().zip(self.voxels) {
            if dim < 1 {
                return Err(ConfigError::invalid(
                    "voxels",
                    format!("voxel count along {axis} must be at least 1, got {dim}"),
                ));
            }
        }
        if !(0..=self.chunks[1]).contains(&self.chunks_above_ground) {
            return Err(ConfigError::invalid(
                "chunks_above_ground",
                format!(
                    "must be within [0, {}], got {}",
                    self.chunks[1], self.chunks_above_ground
                ),
            ));
        }
        if !self.surface_level.is_finite() {
            return Err(ConfigError::invalid("surface_level", "must be finite"));
        }
        if !(self.material.tex_scale.is_finite() && self.material.tex_scale > 0.0) {
            return Err(ConfigError::invalid("material.tex_scale", "must be positive"));
        }
        if !self.extraction.iso_level.is_finite() {
            return Err(ConfigError::invalid("extraction.iso_level", "must be finite"));
        }
        Ok(())
    }

    /// Read a config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Self::load`], but a missing, unparsable or invalid file logs a
    /// warning and yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!("using default terrain config, could not load {}: {e}", path.display());
            Self::default()
        })
    }

    /// Chunk counts; only meaningful once [`Self::validate`] passed.
    pub fn chunk_counts(&self) -> UVec3 {
        UVec3::from_array(self.chunks.map(|c| c.max(0) as u32))
    }

    /// Interior voxel dimensions; only meaningful once [`Self::validate`] passed.
    pub fn voxel_dims(&self) -> UVec3 {
        UVec3::from_array(self.voxels.map(|v| v.max(0) as u32))
    }
}

/// Texture set applied to the terrain mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    /// Linear RGB tint applied to every layer.
    pub base_color: [f32; 3],
    /// Detail texture relative to the asset folder.
    pub texture: Option<String>,
    /// World units per texture repeat.
    pub tex_scale: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0],
            texture: None,
            tex_scale: 8.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;
    use crate::voxel::meshing::{ExtractionMode, Winding};

    #[test]
    fn defaults_match_the_reference_scene() {
        let config = TerrainConfig::default();
        assert_eq!(config.chunks, [5, 2, 5]);
        assert_eq!(config.voxels, [25, 25, 25]);
        assert_eq!(config.surface_seed, 3);
        assert_eq!(config.cave_seed, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config: TerrainConfig = parse_config(
            "chunks: [3, 2, 1]\nvoxels: [10, 10, 10]\nextraction:\n  winding: native\n",
        )
        .unwrap();
        assert_eq!(config.chunk_counts(), UVec3::new(3, 2, 1));
        assert_eq!(config.voxel_dims(), UVec3::splat(10));
        assert_eq!(config.extraction.winding, Winding::Native);
        assert_eq!(config.extraction.mode, ExtractionMode::Cubes);
        assert_eq!(config.surface_level, 0.0);
    }

    #[test]
    fn rejects_non_positive_counts() {
        let config = TerrainConfig {
            chunks: [3, 0, 1],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "chunks", .. }));
        assert!(err.to_string().contains("along y"));
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let config = TerrainConfig {
            voxels: [10, 10, -4],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "voxels", .. })
        ));
    }

    #[test]
    fn rejects_chunks_above_ground_outside_lattice() {
        let config = TerrainConfig {
            chunks: [1, 2, 1],
            chunks_above_ground: 3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "chunks_above_ground",
                ..
            })
        ));
    }

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_validates_after_parsing() {
        let file = write_yaml("chunks: [0, 2, 5]\n");
        assert!(matches!(
            TerrainConfig::load(file.path()),
            Err(ConfigError::Invalid { field: "chunks", .. })
        ));
    }

    #[test]
    fn parsable_but_invalid_file_falls_back_to_defaults() {
        let file = write_yaml("chunks: [0, 2, 5]\nsurface_seed: 11\n");
        assert_eq!(TerrainConfig::load_or_default(file.path()), TerrainConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TerrainConfig::load_or_default(dir.path().join("terrain.yaml"));
        assert_eq!(config, TerrainConfig::default());
    }

    #[test]
    fn valid_file_is_kept() {
        let file = write_yaml("chunks: [3, 2, 1]\nsurface_seed: 11\n");
        let config = TerrainConfig::load_or_default(file.path());
        assert_eq!(config.chunks, [3, 2, 1]);
        assert_eq!(config.surface_seed, 11);
    }
}
