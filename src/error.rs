use bevy::math::Vec3;
use thiserror::Error;

use crate::config::loader::ConfigError;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("vertex {position} lies outside the normal field interior [{min}, {max}]")]
    VertexOutOfRange { position: Vec3, min: Vec3, max: Vec3 },
}
