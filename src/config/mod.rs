pub mod loader;
pub mod terrain;

pub use loader::{load_config, ConfigError};
pub use terrain::{MaterialConfig, TerrainConfig};
