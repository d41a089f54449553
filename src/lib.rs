pub mod constants;
pub mod config;
pub mod error;
pub mod voxel;
pub mod rendering;
