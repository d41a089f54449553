pub mod types;
pub mod noise;
pub mod density;
pub mod smoothing;
pub mod normals;
pub mod classify;
pub mod tables;
pub mod marching;
pub mod meshing;
pub mod chunk;
pub mod chunk_grid;
pub mod plugin;
