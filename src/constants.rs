// Padding
//
// Every stencil used after density synthesis has radius 1: the box filter,
// the central-difference gradient and the trilinear lookup. Stacked they need
// 2 cells of slack on each side of the extracted region, 4 across an axis, and
// one more sample so the last cube of the chunk closes against its neighbour.
// Widening any stencil means revisiting all of these together.
pub const STENCIL_SLACK: u32 = 2;
pub const PADDING: u32 = 2 * STENCIL_SLACK + 1;
pub const ORIGIN_SHIFT: f32 = STENCIL_SLACK as f32;

// Cells the smoother writes: [SMOOTH_BORDER, dim - 1 - SMOOTH_BORDER]
pub const SMOOTH_BORDER: u32 = 1;
// Cells the normal builder writes: [NORMAL_BORDER, dim - 1 - NORMAL_BORDER]
pub const NORMAL_BORDER: u32 = 2;
// Samples skipped on each side by the extractor
pub const EXTRACTION_PADDING: u32 = STENCIL_SLACK;

// Density
pub const DENSITY_MIN: f32 = -1.0;
pub const DENSITY_MAX: f32 = 1.0;

// Slope classification
pub const FLAT_THRESHOLD: f32 = 0.8;
pub const SLOPE_EXPONENT: f32 = 2.0;

// World defaults (overridden by config)
pub const DEFAULT_SURFACE_SEED: u32 = 3;
pub const DEFAULT_CAVE_SEED: u32 = 5;
pub const DEFAULT_WORLD_CHUNKS_X: i32 = 5;
pub const DEFAULT_WORLD_CHUNKS_Y: i32 = 2;
pub const DEFAULT_WORLD_CHUNKS_Z: i32 = 5;
pub const DEFAULT_CHUNK_VOXELS: i32 = 25;
pub const DEFAULT_CHUNKS_ABOVE_GROUND: i32 = 1;

pub const CONFIG_PATH: &str = "config/terrain.yaml";
