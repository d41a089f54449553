pub mod materials;
pub mod splat_material;
