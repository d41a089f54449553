use bevy::math::{UVec3, Vec3};
use ndshape::{RuntimeShape, Shape};

/// Dense 3D grid stored as a flat arena, x varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid3<T> {
    dims: [u32; 3],
    data: Vec<T>,
}

pub type DensityGrid = Grid3<f32>;
pub type NormalGrid = Grid3<Vec3>;

impl<T: Copy + Default> Grid3<T> {
    /// A grid where every cell holds `T::default()`.
    pub fn new(dims: UVec3) -> Self {
        let len = dims.x as usize * dims.y as usize * dims.z as usize;
        Self {
            dims: dims.to_array(),
            data: vec![T::default(); len],
        }
    }

    pub fn from_fn(dims: UVec3, mut f: impl FnMut(UVec3) -> T) -> Self {
        let mut grid = Self::new(dims);
        let shape = grid.shape();
        for (i, cell) in grid.data.iter_mut().enumerate() {
            *cell = f(UVec3::from_array(shape.delinearize(i as u32)));
        }
        grid
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32, z: u32) -> T {
        self.data[self.index(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, z: u32, value: T) {
        let index = self.index(x, y, z);
        self.data[index] = value;
    }
}

impl<T> Grid3<T> {
    pub fn dims(&self) -> UVec3 {
        UVec3::from_array(self.dims)
    }

    pub fn shape(&self) -> RuntimeShape<u32, 3> {
        RuntimeShape::<u32, 3>::new(self.dims)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        x < self.dims[0] && y < self.dims[1] && z < self.dims[2]
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        debug_assert!(self.contains(x, y, z), "({x}, {y}, {z}) outside {:?}", self.dims);
        (x + self.dims[0] * (y + self.dims[1] * z)) as usize
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}
