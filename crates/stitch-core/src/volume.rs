//! Voxel dimensions and the owned image volume passed across the loader and
//! alignment seams.
//!
//! Pixel data is transient: volumes are loaded, aggregated and handed to the
//! registration kernel, but never serialized with the project.

use std::fmt;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::math::{Real, Vec3};

/// Voxel-grid size of a view, ordered `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions(pub [u64; 3]);

impl Dimensions {
    pub fn new(x: u64, y: u64, z: u64) -> Self {
        Self([x, y, z])
    }

    pub fn x(&self) -> u64 {
        self.0[0]
    }

    pub fn y(&self) -> u64 {
        self.0[1]
    }

    pub fn z(&self) -> u64 {
        self.0[2]
    }

    pub fn num_elements(&self) -> u64 {
        self.0.iter().product()
    }

    /// A single-slice volume: one voxel deep along z.
    pub fn is_2d(&self) -> bool {
        self.0[2] == 1
    }

    /// Physical extent as a real vector, in voxel units.
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.0[0] as Real, self.0[1] as Real, self.0[2] as Real)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.0[0], self.0[1], self.0[2])
    }
}

/// A dense single-channel voxel volume in x-fastest order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageVolume {
    dims: Dimensions,
    data: Vec<f32>,
}

impl ImageVolume {
    /// Wrap raw voxel data; the length must match the dimensions.
    pub fn new(dims: Dimensions, data: Vec<f32>) -> Result<Self> {
        ensure!(
            data.len() as u64 == dims.num_elements(),
            "voxel buffer has {} elements, dimensions {} require {}",
            data.len(),
            dims,
            dims.num_elements()
        );
        Ok(Self { dims, data })
    }

    /// A volume with every voxel set to `value`.
    pub fn filled(dims: Dimensions, value: f32) -> Self {
        Self {
            dims,
            data: vec![value; dims.num_elements() as usize],
        }
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, x: u64, y: u64, z: u64) -> f32 {
        self.data[self.index(x, y, z)]
    }

    pub fn set(&mut self, x: u64, y: u64, z: u64, value: f32) {
        let idx = self.index(x, y, z);
        self.data[idx] = value;
    }

    /// Mean voxel intensity, 0.0 for an empty volume.
    pub fn mean(&self) -> Real {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: Real = self.data.iter().map(|&v| v as Real).sum();
        sum / self.data.len() as Real
    }

    fn index(&self, x: u64, y: u64, z: u64) -> usize {
        debug_assert!(x < self.dims.x() && y < self.dims.y() && z < self.dims.z());
        (x + self.dims.x() * (y + self.dims.y() * z)) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_length_must_match_dimensions() {
        let err = ImageVolume::new(Dimensions::new(2, 2, 2), vec![0.0; 7]);
        assert!(err.is_err());
        assert!(ImageVolume::new(Dimensions::new(2, 2, 2), vec![0.0; 8]).is_ok());
    }

    #[test]
    fn voxel_access_uses_x_fastest_order() {
        let mut vol = ImageVolume::filled(Dimensions::new(2, 2, 2), 0.0);
        vol.set(1, 0, 0, 1.0);
        vol.set(0, 1, 0, 2.0);
        vol.set(0, 0, 1, 3.0);
        assert_eq!(vol.data()[1], 1.0);
        assert_eq!(vol.data()[2], 2.0);
        assert_eq!(vol.data()[4], 3.0);
        assert_eq!(vol.get(0, 0, 1), 3.0);
    }

    #[test]
    fn mean_of_uniform_volume() {
        let vol = ImageVolume::filled(Dimensions::new(4, 4, 1), 2.5);
        assert!((vol.mean() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn single_slice_detection() {
        assert!(Dimensions::new(128, 128, 1).is_2d());
        assert!(!Dimensions::new(128, 128, 2).is_2d());
    }
}
