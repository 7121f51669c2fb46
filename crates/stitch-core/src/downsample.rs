//! Per-axis integer downsampling applied before pairwise registration.
//!
//! Registration runs on reduced volumes for speed; the resulting corrections
//! are mapped back to full resolution by conjugating with the sampling scale.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::math::{nonuniform_scaling, Aff3, Real, Vec3};
use crate::volume::Dimensions;

/// Integer downsampling factors per axis. `1` leaves an axis untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downsampling {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Default for Downsampling {
    fn default() -> Self {
        Self::identity()
    }
}

impl Downsampling {
    pub fn identity() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }

    pub fn uniform(factor: u32) -> Self {
        Self {
            x: factor,
            y: factor,
            z: factor,
        }
    }

    /// In-plane downsampling with z pinned to 1, for single-slice datasets.
    pub fn xy(factor: u32) -> Self {
        Self {
            x: factor,
            y: factor,
            z: 1,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.x == 1 && self.y == 1 && self.z == 1
    }

    /// All factors must be at least 1.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.x >= 1 && self.y >= 1 && self.z >= 1,
            "downsampling factors must be >= 1, got {}x{}x{}",
            self.x,
            self.y,
            self.z
        );
        Ok(())
    }

    /// Grid size after downsampling (rounding up, so no axis collapses to 0).
    pub fn apply_to(&self, dims: Dimensions) -> Dimensions {
        let div = |n: u64, f: u32| n.div_ceil(f as u64);
        Dimensions::new(
            div(dims.x(), self.x),
            div(dims.y(), self.y),
            div(dims.z(), self.z),
        )
    }

    /// Scale factors as a real vector.
    pub fn scale(&self) -> Vec3 {
        Vec3::new(self.x as Real, self.y as Real, self.z as Real)
    }

    /// Affine mapping downsampled coordinates to full-resolution coordinates.
    pub fn to_transform(&self) -> Aff3 {
        nonuniform_scaling(&self.scale())
    }

    /// Affine mapping full-resolution coordinates to downsampled coordinates.
    pub fn inverse_transform(&self) -> Aff3 {
        let s = self.scale();
        nonuniform_scaling(&Vec3::new(1.0 / s.x, 1.0 / s.y, 1.0 / s.z))
    }

    /// Re-express a correction computed in downsampled space at full
    /// resolution: `S ∘ T ∘ S⁻¹`.
    pub fn upscale(&self, correction: &Aff3) -> Aff3 {
        if self.is_identity() {
            return *correction;
        }
        self.to_transform() * correction * self.inverse_transform()
    }
}
