//! Mathematical type definitions and affine helpers.
//!
//! All geometry in this crate lives in a right-handed 3D world space measured
//! in full-resolution voxel units. Planar (single-slice) datasets use the same
//! types with a unit extent along z.

use nalgebra::{Affine3, Matrix4, Point3, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 4×4 matrix with [`Real`] entries.
pub type Mat4 = Matrix4<Real>;
/// 3D affine transform using [`Real`].
pub type Aff3 = Affine3<Real>;

/// Build a pure translation by `v`.
pub fn translation(v: &Vec3) -> Aff3 {
    Aff3::from_matrix_unchecked(Mat4::new_translation(v))
}

/// Build a per-axis scaling by `s`.
///
/// All components must be non-zero for the result to be invertible.
pub fn nonuniform_scaling(s: &Vec3) -> Aff3 {
    Aff3::from_matrix_unchecked(Mat4::new_nonuniform_scaling(s))
}

/// Extract the translation component of an affine transform.
pub fn translation_of(t: &Aff3) -> Vec3 {
    t.matrix().fixed_view::<3, 1>(0, 3).into_owned()
}
