//! Axis-aligned bounding volumes in world space.
//!
//! Bounds are closed intervals per axis. Two volumes that share exactly one
//! face still count as overlapping, which mirrors how candidate pairs are
//! screened before registration: a shared boundary is a (degenerate) region
//! the kernel may still align on.

use serde::{Deserialize, Serialize};

use crate::math::{Aff3, Pt3, Real, Vec3};
use crate::volume::Dimensions;

/// Closed axis-aligned interval box `[min, max]` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl RealBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounds of the voxel grid `[0, size]` carried through `transform`.
    ///
    /// All eight corners are transformed and the result is their axis-aligned
    /// hull, so the bounds stay conservative under rotation and shear.
    pub fn from_dimensions(dims: Dimensions, transform: &Aff3) -> Self {
        let size = dims.as_vec3();
        let mut min = Vec3::repeat(Real::INFINITY);
        let mut max = Vec3::repeat(Real::NEG_INFINITY);
        for corner in 0..8u8 {
            let p = Pt3::new(
                if corner & 1 != 0 { size.x } else { 0.0 },
                if corner & 2 != 0 { size.y } else { 0.0 },
                if corner & 4 != 0 { size.z } else { 0.0 },
            );
            let q = transform * p;
            for axis in 0..3 {
                min[axis] = min[axis].min(q[axis]);
                max[axis] = max[axis].max(q[axis]);
            }
        }
        Self { min, max }
    }

    /// Smallest bounds containing both inputs.
    pub fn union(&self, other: &RealBounds) -> RealBounds {
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..3 {
            min[axis] = min[axis].min(other.min[axis]);
            max[axis] = max[axis].max(other.max[axis]);
        }
        RealBounds { min, max }
    }

    /// Closed-interval overlap test; touching faces count.
    pub fn intersects(&self, other: &RealBounds) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }

    /// Overlap region, if any. A degenerate (zero-extent) region is still
    /// returned when the boxes only touch.
    pub fn intersection(&self, other: &RealBounds) -> Option<RealBounds> {
        let mut min = Vec3::zeros();
        let mut max = Vec3::zeros();
        for axis in 0..3 {
            min[axis] = self.min[axis].max(other.min[axis]);
            max[axis] = self.max[axis].min(other.max[axis]);
            if min[axis] > max[axis] {
                return None;
            }
        }
        Some(RealBounds { min, max })
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::translation;

    fn unit_box_at(offset: Vec3) -> RealBounds {
        RealBounds::from_dimensions(Dimensions::new(1, 1, 1), &translation(&offset))
    }

    #[test]
    fn transformed_dimensions_span_the_full_grid() {
        let b = RealBounds::from_dimensions(
            Dimensions::new(4, 2, 1),
            &translation(&Vec3::new(10.0, 0.0, 0.0)),
        );
        assert_eq!(b.min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(b.max, Vec3::new(14.0, 2.0, 1.0));
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = unit_box_at(Vec3::zeros());
        let b = unit_box_at(Vec3::new(2.0, 0.0, 0.0));
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn touching_faces_count_as_overlap() {
        let a = unit_box_at(Vec3::zeros());
        let b = unit_box_at(Vec3::new(1.0, 0.0, 0.0));
        assert!(a.intersects(&b));
        let region = a.intersection(&b).unwrap();
        assert_eq!(region.size().x, 0.0);
    }

    #[test]
    fn intersection_of_overlapping_boxes() {
        let a = RealBounds::from_dimensions(Dimensions::new(4, 4, 4), &Aff3::identity());
        let b = unit_box_at(Vec3::new(3.0, 3.0, 3.0));
        let region = a.intersection(&b).unwrap();
        assert_eq!(region.min, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(region.max, Vec3::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn union_covers_both_boxes() {
        let a = unit_box_at(Vec3::zeros());
        let b = unit_box_at(Vec3::new(3.0, -1.0, 0.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Vec3::new(4.0, 1.0, 1.0));
    }
}
