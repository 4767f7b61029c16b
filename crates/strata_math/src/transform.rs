// Transform utilities for Mat4
//
// Note: glam::Mat4 already provides transform_point3() and inverse()

use glam::Mat4;

use crate::Aabb;

/// Extension trait for Mat4 used when rolling child bounds up into a parent.
pub trait Mat4Ext {
    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }

        aabb.corners()
            .iter()
            .fold(Aabb::EMPTY, |acc, &corner| {
                acc.include_point(self.transform_point3(corner))
            })
    }
}
