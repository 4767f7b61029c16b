//! Strata Math - spatial types for scene bounding data.
//!
//! Re-exports `glam` and adds the interval/box types the scene core uses
//! to track per-node bounds as the tree is advanced through time.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use transform::Mat4Ext;
