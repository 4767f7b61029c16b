//! Strata Core - time-synchronized traversal over cached geometry scenes.
//!
//! This crate provides:
//!
//! - **Node capability**: `SceneNode`, `NodeKind`, `TimeRange`
//! - **Object family**: `AbcObject`, an in-memory time-sampled hierarchy of
//!   meshes, points, curves, NURBS patches, cameras and transforms
//! - **Scene**: `Scene` (façade) over `SceneEngine`, which owns the root,
//!   pushes time into the tree at most once per distinct time, and answers
//!   name/path/lookup/polygon queries
//!
//! # Example
//!
//! ```ignore
//! use strata_core::Scene;
//!
//! let mut scene = Scene::new(root);
//! scene.init();
//! if scene.update(1500) {
//!     println!("{} triangles", scene.total_polygon_size());
//! }
//! for path in scene.mesh_path_list() {
//!     println!("{}", path);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod node;
pub mod object;
pub mod sample;
pub mod scene;

// Re-export commonly used types
pub use config::SceneConfig;
pub use engine::SceneEngine;
pub use error::{ObjectError, ObjectResult};
pub use node::{InitContext, NodeKind, SceneNode, TimeRange};
pub use object::{
    AbcObject, CameraData, CameraLens, CurveData, MeshData, NurbsPatchData, ObjectData, PointData,
    XformData,
};
pub use sample::Sampled;
pub use scene::Scene;
