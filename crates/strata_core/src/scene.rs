//! Public scene façade.
//!
//! `Scene` wraps a [`SceneEngine`] and forwards every call to it. After
//! [`Scene::dispose`] the engine (and with it the tree) is gone and every
//! operation answers with a neutral value instead of failing, so a host
//! render loop can keep polling during teardown.

use strata_math::Aabb;

use crate::config::SceneConfig;
use crate::engine::SceneEngine;
use crate::node::{NodeKind, SceneNode, TimeRange};

/// A time-sampled object hierarchy.
///
/// The root node is moved in at construction; the scene never creates or
/// destroys nodes, it only drives their time state and reads them.
#[derive(Debug)]
pub struct Scene<N: SceneNode> {
    engine: Option<SceneEngine<N>>,
}

impl<N: SceneNode> Scene<N> {
    /// Create a scene owning `root`, with the default configuration.
    pub fn new(root: N) -> Self {
        Self::with_config(root, SceneConfig::default())
    }

    /// Create a scene owning `root`.
    pub fn with_config(root: N, config: SceneConfig) -> Self {
        Self {
            engine: Some(SceneEngine::new(Some(root), config)),
        }
    }

    /// A scene without a root (e.g. an empty cache).
    pub fn empty() -> Self {
        Self {
            engine: Some(SceneEngine::new(None, SceneConfig::default())),
        }
    }

    /// Earliest time in milliseconds, 0.0 without a root.
    pub fn min_time(&self) -> f64 {
        self.engine.as_ref().map_or(0.0, |e| e.min_time())
    }

    /// Latest time in milliseconds, 0.0 without a root.
    pub fn max_time(&self) -> f64 {
        self.engine.as_ref().map_or(0.0, |e| e.max_time())
    }

    pub fn time_range(&self) -> TimeRange {
        self.engine
            .as_ref()
            .map_or(TimeRange::ZERO, |e| e.time_range())
    }

    /// True when there is nothing to animate.
    pub fn is_constant(&self) -> bool {
        self.time_range().is_constant()
    }

    /// Time of the last successful `update` that reached the tree.
    pub fn last_applied_time(&self) -> Option<u64> {
        self.engine.as_ref().and_then(|e| e.last_applied_time())
    }

    pub fn init(&mut self) -> bool {
        self.engine.as_mut().map_or(true, |e| e.init())
    }

    /// Advance the scene to `time_ms`. See [`SceneEngine::update`].
    pub fn update(&mut self, time_ms: u64) -> bool {
        self.engine.as_mut().map_or(true, |e| e.update(time_ms))
    }

    pub fn clear(&mut self) -> bool {
        self.engine.as_mut().map_or(true, |e| e.clear())
    }

    /// Release the tree. Safe to call more than once.
    pub fn dispose(&mut self) -> bool {
        if self.engine.take().is_some() {
            log::debug!("Scene disposed");
        }
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.engine.is_none()
    }

    /// Root name plus the names of its direct children (not recursive).
    pub fn object_name_list(&self) -> Vec<String> {
        self.engine
            .as_ref()
            .map_or_else(Vec::new, |e| e.object_name_list())
    }

    /// Paths of every descendant of the root.
    pub fn object_path_list(&self) -> Vec<String> {
        self.engine
            .as_ref()
            .map_or_else(Vec::new, |e| e.object_path_list())
    }

    /// Paths of every descendant of the given kind.
    pub fn path_list(&self, kind: NodeKind) -> Vec<String> {
        self.engine
            .as_ref()
            .map_or_else(Vec::new, |e| e.path_list(kind))
    }

    pub fn mesh_path_list(&self) -> Vec<String> {
        self.path_list(NodeKind::Mesh)
    }

    pub fn point_path_list(&self) -> Vec<String> {
        self.path_list(NodeKind::Point)
    }

    pub fn curve_path_list(&self) -> Vec<String> {
        self.path_list(NodeKind::Curve)
    }

    pub fn nurbs_path_list(&self) -> Vec<String> {
        self.path_list(NodeKind::NurbsPatch)
    }

    pub fn camera_path_list(&self) -> Vec<String> {
        self.path_list(NodeKind::Camera)
    }

    pub fn xform_path_list(&self) -> Vec<String> {
        self.path_list(NodeKind::Xform)
    }

    pub fn root_object(&self) -> Option<&N> {
        self.engine.as_ref().and_then(|e| e.root())
    }

    pub fn root_object_mut(&mut self) -> Option<&mut N> {
        self.engine.as_mut().and_then(|e| e.root_mut())
    }

    /// Total triangle count over every mesh in the tree.
    pub fn total_polygon_size(&self) -> usize {
        self.engine.as_ref().map_or(0, |e| e.total_polygon_size())
    }

    /// Look up a node by path (`/child/grandchild`).
    pub fn find_object(&self, path: &str) -> Option<&N> {
        self.engine.as_ref().and_then(|e| e.find_object(path))
    }

    pub fn find_object_mut(&mut self, path: &str) -> Option<&mut N> {
        self.engine.as_mut().and_then(|e| e.find_object_mut(path))
    }

    pub fn find_first_camera(&self) -> Option<&N> {
        self.engine.as_ref().and_then(|e| e.find_first_camera())
    }

    /// Bounds of the whole tree as of the last box update.
    pub fn world_bounds(&self) -> Aabb {
        self.root_object().map_or(Aabb::EMPTY, |root| root.bounds())
    }
}
