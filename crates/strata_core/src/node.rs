//! The node capability consumed by the scene engine.
//!
//! The engine never needs to know how a node stores or decodes its data;
//! it only needs the hierarchy, the time bounds, a way to push a time
//! into the tree, and a kind tag to filter on.

use std::fmt;

use serde::{Deserialize, Serialize};
use strata_math::Aabb;

/// The closed set of node variants found in a geometry cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Polygon mesh (exposes a triangle index)
    Mesh,

    /// Point cloud
    Point,

    /// Curve set
    Curve,

    /// NURBS patch
    NurbsPatch,

    /// Camera
    Camera,

    /// Transform node
    Xform,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Mesh,
        NodeKind::Point,
        NodeKind::Curve,
        NodeKind::NurbsPatch,
        NodeKind::Camera,
        NodeKind::Xform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Mesh => "Mesh",
            NodeKind::Point => "Point",
            NodeKind::Curve => "Curve",
            NodeKind::NurbsPatch => "NurbsPatch",
            NodeKind::Camera => "Camera",
            NodeKind::Xform => "Xform",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time range in milliseconds.
///
/// `min > max` means "not time-varying". `EMPTY` is the identity for
/// [`TimeRange::surrounding`], so a subtree with no animated node at all
/// stays empty after its children are folded in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub min: f64,
    pub max: f64,
}

impl TimeRange {
    /// No animation.
    pub const EMPTY: TimeRange = TimeRange {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// What a scene without a root reports.
    pub const ZERO: TimeRange = TimeRange { min: 0.0, max: 0.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when `min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// True when there is nothing to animate (`min >= max`).
    ///
    /// A single instant counts as constant: there is only one state to show.
    pub fn is_constant(&self) -> bool {
        self.min >= self.max
    }

    /// Inclusive containment of a millisecond time.
    pub fn contains(&self, time_ms: u64) -> bool {
        let t = time_ms as f64;
        self.min <= t && t <= self.max
    }

    /// The range covering both inputs.
    pub fn surrounding(&self, other: &TimeRange) -> TimeRange {
        TimeRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Length of the range, zero when empty.
    pub fn duration(&self) -> f64 {
        if self.is_valid() {
            self.max - self.min
        } else {
            0.0
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// What a parent hands its children during `init`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InitContext {
    /// Path of the parent ("" for the scene root)
    pub path: String,

    /// Depth of the parent (0 for the scene root)
    pub depth: usize,
}

impl InitContext {
    /// Context describing `name` as a child of this context.
    pub fn child(&self, name: &str) -> InitContext {
        InitContext {
            path: format!("{}/{}", self.path, name),
            depth: self.depth + 1,
        }
    }
}

/// One element of a scene hierarchy, as seen by the scene engine.
///
/// The tree is owned by its root: each node owns its children, stored in
/// load order. Implementations are responsible for cascading
/// `set_current_time`, `init` and `update_box` when `recursive` is set;
/// the engine calls them once on the root.
pub trait SceneNode: Sized {
    fn name(&self) -> &str;

    fn kind(&self) -> NodeKind;

    fn children(&self) -> &[Self];

    fn children_mut(&mut self) -> &mut [Self];

    /// Earliest sample time in milliseconds.
    fn min_time(&self) -> f64;

    /// Latest sample time in milliseconds.
    fn max_time(&self) -> f64;

    fn current_time_ms(&self) -> u64;

    fn set_current_time(&mut self, time_ms: u64, recursive: bool);

    /// Prepare the node (and its subtree when `recursive`) for playback.
    /// `parent` is `None` for the scene root.
    fn init(&mut self, recursive: bool, parent: Option<&InitContext>) -> bool;

    /// Recompute spatial bounds at the current time.
    fn update_box(&mut self, recursive: bool);

    fn bounds(&self) -> Aabb;

    /// Flat per-triangle index triples. `Some` only for meshes.
    fn triangle_index(&self) -> Option<&[[u32; 3]]> {
        None
    }

    fn time_range(&self) -> TimeRange {
        TimeRange::new(self.min_time(), self.max_time())
    }

    fn is_kind(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }
}
