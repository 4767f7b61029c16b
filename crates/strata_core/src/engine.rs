//! Scene engine: owns the root, synchronizes time and answers queries.
//!
//! All traversals are pre-order, depth-first, children in stored order,
//! and run on an explicit stack so arbitrarily deep hierarchies cannot
//! overflow the call stack.
//!
//! Paths are built from the root's descendants only: a child of the root
//! named `body` has path `/body`, its child `hat` has `/body/hat`. The root's
//! own name never appears in a path.

use crate::config::SceneConfig;
use crate::node::{NodeKind, SceneNode, TimeRange};

/// The state behind a [`Scene`](crate::Scene).
///
/// A root-less engine is legal (e.g. an empty cache): every operation is
/// then a no-op that reports a neutral value.
#[derive(Debug)]
pub struct SceneEngine<N: SceneNode> {
    root: Option<N>,

    /// Last time pushed into the tree (`None` until the first successful update)
    last_applied_time: Option<u64>,

    config: SceneConfig,
}

impl<N: SceneNode> SceneEngine<N> {
    pub fn new(root: Option<N>, config: SceneConfig) -> Self {
        Self {
            root,
            last_applied_time: None,
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn root(&self) -> Option<&N> {
        self.root.as_ref()
    }

    /// Mutable root access for host glue. Does not touch the update cache.
    pub fn root_mut(&mut self) -> Option<&mut N> {
        self.root.as_mut()
    }

    /// Give the tree back, leaving the engine root-less.
    pub fn take_root(&mut self) -> Option<N> {
        self.last_applied_time = None;
        self.root.take()
    }

    pub fn last_applied_time(&self) -> Option<u64> {
        self.last_applied_time
    }

    /// Initialize the tree and compute bounds at the start of its time range.
    ///
    /// The tree's current time is restored afterwards. Always succeeds; a
    /// root that refuses to initialize is logged and left as is.
    pub fn init(&mut self) -> bool {
        let Some(root) = self.root.as_mut() else {
            log::debug!("init: no root object, nothing to do");
            return true;
        };

        let current = root.current_time_ms();
        if !root.init(true, None) {
            log::warn!("init: root object '{}' failed to initialize", root.name());
            return true;
        }

        let range = root.time_range();
        if self.config.compute_bounds_on_init {
            let seed = if range.is_valid() { range.min as u64 } else { 0 };
            root.set_current_time(seed, true);
            root.update_box(true);
            root.set_current_time(current, true);
        }

        log::info!(
            "Initialized scene '{}': time range {}..{}ms",
            root.name(),
            range.min,
            range.max
        );
        true
    }

    /// Advance the whole tree to `time_ms`.
    ///
    /// Returns `true` without touching the tree when the scene is constant
    /// or already at `time_ms`, and `false` (again without touching
    /// anything) when `time_ms` lies outside the time range.
    pub fn update(&mut self, time_ms: u64) -> bool {
        if self.is_constant() {
            return true;
        }
        if self.last_applied_time == Some(time_ms) {
            return true;
        }

        let range = self.time_range();
        if !range.contains(time_ms) {
            if self.config.warn_out_of_range {
                log::warn!(
                    "update: {}ms outside time range {}..{}ms",
                    time_ms,
                    range.min,
                    range.max
                );
            } else {
                log::debug!("update: {}ms outside time range", time_ms);
            }
            return false;
        }

        if let Some(root) = self.root.as_mut() {
            root.set_current_time(time_ms, true);
        }
        log::debug!("update: applied {}ms", time_ms);
        self.last_applied_time = Some(time_ms);
        true
    }

    /// Reserved for derived scene resets; the tree is left untouched.
    pub fn clear(&mut self) -> bool {
        true
    }

    pub fn min_time(&self) -> f64 {
        self.root.as_ref().map_or(0.0, |root| root.min_time())
    }

    pub fn max_time(&self) -> f64 {
        self.root.as_ref().map_or(0.0, |root| root.max_time())
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.min_time(), self.max_time())
    }

    pub fn is_constant(&self) -> bool {
        self.time_range().is_constant()
    }

    /// Root name followed by the names of its direct children.
    ///
    /// Deliberately shallow: grandchildren are not listed.
    pub fn object_name_list(&self) -> Vec<String> {
        let Some(root) = self.root.as_ref() else {
            return Vec::new();
        };

        std::iter::once(root.name())
            .chain(root.children().iter().map(|child| child.name()))
            .map(str::to_string)
            .collect()
    }

    /// Paths of every descendant whose kind is `kind`, in traversal order.
    pub fn path_list(&self, kind: NodeKind) -> Vec<String> {
        self.filtered_path_list(|node| node.is_kind(kind))
    }

    /// Paths of every descendant, in traversal order.
    pub fn object_path_list(&self) -> Vec<String> {
        self.filtered_path_list(|_| true)
    }

    /// Paths of every descendant matching `filter`. Non-matching nodes are
    /// still descended into.
    pub fn filtered_path_list<F>(&self, mut filter: F) -> Vec<String>
    where
        F: FnMut(&N) -> bool,
    {
        let mut paths = Vec::new();
        self.walk_descendants(|path, node| {
            if filter(node) {
                paths.push(path.to_string());
            }
        });
        paths
    }

    /// First node (pre-order) whose path equals `path`.
    pub fn find_object(&self, path: &str) -> Option<&N> {
        let trail = self.locate(path)?;
        let root = self.root.as_ref()?;
        Some(
            trail
                .iter()
                .fold(root, |node, &index| &node.children()[index]),
        )
    }

    /// Mutable form of [`SceneEngine::find_object`].
    pub fn find_object_mut(&mut self, path: &str) -> Option<&mut N> {
        let trail = self.locate(path)?;
        let root = self.root.as_mut()?;
        Some(
            trail
                .iter()
                .fold(root, |node, &index| &mut node.children_mut()[index]),
        )
    }

    /// First camera in pre-order, the root included.
    pub fn find_first_camera(&self) -> Option<&N> {
        let mut stack: Vec<&N> = self.root.iter().collect();
        while let Some(node) = stack.pop() {
            if node.is_kind(NodeKind::Camera) {
                return Some(node);
            }
            stack.extend(node.children().iter().rev());
        }
        None
    }

    /// Sum of triangle counts over every mesh in the tree, the root included.
    pub fn total_polygon_size(&self) -> usize {
        let mut total = 0;
        let mut stack: Vec<&N> = self.root.iter().collect();
        while let Some(node) = stack.pop() {
            if node.is_kind(NodeKind::Mesh) {
                total += node.triangle_index().map_or(0, |tris| tris.len());
            }
            stack.extend(node.children().iter().rev());
        }
        total
    }

    /// Child-index trail from the root to the first node at `target`.
    ///
    /// Subtrees whose path is not a prefix of `target` cannot contain it
    /// and are skipped; this keeps first-match order intact.
    fn locate(&self, target: &str) -> Option<Vec<usize>> {
        let root = self.root.as_ref()?;
        let mut stack: Vec<(String, Vec<usize>, &N)> = Vec::new();
        push_children(&mut stack, "", &[], root);

        while let Some((path, trail, node)) = stack.pop() {
            if path == target {
                return Some(trail);
            }
            if is_path_prefix(&path, target) {
                push_children(&mut stack, &path, &trail, node);
            }
        }

        log::trace!("find_object: no match for {}", target);
        None
    }

    /// Pre-order walk over the root's descendants with their paths.
    fn walk_descendants<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&str, &'a N),
    {
        let Some(root) = self.root.as_ref() else {
            return;
        };

        let mut stack: Vec<(String, &'a N)> = root
            .children()
            .iter()
            .rev()
            .map(|child| (format!("/{}", child.name()), child))
            .collect();

        while let Some((path, node)) = stack.pop() {
            visit(&path, node);
            stack.extend(
                node.children()
                    .iter()
                    .rev()
                    .map(|child| (format!("{}/{}", path, child.name()), child)),
            );
        }
    }
}

/// Push `node`'s children (reversed, so they pop in stored order).
fn push_children<'a, N: SceneNode>(
    stack: &mut Vec<(String, Vec<usize>, &'a N)>,
    path: &str,
    trail: &[usize],
    node: &'a N,
) {
    for (index, child) in node.children().iter().enumerate().rev() {
        let mut child_trail = Vec::with_capacity(trail.len() + 1);
        child_trail.extend_from_slice(trail);
        child_trail.push(index);
        stack.push((format!("{}/{}", path, child.name()), child_trail, child));
    }
}

/// True if descendants of `path` could have path `target`.
fn is_path_prefix(path: &str, target: &str) -> bool {
    target
        .strip_prefix(path)
        .is_some_and(|rest| rest.starts_with('/'))
}
