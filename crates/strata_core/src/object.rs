//! In-memory time-sampled scene objects.
//!
//! `AbcObject` is a concrete [`SceneNode`]: a named node carrying one of
//! the six variant payloads plus its owned children. Payloads are built
//! from already-decoded sample data and validated on construction, so a
//! constructed tree is always consistent at every sample time.

use std::cmp::Ordering;

use strata_math::{Aabb, Mat4, Mat4Ext, Vec3};

use crate::error::{ObjectError, ObjectResult};
use crate::node::{InitContext, NodeKind, SceneNode, TimeRange};
use crate::sample::Sampled;

/// Polygon mesh with fixed topology and animated positions.
#[derive(Clone, Debug)]
pub struct MeshData {
    positions: Sampled<Vec<Vec3>>,
    triangles: Vec<[u32; 3]>,
}

impl MeshData {
    /// Create a mesh, checking every triangle index against every position sample.
    pub fn new(positions: Sampled<Vec<Vec3>>, triangles: Vec<[u32; 3]>) -> ObjectResult<Self> {
        for (time_ms, points) in positions.iter() {
            let vertex_count = points.len();
            if let Some(&index) = triangles
                .iter()
                .flatten()
                .find(|&&i| i as usize >= vertex_count)
            {
                return Err(ObjectError::IndexOutOfRange {
                    index,
                    vertex_count,
                    time_ms,
                });
            }
        }

        Ok(Self {
            positions,
            triangles,
        })
    }

    /// Convert flat indices (three per triangle) and build the mesh.
    pub fn from_flat_indices(positions: Sampled<Vec<Vec3>>, indices: &[u32]) -> ObjectResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(ObjectError::PartialTriangle {
                index_count: indices.len(),
            });
        }
        let triangles = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        Self::new(positions, triangles)
    }

    pub fn positions(&self) -> &Sampled<Vec<Vec3>> {
        &self.positions
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Point cloud.
#[derive(Clone, Debug)]
pub struct PointData {
    positions: Sampled<Vec<Vec3>>,
}

impl PointData {
    pub fn new(positions: Sampled<Vec<Vec3>>) -> Self {
        Self { positions }
    }

    pub fn positions(&self) -> &Sampled<Vec<Vec3>> {
        &self.positions
    }
}

/// A set of curves stored back to back in one position array.
#[derive(Clone, Debug)]
pub struct CurveData {
    positions: Sampled<Vec<Vec3>>,
    vertex_counts: Vec<u32>,
}

impl CurveData {
    pub fn new(positions: Sampled<Vec<Vec3>>, vertex_counts: Vec<u32>) -> ObjectResult<Self> {
        let expected: usize = vertex_counts.iter().map(|&c| c as usize).sum();
        for (time_ms, points) in positions.iter() {
            if points.len() != expected {
                return Err(ObjectError::CurveCountMismatch {
                    expected,
                    actual: points.len(),
                    time_ms,
                });
            }
        }

        Ok(Self {
            positions,
            vertex_counts,
        })
    }

    pub fn positions(&self) -> &Sampled<Vec<Vec3>> {
        &self.positions
    }

    pub fn vertex_counts(&self) -> &[u32] {
        &self.vertex_counts
    }

    pub fn curve_count(&self) -> usize {
        self.vertex_counts.len()
    }
}

/// NURBS patch described by its control grid.
#[derive(Clone, Debug)]
pub struct NurbsPatchData {
    control_points: Sampled<Vec<Vec3>>,
    u_count: usize,
    v_count: usize,
}

impl NurbsPatchData {
    pub fn new(
        control_points: Sampled<Vec<Vec3>>,
        u_count: usize,
        v_count: usize,
    ) -> ObjectResult<Self> {
        for (time_ms, points) in control_points.iter() {
            if points.len() != u_count * v_count {
                return Err(ObjectError::ControlGridMismatch {
                    u_count,
                    v_count,
                    actual: points.len(),
                    time_ms,
                });
            }
        }

        Ok(Self {
            control_points,
            u_count,
            v_count,
        })
    }

    pub fn control_points(&self) -> &Sampled<Vec<Vec3>> {
        &self.control_points
    }

    pub fn grid_size(&self) -> (usize, usize) {
        (self.u_count, self.v_count)
    }
}

/// Camera lens parameters (millimetres for focal length and aperture).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraLens {
    pub focal_length: f32,
    pub horizontal_aperture: f32,
    pub near_clip: f32,
    pub far_clip: f32,
}

impl Default for CameraLens {
    fn default() -> Self {
        Self {
            focal_length: 35.0,
            horizontal_aperture: 36.0,
            near_clip: 0.1,
            far_clip: 100_000.0,
        }
    }
}

impl CameraLens {
    /// Horizontal field of view in radians.
    pub fn horizontal_fov(&self) -> f32 {
        2.0 * (self.horizontal_aperture / (2.0 * self.focal_length)).atan()
    }
}

/// Animated camera.
#[derive(Clone, Debug)]
pub struct CameraData {
    lens: Sampled<CameraLens>,
}

impl CameraData {
    pub fn new(lens: Sampled<CameraLens>) -> ObjectResult<Self> {
        for (_, l) in lens.iter() {
            // NaN clip planes compare as unordered and are rejected too
            if l.near_clip.partial_cmp(&l.far_clip) != Some(Ordering::Less) {
                return Err(ObjectError::InvalidClipRange {
                    near: l.near_clip,
                    far: l.far_clip,
                });
            }
        }
        Ok(Self { lens })
    }

    pub fn lens(&self) -> &Sampled<CameraLens> {
        &self.lens
    }
}

/// Transform node.
#[derive(Clone, Debug)]
pub struct XformData {
    transform: Sampled<Mat4>,
}

impl XformData {
    pub fn new(transform: Sampled<Mat4>) -> Self {
        Self { transform }
    }

    pub fn identity() -> Self {
        Self::new(Sampled::constant(Mat4::IDENTITY))
    }

    pub fn transform(&self) -> &Sampled<Mat4> {
        &self.transform
    }
}

/// The variant payload of an [`AbcObject`].
#[derive(Clone, Debug)]
pub enum ObjectData {
    Mesh(MeshData),
    Point(PointData),
    Curve(CurveData),
    NurbsPatch(NurbsPatchData),
    Camera(CameraData),
    Xform(XformData),
}

impl ObjectData {
    pub fn kind(&self) -> NodeKind {
        match self {
            ObjectData::Mesh(_) => NodeKind::Mesh,
            ObjectData::Point(_) => NodeKind::Point,
            ObjectData::Curve(_) => NodeKind::Curve,
            ObjectData::NurbsPatch(_) => NodeKind::NurbsPatch,
            ObjectData::Camera(_) => NodeKind::Camera,
            ObjectData::Xform(_) => NodeKind::Xform,
        }
    }

    /// The time span covered by this payload alone.
    pub fn time_range(&self) -> TimeRange {
        match self {
            ObjectData::Mesh(m) => m.positions.time_range(),
            ObjectData::Point(p) => p.positions.time_range(),
            ObjectData::Curve(c) => c.positions.time_range(),
            ObjectData::NurbsPatch(n) => n.control_points.time_range(),
            ObjectData::Camera(c) => c.lens.time_range(),
            ObjectData::Xform(x) => x.transform.time_range(),
        }
    }

    /// Point data in effect at `time_ms`, for the geometric variants.
    pub fn positions_at(&self, time_ms: u64) -> Option<&[Vec3]> {
        let track = match self {
            ObjectData::Mesh(m) => &m.positions,
            ObjectData::Point(p) => &p.positions,
            ObjectData::Curve(c) => &c.positions,
            ObjectData::NurbsPatch(n) => &n.control_points,
            ObjectData::Camera(_) | ObjectData::Xform(_) => return None,
        };
        Some(track.value_at(time_ms).as_slice())
    }

    /// Transform applied to this node's subtree (identity except for xforms).
    pub fn local_transform_at(&self, time_ms: u64) -> Mat4 {
        match self {
            ObjectData::Xform(x) => *x.transform.value_at(time_ms),
            _ => Mat4::IDENTITY,
        }
    }
}

/// A node of an in-memory scene hierarchy.
#[derive(Debug)]
pub struct AbcObject {
    name: String,
    data: ObjectData,
    children: Vec<AbcObject>,
    current_time_ms: u64,
    time_range: TimeRange,
    bounds: Aabb,
    path: String,
}

impl AbcObject {
    /// Create a childless object. Names must be non-empty and free of `/`.
    pub fn new(name: impl Into<String>, data: ObjectData) -> ObjectResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ObjectError::EmptyName);
        }
        if name.contains('/') {
            return Err(ObjectError::InvalidName(name));
        }

        let time_range = data.time_range();
        Ok(Self {
            path: String::new(),
            name,
            data,
            children: Vec::new(),
            current_time_ms: 0,
            time_range,
            bounds: Aabb::EMPTY,
        })
    }

    pub fn mesh(name: impl Into<String>, mesh: MeshData) -> ObjectResult<Self> {
        Self::new(name, ObjectData::Mesh(mesh))
    }

    pub fn point(name: impl Into<String>, points: PointData) -> ObjectResult<Self> {
        Self::new(name, ObjectData::Point(points))
    }

    pub fn curve(name: impl Into<String>, curve: CurveData) -> ObjectResult<Self> {
        Self::new(name, ObjectData::Curve(curve))
    }

    pub fn nurbs_patch(name: impl Into<String>, patch: NurbsPatchData) -> ObjectResult<Self> {
        Self::new(name, ObjectData::NurbsPatch(patch))
    }

    pub fn camera(name: impl Into<String>, camera: CameraData) -> ObjectResult<Self> {
        Self::new(name, ObjectData::Camera(camera))
    }

    pub fn xform(name: impl Into<String>, xform: XformData) -> ObjectResult<Self> {
        Self::new(name, ObjectData::Xform(xform))
    }

    /// Append a child. Sibling names must be unique.
    pub fn add_child(&mut self, child: AbcObject) -> ObjectResult<()> {
        if self.children.iter().any(|c| c.name == child.name) {
            return Err(ObjectError::DuplicateChild(child.name.clone()));
        }
        self.children.push(child);
        Ok(())
    }

    /// Builder form of [`AbcObject::add_child`].
    pub fn with_child(mut self, child: AbcObject) -> ObjectResult<Self> {
        self.add_child(child)?;
        Ok(self)
    }

    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    /// Path below the scene root, assigned at `init`.
    ///
    /// Empty for the root itself and for nodes that were never initialized.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Point data at the current time, for the geometric variants.
    pub fn positions(&self) -> Option<&[Vec3]> {
        self.data.positions_at(self.current_time_ms)
    }

    /// Lens at the current time, for cameras.
    pub fn camera_lens(&self) -> Option<&CameraLens> {
        match &self.data {
            ObjectData::Camera(c) => Some(c.lens.value_at(self.current_time_ms)),
            _ => None,
        }
    }

    /// Local transform at the current time.
    pub fn local_transform(&self) -> Mat4 {
        self.data.local_transform_at(self.current_time_ms)
    }

    /// Geometry bounds of this node alone at the current time, in local space.
    fn own_bounds(&self) -> Aabb {
        self.data
            .positions_at(self.current_time_ms)
            .map(Aabb::enclosing)
            .unwrap_or(Aabb::EMPTY)
    }

    /// Visit the subtree in pre-order with an explicit stack. `visit` gets
    /// each node with its visit index and the visit index of its parent.
    fn walk_mut(&mut self, mut visit: impl FnMut(&mut AbcObject, usize, Option<usize>)) {
        let mut stack = vec![(self, None)];
        let mut index = 0;
        while let Some((node, parent)) = stack.pop() {
            visit(&mut *node, index, parent);
            stack.extend(node.children.iter_mut().map(|child| (child, Some(index))));
            index += 1;
        }
    }

    /// Number of nodes in this subtree, including self.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

impl SceneNode for AbcObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Self] {
        &mut self.children
    }

    fn min_time(&self) -> f64 {
        self.time_range.min
    }

    fn max_time(&self) -> f64 {
        self.time_range.max
    }

    fn current_time_ms(&self) -> u64 {
        self.current_time_ms
    }

    fn set_current_time(&mut self, time_ms: u64, recursive: bool) {
        if !recursive {
            self.current_time_ms = time_ms;
            return;
        }
        self.walk_mut(|node, _, _| node.current_time_ms = time_ms);
    }

    /// Assigns paths and folds the children's time ranges into this node's.
    fn init(&mut self, recursive: bool, parent: Option<&InitContext>) -> bool {
        let context = match parent {
            Some(parent) => parent.child(&self.name),
            None => InitContext::default(),
        };
        if !recursive {
            log::trace!("init '{}' ({}) depth {}", self.name, self.kind(), context.depth);
            self.path = context.path;
            self.time_range = self.data.time_range();
            return true;
        }

        let mut parents = Vec::new();
        let mut ranges = Vec::new();
        let mut stack = vec![(&mut *self, context, None)];
        while let Some((node, context, parent)) = stack.pop() {
            log::trace!("init '{}' ({}) depth {}", node.name, node.kind(), context.depth);
            let index = ranges.len();
            parents.push(parent);
            ranges.push(node.data.time_range());
            for child in node.children.iter_mut() {
                let child_context = context.child(&child.name);
                stack.push((child, child_context, Some(index)));
            }
            node.path = context.path;
        }

        // Children are visited after their parent, so a reverse sweep
        // completes every subtree before it is folded upward.
        for index in (1..ranges.len()).rev() {
            if let Some(parent) = parents[index] {
                ranges[parent] = ranges[parent].surrounding(&ranges[index]);
            }
        }
        self.walk_mut(|node, index, _| node.time_range = ranges[index]);
        true
    }

    /// Bounds are expressed in the parent's space: own geometry and child
    /// bounds, carried through this node's local transform.
    fn update_box(&mut self, recursive: bool) {
        if !recursive {
            let bounds = self
                .children
                .iter()
                .fold(self.own_bounds(), |acc, child| Aabb::surrounding(&acc, &child.bounds));
            self.bounds = self.local_transform().transform_aabb(&bounds);
            return;
        }

        let mut parents = Vec::new();
        let mut local = Vec::new();
        let mut transforms = Vec::new();
        self.walk_mut(|node, _, parent| {
            parents.push(parent);
            local.push(node.own_bounds());
            transforms.push(node.local_transform());
        });

        let mut finished = vec![Aabb::EMPTY; local.len()];
        for index in (0..local.len()).rev() {
            finished[index] = transforms[index].transform_aabb(&local[index]);
            if let Some(parent) = parents[index] {
                local[parent] = Aabb::surrounding(&local[parent], &finished[index]);
            }
        }
        self.walk_mut(|node, index, _| node.bounds = finished[index]);
    }

    fn bounds(&self) -> Aabb {
        self.bounds
    }

    fn triangle_index(&self) -> Option<&[[u32; 3]]> {
        match &self.data {
            ObjectData::Mesh(m) => Some(&m.triangles),
            _ => None,
        }
    }
}

impl Drop for AbcObject {
    // Unlink the subtree iteratively so deep chains do not exhaust the stack
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh(name: &str) -> AbcObject {
        let positions = Sampled::from_samples(vec![
            (0, vec![Vec3::ZERO, Vec3::X, Vec3::Y]),
            (100, vec![Vec3::ZERO, Vec3::X * 2.0, Vec3::Y * 2.0]),
        ])
        .unwrap();
        AbcObject::mesh(name, MeshData::new(positions, vec![[0, 1, 2]]).unwrap()).unwrap()
    }

    #[test]
    fn test_rejects_bad_names() {
        let xform = || ObjectData::Xform(XformData::identity());
        assert_eq!(AbcObject::new("", xform()).unwrap_err(), ObjectError::EmptyName);
        assert_eq!(
            AbcObject::new("a/b", xform()).unwrap_err(),
            ObjectError::InvalidName("a/b".to_string())
        );
    }

    #[test]
    fn test_rejects_out_of_range_triangle() {
        let positions = Sampled::from_samples(vec![
            (0, vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z]),
            (50, vec![Vec3::ZERO, Vec3::X, Vec3::Y]),
        ])
        .unwrap();
        let err = MeshData::new(positions, vec![[0, 1, 3]]).unwrap_err();
        assert_eq!(
            err,
            ObjectError::IndexOutOfRange {
                index: 3,
                vertex_count: 3,
                time_ms: 50
            }
        );
    }

    #[test]
    fn test_flat_indices() {
        let positions = Sampled::constant(vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z]);
        let mesh = MeshData::from_flat_indices(positions.clone(), &[0, 1, 2, 1, 3, 2]).unwrap();
        assert_eq!(mesh.triangles().to_vec(), vec![[0u32, 1, 2], [1, 3, 2]]);
        assert_eq!(mesh.triangle_count(), 2);

        let err = MeshData::from_flat_indices(positions, &[0, 1, 2, 1, 3, 2, 0]).unwrap_err();
        assert_eq!(err, ObjectError::PartialTriangle { index_count: 7 });
    }

    #[test]
    fn test_curve_counts_must_match_points() {
        let positions = Sampled::constant(vec![Vec3::ZERO; 5]);
        assert!(CurveData::new(positions.clone(), vec![2, 3]).is_ok());
        assert_eq!(
            CurveData::new(positions, vec![2, 2]).unwrap_err(),
            ObjectError::CurveCountMismatch {
                expected: 4,
                actual: 5,
                time_ms: 0
            }
        );
    }

    #[test]
    fn test_nurbs_grid_must_match_points() {
        let points = Sampled::constant(vec![Vec3::ZERO; 6]);
        assert!(NurbsPatchData::new(points.clone(), 2, 3).is_ok());
        assert!(matches!(
            NurbsPatchData::new(points, 3, 3),
            Err(ObjectError::ControlGridMismatch { actual: 6, .. })
        ));
    }

    #[test]
    fn test_camera_clip_range() {
        let bad = CameraLens {
            near_clip: 10.0,
            far_clip: 1.0,
            ..Default::default()
        };
        assert!(CameraData::new(Sampled::constant(bad)).is_err());

        let unordered = CameraLens {
            near_clip: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            CameraData::new(Sampled::constant(unordered)),
            Err(ObjectError::InvalidClipRange { .. })
        ));

        let lens = CameraLens {
            focal_length: 18.0,
            horizontal_aperture: 36.0,
            ..Default::default()
        };
        // 36mm aperture at 18mm focal length is a 90 degree lens
        assert!((lens.horizontal_fov() - std::f32::consts::FRAC_PI_2).abs() < 0.001);
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let root = AbcObject::xform("root", XformData::identity())
            .unwrap()
            .with_child(triangle_mesh("body"))
            .unwrap();
        let err = root.with_child(triangle_mesh("body")).unwrap_err();
        assert_eq!(err, ObjectError::DuplicateChild("body".to_string()));
    }

    #[test]
    fn test_init_folds_child_time_ranges_and_paths() {
        let grp = AbcObject::xform("grp", XformData::identity())
            .unwrap()
            .with_child(triangle_mesh("hat"))
            .unwrap();
        let mut root = AbcObject::xform("root", XformData::identity())
            .unwrap()
            .with_child(grp)
            .unwrap();

        // Static root on its own
        assert_eq!(root.time_range(), TimeRange::EMPTY);

        assert!(root.init(true, None));
        assert_eq!(root.time_range(), TimeRange::new(0.0, 100.0));
        assert_eq!(root.path(), "");
        assert_eq!(root.children()[0].path(), "/grp");
        assert_eq!(root.children()[0].children()[0].path(), "/grp/hat");
        assert_eq!(root.subtree_len(), 3);
    }

    #[test]
    fn test_set_current_time_cascades() {
        let mut root = AbcObject::xform("root", XformData::identity())
            .unwrap()
            .with_child(triangle_mesh("body"))
            .unwrap();

        root.set_current_time(100, false);
        assert_eq!(root.children()[0].current_time_ms(), 0);

        root.set_current_time(100, true);
        let body = &root.children()[0];
        assert_eq!(body.current_time_ms(), 100);
        assert_eq!(body.positions().unwrap()[1], Vec3::X * 2.0);
    }

    #[test]
    fn test_update_box_applies_xform() {
        let offset = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let mut root = AbcObject::xform("root", XformData::new(Sampled::constant(offset)))
            .unwrap()
            .with_child(triangle_mesh("body"))
            .unwrap();
        root.init(true, None);

        root.set_current_time(0, true);
        root.update_box(true);
        let bounds = root.bounds();
        assert_eq!(bounds.x.min, 10.0);
        assert_eq!(bounds.x.max, 11.0);

        root.set_current_time(100, true);
        root.update_box(true);
        assert_eq!(root.bounds().x.max, 12.0);
        assert_eq!(root.children()[0].bounds().y.max, 2.0);
    }

    #[test]
    fn test_camera_has_no_geometry_bounds() {
        let mut camera = AbcObject::camera(
            "cam",
            CameraData::new(Sampled::constant(CameraLens::default())).unwrap(),
        )
        .unwrap();
        camera.update_box(true);

        assert!(camera.bounds().is_empty());
        assert_eq!(camera.camera_lens(), Some(&CameraLens::default()));
        assert!(camera.triangle_index().is_none());
    }
}
