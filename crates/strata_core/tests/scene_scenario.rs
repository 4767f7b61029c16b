use strata_core::{
    AbcObject, CameraData, CameraLens, CurveData, MeshData, NodeKind, NurbsPatchData, PointData,
    Sampled, Scene, SceneNode, XformData,
};
use strata_math::{Mat4, Vec3};

/// A strip of `triangle_count` triangles whose points slide along +X over [0, 100]ms.
fn strip_mesh(name: &str, triangle_count: u32) -> AbcObject {
    let vertex_count = triangle_count as usize + 2;
    let at = |offset: f32| -> Vec<Vec3> {
        (0..vertex_count)
            .map(|i| Vec3::new(i as f32 * 0.5 + offset, (i % 2) as f32, 0.0))
            .collect()
    };
    let positions = Sampled::from_samples(vec![(0, at(0.0)), (50, at(5.0)), (100, at(10.0))])
        .unwrap();
    let triangles = (0..triangle_count).map(|i| [i, i + 1, i + 2]).collect();

    AbcObject::mesh(name, MeshData::new(positions, triangles).unwrap()).unwrap()
}

fn xform(name: &str) -> AbcObject {
    AbcObject::xform(name, XformData::identity()).unwrap()
}

/// root(Xform) -> [body(Mesh, 10 tris), grp(Xform) -> [hat(Mesh, 4 tris)]], range [0, 100]
fn build_scenario() -> Scene<AbcObject> {
    let grp = xform("grp").with_child(strip_mesh("hat", 4)).unwrap();
    let root = xform("root")
        .with_child(strip_mesh("body", 10))
        .unwrap()
        .with_child(grp)
        .unwrap();

    let mut scene = Scene::new(root);
    assert!(scene.init());
    scene
}

#[test]
fn test_scenario_listings() {
    let scene = build_scenario();

    assert_eq!(scene.min_time(), 0.0);
    assert_eq!(scene.max_time(), 100.0);
    assert_eq!(scene.mesh_path_list(), vec!["/body", "/grp/hat"]);
    assert_eq!(scene.xform_path_list(), vec!["/grp"]);
    assert_eq!(scene.total_polygon_size(), 14);
}

#[test]
fn test_object_name_list_is_shallow_on_purpose() {
    let scene = build_scenario();

    // Root name plus direct children only; "hat" is not part of this listing
    assert_eq!(scene.object_name_list(), vec!["root", "body", "grp"]);
}

#[test]
fn test_scenario_updates() {
    let mut scene = build_scenario();

    assert!(scene.update(50));
    let before: Vec<Vec3> = scene
        .find_object("/grp/hat")
        .and_then(|hat| hat.positions())
        .unwrap()
        .to_vec();

    assert!(!scene.update(150), "150ms lies past the end of the range");
    assert_eq!(scene.last_applied_time(), Some(50));

    let hat = scene.find_object("/grp/hat").unwrap();
    assert_eq!(hat.current_time_ms(), 50);
    assert_eq!(hat.positions().unwrap(), before.as_slice());
    assert_eq!(hat.positions().unwrap()[0].x, 5.0);
}

#[test]
fn test_scenario_lookup() {
    let scene = build_scenario();

    let hat = scene.find_object("/grp/hat").expect("hat should resolve");
    assert_eq!(hat.name(), "hat");
    assert_eq!(hat.kind(), NodeKind::Mesh);
    assert_eq!(hat.path(), "/grp/hat");
    assert_eq!(hat.triangle_index().map(|t| t.len()), Some(4));

    assert!(scene.find_object("/missing").is_none());
}

#[test]
fn test_init_restores_time_but_keeps_start_bounds() {
    let mut scene = build_scenario();
    assert!(scene.update(100));

    // Re-initializing computes bounds at 0ms and puts the tree back at 100ms
    assert!(scene.init());
    let body = scene.find_object("/body").unwrap();
    assert_eq!(body.current_time_ms(), 100);
    assert_eq!(body.bounds().x.min, 0.0);
    assert_eq!(scene.last_applied_time(), Some(100));
}

#[test]
fn test_host_driven_box_update() {
    let mut scene = build_scenario();
    assert!(scene.update(100));

    let root = scene.root_object_mut().unwrap();
    root.update_box(true);
    assert_eq!(scene.world_bounds().x.min, 10.0);
}

fn mixed_scene() -> Scene<AbcObject> {
    let cloud = AbcObject::point(
        "cloud",
        PointData::new(Sampled::constant(vec![Vec3::ZERO, Vec3::ONE])),
    )
    .unwrap();
    let hair = AbcObject::curve(
        "hair",
        CurveData::new(Sampled::constant(vec![Vec3::ZERO; 7]), vec![3, 4]).unwrap(),
    )
    .unwrap();
    let patch = AbcObject::nurbs_patch(
        "patch",
        NurbsPatchData::new(Sampled::constant(vec![Vec3::ZERO; 16]), 4, 4).unwrap(),
    )
    .unwrap();
    let lens = Sampled::from_samples(vec![
        (0, CameraLens::default()),
        (
            2000,
            CameraLens {
                focal_length: 50.0,
                ..Default::default()
            },
        ),
    ])
    .unwrap();
    let camera = AbcObject::camera("shotCam", CameraData::new(lens).unwrap()).unwrap();
    let dolly = Sampled::from_samples(vec![
        (0, Mat4::IDENTITY),
        (1000, Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0))),
    ])
    .unwrap();
    let rig = AbcObject::xform("rig", XformData::new(dolly))
        .unwrap()
        .with_child(camera)
        .unwrap();

    let fx = xform("fx")
        .with_child(cloud)
        .unwrap()
        .with_child(hair)
        .unwrap()
        .with_child(patch)
        .unwrap();
    let root = xform("world")
        .with_child(fx)
        .unwrap()
        .with_child(strip_mesh("ground", 2))
        .unwrap()
        .with_child(rig)
        .unwrap();

    let mut scene = Scene::new(root);
    scene.init();
    scene
}

#[test]
fn test_every_kind_is_listed_and_resolves() {
    let scene = mixed_scene();

    assert_eq!(scene.point_path_list(), vec!["/fx/cloud"]);
    assert_eq!(scene.curve_path_list(), vec!["/fx/hair"]);
    assert_eq!(scene.nurbs_path_list(), vec!["/fx/patch"]);
    assert_eq!(scene.camera_path_list(), vec!["/rig/shotCam"]);
    assert_eq!(scene.xform_path_list(), vec!["/fx", "/rig"]);
    assert_eq!(scene.mesh_path_list(), vec!["/ground"]);

    for kind in NodeKind::ALL {
        for path in scene.path_list(kind) {
            let node = scene.find_object(&path).unwrap();
            assert_eq!(node.kind(), kind, "{} should resolve to a {}", path, kind);
        }
    }
    assert_eq!(scene.object_path_list().len(), 7);
}

#[test]
fn test_time_range_is_union_of_subtree() {
    let mut scene = mixed_scene();

    // Camera lens animates to 2000ms, the dolly to 1000ms, the ground mesh to 100ms
    assert_eq!(scene.min_time(), 0.0);
    assert_eq!(scene.max_time(), 2000.0);

    assert!(scene.update(2000));
    let camera = scene.find_first_camera().unwrap();
    assert_eq!(camera.name(), "shotCam");
    assert_eq!(camera.camera_lens().unwrap().focal_length, 50.0);
}

#[test]
fn test_static_scene_is_constant() {
    let root = xform("root")
        .with_child(
            AbcObject::point("pts", PointData::new(Sampled::constant(vec![Vec3::ONE]))).unwrap(),
        )
        .unwrap();
    let mut scene = Scene::new(root);
    scene.init();

    assert!(scene.is_constant());
    assert!(scene.update(0));
    assert!(scene.update(99_999));
    assert_eq!(scene.last_applied_time(), None);

    // Bounds were still computed (at time 0)
    assert_eq!(scene.world_bounds().x.max, 1.0);
}

#[test]
fn test_deep_chain_lifecycle_on_small_stack() {
    // A recursive cascade needs far more than 256 KiB at this depth
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(|| {
            let depth = 5_000;
            let mut node = strip_mesh("leaf", 1);
            for _ in 0..depth {
                node = xform("x").with_child(node).unwrap();
            }
            let mut scene = Scene::new(node);

            assert!(scene.init());
            assert_eq!(scene.max_time(), 100.0);
            assert!(scene.update(50));
            assert_eq!(scene.total_polygon_size(), 1);

            let meshes = scene.mesh_path_list();
            assert_eq!(meshes.len(), 1);
            let leaf = scene.find_object(&meshes[0]).unwrap();
            assert_eq!(leaf.current_time_ms(), 50);

            scene.root_object_mut().unwrap().update_box(true);
            assert_eq!(scene.world_bounds().x.min, 5.0);

            assert!(scene.dispose());
            assert!(scene.is_disposed());
        })
        .unwrap();

    handle.join().unwrap();
}
