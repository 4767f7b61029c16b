//! Example: Build an animated scene in memory and step it through time.
//!
//! Run with: cargo run --example inspect_scene -- [step_ms]

use std::env;

use anyhow::{Context, Result};
use serde::Serialize;
use strata_core::{
    AbcObject, CameraData, CameraLens, MeshData, NodeKind, Sampled, Scene, SceneNode, XformData,
};
use strata_math::{Mat4, Vec3};

#[derive(Serialize)]
struct SceneSummary {
    min_time: f64,
    max_time: f64,
    objects: Vec<String>,
    meshes: Vec<String>,
    cameras: Vec<String>,
    total_triangles: usize,
}

/// A unit cube whose top face rises over one second.
fn cube(name: &str) -> Result<AbcObject> {
    let at = |height: f32| -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, height, 0.0),
            Vec3::new(1.0, height, 0.0),
            Vec3::new(1.0, height, 1.0),
            Vec3::new(0.0, height, 1.0),
        ]
    };
    let positions = Sampled::from_samples(vec![(0, at(1.0)), (500, at(1.5)), (1000, at(2.0))])?;
    let quads = [
        [0, 1, 2, 3],
        [4, 7, 6, 5],
        [0, 4, 5, 1],
        [1, 5, 6, 2],
        [2, 6, 7, 3],
        [3, 7, 4, 0],
    ];
    let indices: Vec<u32> = quads
        .iter()
        .flat_map(|q| [q[0], q[1], q[2], q[0], q[2], q[3]])
        .collect();

    Ok(AbcObject::mesh(
        name,
        MeshData::from_flat_indices(positions, &indices)?,
    )?)
}

fn build_scene() -> Result<Scene<AbcObject>> {
    let spin = Sampled::from_samples(
        (0..=4)
            .map(|i| {
                let t = i * 250;
                (t, Mat4::from_rotation_y(t as f32 / 1000.0 * std::f32::consts::TAU))
            })
            .collect(),
    )?;
    let turntable = AbcObject::xform("turntable", XformData::new(spin))?
        .with_child(cube("box_a")?)?
        .with_child(cube("box_b")?)?;

    let camera = AbcObject::camera(
        "renderCam",
        CameraData::new(Sampled::constant(CameraLens::default()))?,
    )?;
    let cam_xform = Mat4::from_translation(Vec3::new(0.0, 1.0, 6.0));
    let cam_rig = AbcObject::xform("cam_rig", XformData::new(Sampled::constant(cam_xform)))?
        .with_child(camera)?;

    let root = AbcObject::xform("scene", XformData::identity())?
        .with_child(turntable)?
        .with_child(cam_rig)?;

    Ok(Scene::new(root))
}

fn main() -> Result<()> {
    env_logger::init();

    let step: u64 = match env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid step '{}'", arg))?,
        None => 250,
    };

    let mut scene = build_scene()?;
    scene.init();

    let summary = SceneSummary {
        min_time: scene.min_time(),
        max_time: scene.max_time(),
        objects: scene.object_path_list(),
        meshes: scene.mesh_path_list(),
        cameras: scene.camera_path_list(),
        total_triangles: scene.total_polygon_size(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(camera) = scene.find_first_camera() {
        let lens = camera.camera_lens().copied().unwrap_or_default();
        println!(
            "\nCamera {}: {:.1}mm, {:.1} deg",
            camera.path(),
            lens.focal_length,
            lens.horizontal_fov().to_degrees()
        );
    }

    println!("\n--- Playback ---");
    let end = scene.max_time() as u64;
    for time in (0..=end + step).step_by(step.max(1) as usize) {
        if !scene.update(time) {
            println!("  {:>5}ms  rejected (outside time range)", time);
            continue;
        }

        if let Some(root) = scene.root_object_mut() {
            root.update_box(true);
        }
        let bounds = scene.world_bounds();
        println!(
            "  {:>5}ms  bounds ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
            time,
            bounds.x.min,
            bounds.y.min,
            bounds.z.min,
            bounds.x.max,
            bounds.y.max,
            bounds.z.max
        );
    }

    for path in scene.path_list(NodeKind::Mesh) {
        if let Some(mesh) = scene.find_object(&path) {
            println!(
                "\n{}: {} triangles, {} vertices at {}ms",
                path,
                mesh.triangle_index().map_or(0, |t| t.len()),
                mesh.positions().map_or(0, |p| p.len()),
                mesh.current_time_ms()
            );
        }
    }

    scene.dispose();
    Ok(())
}
