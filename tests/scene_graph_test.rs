use std::sync::Arc;

use flow_cube::{
    Config,
    camera::Perspective,
    data_structures::{
        instance::Transform,
        model::Geometry,
        scene_graph::{Node, NodeKind, Scene},
    },
    flow::build_scene,
    pipelines::light::{AmbientLight, LightUniform},
};

use crate::common::test_utils::assert_close;

mod common;

fn cube() -> Arc<Geometry> {
    Arc::new(Geometry::cube(1.0, [1.0, 1.0, 1.0, 1.0]))
}

#[test]
fn application_scene_layout() {
    let scene = build_scene(&Config::default());
    let names: Vec<&str> = scene.root().children().iter().map(|n| n.name.as_str()).collect();

    assert_eq!(names, ["camera", "level", "ambient"]);
    assert!(matches!(scene.root().find("camera").unwrap().kind(), NodeKind::Camera(_)));
    assert_eq!(scene.ambient_lights(), vec![AmbientLight::default()]);

    let camera = scene.camera().unwrap();
    assert_close(camera.aspect, 1200.0 / 900.0);
    assert_eq!(camera.znear, 0.01);
    assert_eq!(camera.zfar, 1000.0);
}

#[test]
fn revision_changes_on_mutable_access_only() {
    let mut scene = build_scene(&Config::default());
    let start = scene.revision();

    let _ = scene.camera();
    let _ = scene.draw_list();
    assert_eq!(scene.revision(), start);

    scene.camera_mut().unwrap().set_position(1.0, 2.0, 3.0);
    assert_eq!(scene.revision(), start + 1);

    scene.add(Node::new("extra"));
    assert_eq!(scene.revision(), start + 2);
}

#[test]
fn first_camera_wins_depth_first() {
    let nested = Node::new("group").with_child(Node::camera(
        "inner",
        Perspective::new(cgmath::Deg(30.0), 1.0, 0.1, 10.0),
    ));
    let mut scene = Scene::new(Node::new("root"));
    scene.add(nested);
    scene.add(Node::camera(
        "outer",
        Perspective::new(cgmath::Deg(90.0), 1.0, 0.1, 10.0),
    ));

    assert_eq!(scene.camera().unwrap().fovy, cgmath::Deg(30.0));
}

#[test]
fn ambient_lights_are_summed() {
    let mut scene = Scene::new(Node::new("root"));
    scene.add(Node::ambient_light("white", AmbientLight::new([1.0, 1.0, 1.0], 0.4)));
    scene.add(Node::ambient_light("red", AmbientLight::new([1.0, 0.0, 0.0], 0.5)));
    let mut hidden = Node::ambient_light("hidden", AmbientLight::new([0.0, 0.0, 1.0], 1.0));
    hidden.visible = false;
    scene.add(hidden);

    let light = scene.draw_list().light;

    assert_close(light.ambient[0], 0.9);
    assert_close(light.ambient[1], 0.4);
    assert_close(light.ambient[2], 0.4);
    assert_eq!(LightUniform::from_ambients(&Vec::<AmbientLight>::new()).ambient, [0.0; 3]);
}

#[test]
fn meshes_are_batched_by_geometry_with_world_transforms() {
    let other = cube();
    let cube = cube();
    let mut level = Node::new("level");
    level.transform = Transform::from_position(0.0, 1.0, 0.0);
    level.add(Node::mesh("a", cube.clone())).transform = Transform::from_position(2.0, 0.0, 0.0);
    level.add(Node::mesh("b", cube.clone()));
    level.add(Node::mesh("c", other.clone()));
    let mut scene = Scene::new(Node::new("root"));
    scene.add(level);

    let draw_list = scene.draw_list();

    assert_eq!(draw_list.meshes.len(), 2);
    assert_eq!(draw_list.instance_count(), 3);
    let (geometry, transforms) = &draw_list.meshes[0];
    assert_eq!(geometry.id(), cube.id());
    assert_eq!(transforms[0].position, cgmath::Vector3::new(2.0, 1.0, 0.0));
    assert_eq!(transforms[1].position, cgmath::Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(draw_list.meshes[1].0.id(), other.id());
}

#[test]
fn invisible_subtrees_are_skipped() {
    let mut level = Node::new("level").with_child(Node::mesh("cube", cube()));
    level.visible = false;
    let mut scene = Scene::new(Node::new("root"));
    scene.add(level);

    assert_eq!(scene.draw_list().instance_count(), 0);
    assert_eq!(scene.root().count(), 3);
}

#[test]
fn cube_geometry_has_six_faces() {
    let cube = Geometry::cube(2.0, [0.5, 0.5, 0.5, 1.0]);

    assert_eq!(cube.vertices.len(), 24);
    assert_eq!(cube.indices.len(), 36);
    assert!(cube.vertices.iter().all(|v| v.position.iter().all(|c| c.abs() == 1.0)));
}

#[test]
fn edited_clone_is_batched_separately() {
    let red = Arc::new(Geometry::cube(1.0, [1.0, 0.0, 0.0, 1.0]));
    let mut blue = (*red).clone();
    for v in &mut blue.vertices {
        v.color = [0.0, 0.0, 1.0, 1.0];
        v.position = v.position.map(|c| c * 4.0);
    }
    let blue = Arc::new(blue);
    let mut shared = red.clone();
    Arc::make_mut(&mut shared).vertices.truncate(4);

    let mut scene = Scene::new(Node::new("root"));
    scene.add(Node::mesh("red", red.clone()));
    scene.add(Node::mesh("blue", blue.clone()));
    scene.add(Node::mesh("shared", shared.clone()));

    let draw_list = scene.draw_list();

    assert_ne!(red.id(), blue.id());
    assert_ne!(red.id(), shared.id());
    assert_eq!(draw_list.meshes.len(), 3);
    assert_eq!(draw_list.instance_count(), 3);
}
