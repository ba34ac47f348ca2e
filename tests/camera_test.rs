use cgmath::{Deg, Point3, Rad};
use flow_cube::{
    Config,
    camera::{CameraUniform, OrbitControl, Perspective},
    config::OrbitSettings,
};
use winit::event::MouseButton;

use crate::common::test_utils::assert_close;

mod common;

fn camera() -> Perspective {
    let mut camera = Perspective::new(Deg(65.0), 1200.0 / 900.0, 0.01, 1000.0);
    camera.set_position(0.0, 4.0, 5.0);
    camera.look_at(Point3::new(0.0, 0.0, 0.0));
    camera
}

fn polar_angle(camera: &Perspective) -> f32 {
    let offset = camera.position - camera.target;
    (offset.y / camera.distance()).acos()
}

fn enabled_control() -> OrbitControl {
    OrbitControl::from_settings(&OrbitSettings {
        enabled: true,
        ..OrbitSettings::default()
    })
}

#[test]
fn resize_updates_aspect_and_ignores_zero_sizes() {
    let mut camera = camera();

    camera.resize(1920, 1080);
    assert_close(camera.aspect, 1920.0 / 1080.0);

    camera.resize(0, 1080);
    assert_close(camera.aspect, 1920.0 / 1080.0);
}

#[test]
fn uniform_tracks_the_camera() {
    let mut camera = camera();
    let mut before = CameraUniform::new();
    before.update_view_proj(&camera);

    camera.set_position(1.0, 4.0, 5.0);
    let mut after = CameraUniform::new();
    after.update_view_proj(&camera);

    assert_ne!(before, after);
    assert_ne!(before, CameraUniform::default());
}

#[test]
fn zoom_is_clamped_to_the_distance_limits() {
    let control = enabled_control();
    let mut camera = camera();

    control.zoom(&mut camera, 0.01);
    assert_close(camera.distance(), 5.0);

    control.zoom(&mut camera, 100.0);
    assert_close(camera.distance(), 15.0);
}

#[test]
fn rotation_is_clamped_to_the_polar_limits() {
    let mut control = enabled_control();
    control.min_polar_angle = Rad(0.5);
    let mut camera = camera();
    let distance = camera.distance();

    control.rotate(&mut camera, 0.0, 10.0);
    assert_close(polar_angle(&camera), 2.0 * std::f32::consts::PI / 3.0);

    control.rotate(&mut camera, 0.0, -10.0);
    assert_close(polar_angle(&camera), 0.5);

    assert_close(camera.distance(), distance);
}

#[test]
fn dragging_rotates_around_the_target() {
    let mut control = enabled_control();
    let mut camera = camera();
    let distance = camera.distance();

    control.on_mouse_button(MouseButton::Left, true);
    assert!(!control.on_cursor_moved(100.0, 100.0, &mut camera));
    assert!(control.on_cursor_moved(140.0, 100.0, &mut camera));

    assert_ne!(camera.position, Point3::new(0.0, 4.0, 5.0));
    assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
    assert_close(camera.distance(), distance);
}

#[test]
fn pan_is_disabled_by_default() {
    let mut control = enabled_control();
    let mut camera = camera();

    control.on_mouse_button(MouseButton::Right, true);
    control.on_cursor_moved(0.0, 0.0, &mut camera);
    assert!(!control.on_cursor_moved(50.0, 50.0, &mut camera));

    assert_eq!(camera, self::camera());
}

#[test]
fn disabled_control_never_moves_the_camera() {
    let mut control = OrbitControl::from_settings(&Config::default().orbit);
    let mut camera = camera();

    control.on_mouse_button(MouseButton::Left, true);
    control.on_cursor_moved(0.0, 0.0, &mut camera);
    assert!(!control.on_cursor_moved(300.0, 200.0, &mut camera));
    assert!(!control.on_scroll(3.0, &mut camera));

    assert_eq!(camera, self::camera());
}

#[test]
fn scrolling_up_moves_closer() {
    let mut control = enabled_control();
    let mut camera = camera();
    let distance = camera.distance();

    assert!(control.on_scroll(1.0, &mut camera));

    assert!(camera.distance() < distance);
    assert!(camera.distance() >= 5.0);
}

#[test]
fn swapped_or_nan_limits_do_not_panic() {
    let mut control = enabled_control();
    control.min_distance = 20.0;
    control.max_distance = 5.0;
    control.min_polar_angle = Rad(2.0);
    control.max_polar_angle = Rad(1.0);
    let mut camera = camera();

    control.zoom(&mut camera, 100.0);
    assert_close(camera.distance(), 20.0);
    control.zoom(&mut camera, 0.01);
    assert_close(camera.distance(), 5.0);

    control.rotate(&mut camera, 0.0, 10.0);
    assert_close(polar_angle(&camera), 2.0);

    control.min_distance = f32::NAN;
    control.max_polar_angle = Rad(f32::NAN);
    control.zoom(&mut camera, 0.5);
    control.rotate(&mut camera, 0.3, -0.2);
    assert!(camera.distance().is_finite());
    assert!(camera.position.x.is_finite());
}
