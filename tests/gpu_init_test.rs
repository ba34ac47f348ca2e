#[cfg(feature = "integration-tests")]
use flow_cube::{Config, flow};

#[test]
#[cfg(feature = "integration-tests")]
fn should_init_and_skip_unchanged_frames() {
    let config = Config::default();
    let mut app = flow::init(&config).expect("init failed");
    let mut scene = flow::build_scene(&config);
    let camera = scene.camera().cloned().expect("scene has a camera");

    assert!(app.renderer.gui().is_some());
    assert!(!app.renderer.context().check_errors());

    // the first acquire may only reconfigure the surface
    let first = (0..3).find_map(|_| app.renderer.render(&scene, &camera).unwrap());
    let frame = first.expect("no frame drawn");
    app.window.swap_buffers(frame);

    assert!(app.renderer.render(&scene, &camera).unwrap().is_none());

    scene.camera_mut().unwrap().set_position(0.0, 5.0, 5.0);
    let camera = scene.camera().cloned().unwrap();
    if let Some(frame) = app.renderer.render(&scene, &camera).unwrap() {
        app.window.swap_buffers(frame);
    }
}
