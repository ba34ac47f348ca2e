//! Flow control and the application render loop.
//!
//! The loop is a plain `while` on the main thread: every iteration ticks the
//! GUI timers, renders the scene through its camera, polls the OS for events
//! and presents the frame if one was drawn. Polled events are dispatched
//! between iterations.
//!
//! # User-facing types
//!
//! - [`FrameRenderer`] and [`FrameSurface`] split the loop from the GPU so the
//!   frame policy can be driven by anything that draws and presents frames
//! - [`RenderLoop`] owns the scene and the orbit control and runs the loop
//! - [`ShutdownSignal`] stops the loop before its next iteration
//!
//! # Lifecycle Flow
//!
//! 1. [`init`] creates the window, graphics context, GUI root and renderer
//! 2. [`build_scene`] builds camera, level and ambient light
//! 3. [`RenderLoop::run`] calls [`render_frame`] until shutdown or error

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Context as _;
use winit::event::WindowEvent;

use crate::{
    camera::{OrbitControl, Perspective},
    config::Config,
    context::GraphicsContext,
    data_structures::{
        model::Geometry,
        scene_graph::{Node, Scene},
    },
    error::{EngineError, Result},
    gui::Root,
    render::Renderer,
    window::{Events, Window, WindowManager},
};

/// Anything that turns a scene into frames.
pub trait FrameRenderer {
    type Frame;

    /// Fire the GUI timers that are due.
    fn process_gui_timers(&mut self);

    /// Draw `scene` through `camera`. `None` means nothing was drawn.
    fn render(&mut self, scene: &Scene, camera: &Perspective) -> Result<Option<Self::Frame>>;

    /// The window's inner size changed.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw the next frame even if nothing changed.
    fn request_redraw(&mut self);
}

/// Anything that presents frames and collects OS events.
pub trait FrameSurface {
    type Frame;

    fn poll_events(&mut self) -> Events;

    fn swap_buffers(&mut self, frame: Self::Frame);
}

impl FrameRenderer for Renderer {
    type Frame = wgpu::SurfaceTexture;

    fn process_gui_timers(&mut self) {
        if let Some(gui) = self.gui_mut() {
            gui.process_timers();
        }
    }

    fn render(&mut self, scene: &Scene, camera: &Perspective) -> Result<Option<Self::Frame>> {
        Renderer::render(self, scene, camera)
    }

    fn resize(&mut self, width: u32, height: u32) {
        Renderer::resize(self, width, height)
    }

    fn request_redraw(&mut self) {
        self.context_mut().request_redraw();
    }
}

impl FrameSurface for Window {
    type Frame = wgpu::SurfaceTexture;

    fn poll_events(&mut self) -> Events {
        Window::poll_events(self)
    }

    fn swap_buffers(&mut self, frame: Self::Frame) {
        Window::swap_buffers(self, frame)
    }
}

/// Result of a single [`render_frame`] call.
#[derive(Debug, Default)]
pub struct FrameOutcome {
    /// A frame was drawn and presented.
    pub drawn: bool,
    pub events: Events,
}

/// Render one frame of `scene` with the GUI on top.
///
/// Timers are processed first, then the scene is rendered through its camera,
/// then events are polled and finally the frame is presented if one was
/// drawn. A render error is returned before events are polled.
pub fn render_frame<R, W>(renderer: &mut R, scene: &Scene, window: &mut W) -> Result<FrameOutcome>
where
    R: FrameRenderer,
    W: FrameSurface<Frame = R::Frame>,
{
    renderer.process_gui_timers();

    let camera = scene.camera().ok_or(EngineError::MissingCamera)?;
    let frame = renderer.render(scene, camera)?;

    let events = window.poll_events();

    let drawn = frame.is_some();
    if let Some(frame) = frame {
        window.swap_buffers(frame);
    }
    Ok(FrameOutcome { drawn, events })
}

/// Shared flag that ends a [`RenderLoop`].
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct RenderLoop {
    scene: Scene,
    orbit: OrbitControl,
    shutdown: ShutdownSignal,
    iterations: u64,
    frames_drawn: u64,
}

impl RenderLoop {
    pub fn new(scene: Scene, orbit: OrbitControl) -> Self {
        Self {
            scene,
            orbit,
            shutdown: ShutdownSignal::new(),
            iterations: 0,
            frames_drawn: 0,
        }
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitControl {
        &mut self.orbit
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Render frames until shutdown is requested. The first error ends the
    /// loop and is returned.
    pub fn run<R, W>(&mut self, renderer: &mut R, window: &mut W) -> Result<()>
    where
        R: FrameRenderer,
        W: FrameSurface<Frame = R::Frame>,
    {
        while !self.shutdown.is_triggered() {
            let outcome = render_frame(renderer, &self.scene, window)?;
            self.iterations += 1;
            if outcome.drawn {
                self.frames_drawn += 1;
            }
            self.dispatch(renderer, outcome.events);
        }
        log::info!(
            "render loop stopped after {} iterations ({} frames drawn)",
            self.iterations,
            self.frames_drawn
        );
        Ok(())
    }

    /// Apply polled events to the renderer, the scene and the orbit control.
    pub fn dispatch<R: FrameRenderer>(&mut self, renderer: &mut R, events: Events) {
        if events.exit_requested {
            log::debug!("platform requested exit");
            self.shutdown.trigger();
        }
        for event in events.window {
            match event {
                WindowEvent::CloseRequested => {
                    log::debug!("close requested");
                    self.shutdown.trigger();
                }
                WindowEvent::Resized(size) => {
                    renderer.resize(size.width, size.height);
                    if let Some(camera) = self.scene.camera_mut() {
                        camera.resize(size.width, size.height);
                    }
                }
                WindowEvent::RedrawRequested => renderer.request_redraw(),
                event => {
                    // move a copy so the scene revision only changes when the camera does
                    let Some(mut camera) = self.scene.camera().cloned() else {
                        continue;
                    };
                    if self.orbit.handle_window_event(&event, &mut camera) {
                        if let Some(target) = self.scene.camera_mut() {
                            *target = camera;
                        }
                    }
                }
            }
        }
    }
}

/// Everything [`init`] sets up before a scene exists.
#[derive(Debug)]
pub struct App {
    pub window: Window,
    pub renderer: Renderer,
}

/// Create the window, graphics context, GUI root and renderer.
pub fn init(config: &Config) -> Result<App> {
    let manager = WindowManager::new()?;
    let window = manager.create_window(config.width, config.height, &config.title, config.fullscreen)?;

    let mut ctx = GraphicsContext::create(window.handle())?;
    ctx.set_check_errors(config.check_errors);
    let colour = config.clear_colour;
    ctx.set_clear_colour(colour.r, colour.g, colour.b, colour.a);
    let (width, height) = window.size();
    ctx.set_viewport(0, 0, width, height);

    let gui = Root::new(width as f32, height as f32);

    let mut renderer = Renderer::new(ctx);
    renderer.add_default_shaders()?;
    renderer.set_gui(gui);
    log::debug!("initialized {}", config);

    Ok(App { window, renderer })
}

/// Root node holding the camera, the "level" node and the ambient light.
pub fn build_scene(config: &Config) -> Scene {
    let mut camera = Perspective::new(config.fovy, config.aspect(), config.znear, config.zfar);
    let position = config.camera_position;
    camera.set_position(position.x, position.y, position.z);
    camera.look_at(config.camera_target);

    let cube = Arc::new(Geometry::cube(1.0, [0.8, 0.3, 0.2, 1.0]));
    let level = Node::new("level").with_child(Node::mesh("cube", cube));

    let mut scene = Scene::new(Node::new("scene"));
    scene.add(Node::camera("camera", camera));
    scene.add(level);
    scene.add(Node::ambient_light("ambient", config.ambient));
    scene
}

/// Initialize everything and render until the window is closed.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let App {
        mut window,
        mut renderer,
    } = init(config).context("initialization failed")?;

    let scene = build_scene(config);
    let orbit = OrbitControl::from_settings(&config.orbit);
    let mut render_loop = RenderLoop::new(scene, orbit);

    render_loop
        .run(&mut renderer, &mut window)
        .context("render loop failed")?;
    Ok(())
}
