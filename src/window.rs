//! Window manager and window built on a pump-driven winit event loop.
//!
//! Instead of handing control to `EventLoop::run_app`, the event loop is
//! pumped with a zero timeout once per frame, so the render loop keeps
//! ownership of the main thread and OS events are polled without blocking.

use std::sync::Arc;

use instant::Duration;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Fullscreen, WindowAttributes, WindowId},
};

use crate::error::{EngineError, Result};

// Pumps allowed for the platform to hand out the first window.
const CREATE_ATTEMPTS: usize = 100;

/// Events collected by one [`Window::poll_events`] call.
#[derive(Debug, Default)]
pub struct Events {
    pub window: Vec<WindowEvent>,
    /// The platform asked the application to exit.
    pub exit_requested: bool,
}

#[derive(Default)]
struct Handler {
    pending: Option<WindowAttributes>,
    window: Option<Arc<winit::window::Window>>,
    create_error: Option<String>,
    events: Vec<WindowEvent>,
}

impl Handler {
    fn create_pending(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attributes) = self.pending.take() {
            match event_loop.create_window(attributes) {
                Ok(window) => self.window = Some(Arc::new(window)),
                Err(e) => self.create_error = Some(e.to_string()),
            }
        }
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        self.create_pending(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.events.push(event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
    }
}

/// Handle on the platform's event loop, consumed by creating the window.
pub struct WindowManager {
    event_loop: EventLoop<()>,
    handler: Handler,
}

impl WindowManager {
    pub fn new() -> Result<Self> {
        #[cfg(all(feature = "integration-tests", target_os = "linux"))]
        let event_loop = {
            use winit::platform::wayland::EventLoopBuilderExtWayland;

            EventLoop::builder().with_any_thread(true).build()
        };

        #[cfg(all(feature = "integration-tests", target_os = "windows"))]
        let event_loop = {
            use winit::platform::windows::EventLoopBuilderExtWindows;

            EventLoop::builder().with_any_thread(true).build()
        };

        #[cfg(not(all(
            feature = "integration-tests",
            any(target_os = "linux", target_os = "windows")
        )))]
        let event_loop = EventLoop::new();

        let event_loop = event_loop.map_err(|e| EngineError::WindowManager(e.to_string()))?;
        Ok(Self {
            event_loop,
            handler: Handler::default(),
        })
    }

    pub fn create_window(
        mut self,
        width: u32,
        height: u32,
        title: &str,
        fullscreen: bool,
    ) -> Result<Window> {
        let mut attributes = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height));
        if fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        self.handler.pending = Some(attributes);

        for _ in 0..CREATE_ATTEMPTS {
            let status = self
                .event_loop
                .pump_app_events(Some(Duration::ZERO), &mut self.handler);
            if let Some(e) = self.handler.create_error.take() {
                return Err(EngineError::WindowCreation(e));
            }
            if let Some(window) = self.handler.window.clone() {
                log::debug!("created window {:?} ({}x{})", title, width, height);
                return Ok(Window {
                    event_loop: self.event_loop,
                    handler: self.handler,
                    window,
                });
            }
            if let PumpStatus::Exit(code) = status {
                return Err(EngineError::WindowCreation(format!(
                    "event loop exited with code {} before the window was created",
                    code
                )));
            }
        }
        Err(EngineError::WindowCreation(
            "the platform never resumed the application".into(),
        ))
    }
}

pub struct Window {
    event_loop: EventLoop<()>,
    handler: Handler,
    window: Arc<winit::window::Window>,
}

impl Window {
    /// Shared handle for surface creation.
    pub fn handle(&self) -> Arc<winit::window::Window> {
        self.window.clone()
    }

    pub fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    /// Drain pending OS events without blocking.
    pub fn poll_events(&mut self) -> Events {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);
        Events {
            window: std::mem::take(&mut self.handler.events),
            exit_requested: matches!(status, PumpStatus::Exit(_)),
        }
    }

    pub fn swap_buffers(&mut self, frame: wgpu::SurfaceTexture) {
        self.window.pre_present_notify();
        frame.present();
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window").field("window", &self.window.id()).finish()
    }
}
