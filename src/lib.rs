//! flow-cube
//!
//! A minimal application shell on top of `winit` and `wgpu`: one window, one
//! graphics context, a scene graph holding a perspective camera and an
//! ambient light, a GUI root and a render loop that only presents frames that
//! were actually drawn.
//!
//! High-level modules
//! - `camera`: perspective camera, its uniform and the orbit control
//! - `config`: compiled-in defaults and command line parsing
//! - `context`: GPU state bound to the window (surface, device, queue)
//! - `data_structures`: scene graph, transforms, geometry and textures
//! - `error`: the engine's error taxonomy
//! - `flow`: initialization and the render loop
//! - `gui`: root panel, overlay panels and timers
//! - `logging`: console logger setup
//! - `pipelines`: the default shader set
//! - `render`: turns a scene and the GUI into frames
//! - `window`: window manager and non-blocking event polling
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod gui;
pub mod logging;
pub mod pipelines;
pub mod render;
pub mod window;

// Re-exports commonly used types for convenience in downstream code.
pub use config::Config;
pub use error::{EngineError, Result};
pub use winit::event::WindowEvent;
