//! Error taxonomy of the engine.
//!
//! Every variant is fatal for the application: nothing here is retried or
//! downgraded to a warning. Binaries wrap these into `anyhow` errors at the
//! outermost layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The platform event loop (window manager) could not be acquired.
    #[error("window manager unavailable: {0}")]
    WindowManager(String),

    #[error("failed to create window: {0}")]
    WindowCreation(String),

    /// Instance, surface, adapter or device creation failed.
    #[error("failed to create graphics context: {0}")]
    GraphicsContext(String),

    #[error("failed to load default shaders: {0}")]
    ShaderLoad(String),

    #[error("render called before the default shaders were loaded")]
    ShadersNotLoaded,

    #[error("scene graph contains no camera reachable from the root")]
    MissingCamera,

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("render failed: {0}")]
    Render(String),
}
