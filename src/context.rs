use std::sync::Arc;

use winit::window::Window;

use crate::{
    data_structures::texture,
    error::{EngineError, Result},
};

/// Pixel rectangle the scene is rendered into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Clip the rectangle to a `width` x `height` target. Returns `None`
    /// when nothing of it is left.
    pub fn clamped(&self, width: u32, height: u32) -> Option<Viewport> {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let w = self.width.min(width - x);
        let h = self.height.min(height - y);
        (w > 0 && h > 0).then_some(Viewport {
            x,
            y,
            width: w,
            height: h,
        })
    }
}

/// GPU state bound to one window: surface, device, queue and the per-frame
/// settings (clear colour, viewport, error checking).
#[derive(Debug)]
pub struct GraphicsContext {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    clear_colour: wgpu::Color,
    viewport: Viewport,
    check_errors: bool,
    // bumped whenever a previously presented frame becomes stale
    generation: u64,
    runtime: tokio::runtime::Runtime,
}

impl GraphicsContext {
    /// Create the context, driving the async adapter and device requests to
    /// completion on a current-thread runtime that the context keeps for
    /// later error scope queries.
    pub fn create(window: Arc<Window>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| EngineError::GraphicsContext(format!("async runtime: {}", e)))?;
        let parts = runtime.block_on(Self::request(window.clone()))?;
        let (surface, device, queue, config) = parts;
        let depth_texture =
            texture::Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");
        let viewport = Viewport {
            x: 0,
            y: 0,
            width: config.width,
            height: config.height,
        };
        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            clear_colour: wgpu::Color::BLACK,
            viewport,
            check_errors: true,
            generation: 0,
            runtime,
        })
    }

    async fn request(
        window: Arc<Window>,
    ) -> Result<(wgpu::Surface<'static>, wgpu::Device, wgpu::Queue, wgpu::SurfaceConfiguration)> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::debug!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| EngineError::GraphicsContext(format!("surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| EngineError::GraphicsContext(format!("adapter: {}", e)))?;
        log::debug!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Cube Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .map_err(|e| EngineError::GraphicsContext(format!("device: {}", e)))?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface, anything else renders too dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                EngineError::GraphicsContext("surface is incompatible with the adapter".into())
            })?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok((surface, device, queue, config))
    }

    pub fn set_clear_colour(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.clear_colour = wgpu::Color { r, g, b, a };
        self.generation += 1;
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        self.clear_colour
    }

    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = Viewport {
            x,
            y,
            width,
            height,
        };
        self.generation += 1;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// With checking enabled every frame is submitted inside a validation
    /// error scope and a captured error fails the frame.
    pub fn set_check_errors(&mut self, check: bool) {
        self.check_errors = check;
    }

    pub fn check_errors(&self) -> bool {
        self.check_errors
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request_redraw(&mut self) {
        self.generation += 1;
    }

    /// Reconfigure the surface and depth buffer. Zero sizes (minimized
    /// windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        self.generation += 1;
    }

    /// Acquire the next surface texture. A lost or outdated surface is
    /// reconfigured and yields `None`, as does a timeout.
    pub fn acquire_frame(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window.inner_size();
                log::debug!("surface lost, reconfiguring to {}x{}", size.width, size.height);
                self.resize(size.width, size.height);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out acquiring the next frame");
                Ok(None)
            }
            Err(e) => Err(EngineError::Surface(e)),
        }
    }

    /// Run `f` inside a validation error scope and report what it captured.
    pub fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        let error = self.runtime.block_on(self.device.pop_error_scope());
        (value, error)
    }
}
