//! Default shader set: the mesh pipeline for scene geometry and the flat
//! pipeline for the GUI overlay, plus the ambient light uniform they share.

pub mod basic;
pub mod gui;
pub mod light;

/// Pipelines created by [`crate::render::Renderer::add_default_shaders`].
#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub gui: wgpu::RenderPipeline,
}
