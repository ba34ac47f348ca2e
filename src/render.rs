//! The renderer: default shaders, scene traversal and GUI compositing.
//!
//! A [`Renderer`] is bound to one [`GraphicsContext`]. Besides the loaded
//! pipelines and the attached GUI root it only remembers what the last
//! presented frame looked like, so that an unchanged frame is neither drawn
//! nor presented again.
//!
//! # Key types
//!
//! - [`Instanced`] is one mesh drawn with a buffer of per-instance transforms
//! - [`Flat`] is 2D geometry in normalized device coordinates (the GUI)
//!

use std::{collections::HashMap, iter};

use wgpu::util::DeviceExt;

use crate::{
    camera::{CameraResources, CameraUniform, Perspective},
    context::GraphicsContext,
    data_structures::{
        instance::{InstanceRaw, Transform},
        model::Mesh,
        scene_graph::Scene,
    },
    error::{EngineError, Result},
    gui::Root,
    pipelines::{
        Pipelines, basic,
        gui,
        light::{LightResources, LightUniform},
    },
};

/// A mesh plus the buffer holding `amount` instance transforms.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a Mesh,
    pub amount: u32,
}

/// Indexed 2D geometry drawn once.
pub struct Flat {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub amount: u32,
}

/// Everything that decides what a frame looks like. Equal keys mean equal
/// frames.
#[derive(Clone, Debug, PartialEq)]
struct FrameKey {
    scene_revision: u64,
    camera: CameraUniform,
    gui_revision: Option<u64>,
    generation: u64,
}

pub struct Renderer {
    ctx: GraphicsContext,
    camera: CameraResources,
    light: LightResources,
    pipelines: Option<Pipelines>,
    gui: Option<Root>,
    meshes: HashMap<u64, Mesh>,
    last_frame: Option<FrameKey>,
}

impl Renderer {
    pub fn new(ctx: GraphicsContext) -> Self {
        let camera = CameraResources::new(&ctx.device);
        let light = LightResources::new(&ctx.device, LightUniform::default());
        Self {
            ctx,
            camera,
            light,
            pipelines: None,
            gui: None,
            meshes: HashMap::new(),
            last_frame: None,
        }
    }

    /// Compile the mesh and GUI shaders and build their pipelines.
    pub fn add_default_shaders(&mut self) -> Result<()> {
        let ctx = &self.ctx;
        let camera_layout = &self.camera.bind_group_layout;
        let light_layout = &self.light.bind_group_layout;
        let (pipelines, error) = ctx.scoped(|device| Pipelines {
            basic: basic::mk_basic_pipeline(device, &ctx.config, camera_layout, light_layout),
            gui: gui::mk_gui_pipeline(device, &ctx.config),
        });
        if let Some(e) = error {
            return Err(EngineError::ShaderLoad(e.to_string()));
        }
        log::debug!("default shaders loaded");
        self.pipelines = Some(pipelines);
        Ok(())
    }

    pub fn set_gui(&mut self, root: Root) {
        self.gui = Some(root);
    }

    pub fn gui(&self) -> Option<&Root> {
        self.gui.as_ref()
    }

    pub fn gui_mut(&mut self) -> Option<&mut Root> {
        self.gui.as_mut()
    }

    pub fn context(&self) -> &GraphicsContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GraphicsContext {
        &mut self.ctx
    }

    /// Follow a window resize: surface, viewport and GUI root.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.ctx.resize(width, height);
        self.ctx.set_viewport(0, 0, width, height);
        if let Some(gui) = &mut self.gui {
            gui.set_size(width as f32, height as f32);
        }
    }

    /// Render `scene` as seen by `camera` with the GUI on top.
    ///
    /// Returns the drawn frame, which still has to be presented, or `None`
    /// when the frame would be identical to the last one or the surface had
    /// to be reconfigured.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &Perspective,
    ) -> Result<Option<wgpu::SurfaceTexture>> {
        if self.pipelines.is_none() {
            return Err(EngineError::ShadersNotLoaded);
        }
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(camera);
        let key = FrameKey {
            scene_revision: scene.revision(),
            camera: camera_uniform,
            gui_revision: self.gui.as_ref().map(Root::revision),
            generation: self.ctx.generation(),
        };
        if self.last_frame.as_ref() == Some(&key) {
            return Ok(None);
        }

        let Some(frame) = self.ctx.acquire_frame()? else {
            return Ok(None);
        };
        // a reconfigure inside acquire_frame changes the generation
        let key = FrameKey {
            generation: self.ctx.generation(),
            ..key
        };

        let draw_list = scene.draw_list();
        log::trace!(
            "drawing {} instances of {} meshes",
            draw_list.instance_count(),
            draw_list.meshes.len()
        );
        self.meshes
            .retain(|id, _| draw_list.meshes.iter().any(|(g, _)| g.id() == *id));
        for (geometry, _) in &draw_list.meshes {
            self.meshes
                .entry(geometry.id())
                .or_insert_with(|| Mesh::upload(&self.ctx.device, geometry));
        }
        let instance_buffers: Vec<(u64, wgpu::Buffer, u32)> = draw_list
            .meshes
            .iter()
            .map(|(geometry, transforms)| {
                let raw: Vec<InstanceRaw> = transforms.iter().map(Transform::to_raw).collect();
                let buffer = self
                    .ctx
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Instance Buffer"),
                        contents: bytemuck::cast_slice(&raw),
                        usage: wgpu::BufferUsages::VERTEX,
                    });
                (geometry.id(), buffer, transforms.len() as u32)
            })
            .collect();
        let instanced: Vec<Instanced> = instance_buffers
            .iter()
            .filter_map(|(id, buffer, amount)| {
                Some(Instanced {
                    instance: buffer,
                    mesh: self.meshes.get(id)?,
                    amount: *amount,
                })
            })
            .collect();
        let overlay = self.gui.as_ref().and_then(|root| mk_flat(&self.ctx.device, root));

        self.camera.write(&self.ctx.queue, camera);
        self.light.write(&self.ctx.queue, draw_list.light);

        let (width, height) = self.ctx.size();
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipelines) = &self.pipelines {
                match self.ctx.viewport().clamped(width, height) {
                    Some(vp) => render_pass.set_viewport(
                        vp.x as f32,
                        vp.y as f32,
                        vp.width as f32,
                        vp.height as f32,
                        0.0,
                        1.0,
                    ),
                    None => log::warn!("viewport lies outside of the {}x{} surface", width, height),
                }
                render_pass.set_pipeline(&pipelines.basic);
                render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
                render_pass.set_bind_group(1, &self.light.bind_group, &[]);
                for item in &instanced {
                    render_pass.set_vertex_buffer(0, item.mesh.vertex_buffer.slice(..));
                    render_pass.set_vertex_buffer(1, item.instance.slice(..));
                    render_pass
                        .set_index_buffer(item.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..item.mesh.num_elements, 0, 0..item.amount);
                }

                if let Some(flat) = &overlay {
                    // the overlay always covers the whole surface
                    render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
                    render_pass.set_pipeline(&pipelines.gui);
                    render_pass.set_vertex_buffer(0, flat.vertex.slice(..));
                    render_pass.set_index_buffer(flat.index.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..flat.amount, 0, 0..1);
                }
            }
        }

        let commands = encoder.finish();
        if self.ctx.check_errors() {
            let (_, error) = self
                .ctx
                .scoped(|_| self.ctx.queue.submit(iter::once(commands)));
            if let Some(e) = error {
                return Err(EngineError::Render(e.to_string()));
            }
        } else {
            self.ctx.queue.submit(iter::once(commands));
        }

        self.last_frame = Some(key);
        Ok(Some(frame))
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("shaders_loaded", &self.pipelines.is_some())
            .field("gui", &self.gui.is_some())
            .field("meshes", &self.meshes.len())
            .finish()
    }
}

fn mk_flat(device: &wgpu::Device, root: &Root) -> Option<Flat> {
    let (vertices, indices) = root.quads();
    if indices.is_empty() {
        return None;
    }
    let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("GUI Vertex Buffer"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("GUI Index Buffer"),
        contents: bytemuck::cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    Some(Flat {
        vertex,
        index,
        amount: indices.len() as u32,
    })
}
