//! Perspective camera, its GPU uniform and the orbit control.
//!
//! The camera is a plain value stored inside the scene graph. The orbit
//! control never owns it: it mutates the camera it is handed when input
//! arrives, and does nothing at all while disabled.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::config::OrbitSettings;

// wgpu's clip space has z in [0, 1], cgmath produces OpenGL's [-1, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A perspective projection together with a look-at pose.
#[derive(Clone, Debug, PartialEq)]
pub struct Perspective {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view.
    pub fovy: cgmath::Deg<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Perspective {
    pub fn new<F: Into<cgmath::Deg<f32>>>(fovy: F, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 1.0),
            target: Point3::origin(),
            up: Vector3::unit_y(),
            fovy: fovy.into(),
            aspect,
            znear,
            zfar,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Point3::new(x, y, z);
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Recompute the aspect ratio from a surface size. Zero sized surfaces
    /// (minimized windows) keep the previous ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).magnitude()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Perspective) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = camera.view_projection().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

/// Rotates the camera around its target on left-drag, pans on right-drag and
/// zooms on scroll.
///
/// The polar angle is measured from the up axis, so `0` looks straight down
/// and `pi` straight up.
#[derive(Clone, Debug)]
pub struct OrbitControl {
    pub enabled: bool,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: Rad<f32>,
    pub max_polar_angle: Rad<f32>,
    /// Radians per pixel of cursor movement.
    pub rotate_speed: f32,
    /// Fraction of the distance per scroll line.
    pub zoom_speed: f32,
    pub pan_speed: f32,
    drag: Drag,
    cursor: Option<(f64, f64)>,
}

impl OrbitControl {
    pub fn new() -> Self {
        Self {
            enabled: true,
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            min_distance: 0.01,
            max_distance: f32::INFINITY,
            min_polar_angle: Rad(0.0),
            max_polar_angle: Rad(std::f32::consts::PI),
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.002,
            drag: Drag::None,
            cursor: None,
        }
    }

    pub fn from_settings(settings: &OrbitSettings) -> Self {
        Self {
            enabled: settings.enabled,
            enable_pan: settings.enable_pan,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
            max_polar_angle: settings.max_polar_angle,
            ..Self::new()
        }
    }

    /// Feed a window event to the control. Returns `true` when the camera
    /// was moved.
    pub fn handle_window_event(&mut self, event: &WindowEvent, camera: &mut Perspective) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.on_mouse_button(*button, *state == ElementState::Pressed);
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(position.x, position.y, camera)
            }
            WindowEvent::CursorLeft { .. } => {
                self.drag = Drag::None;
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.on_scroll(lines, camera)
            }
            _ => false,
        }
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if !self.enabled {
            return;
        }
        self.drag = match (button, pressed) {
            (MouseButton::Left, true) if self.enable_rotate => Drag::Rotate,
            (MouseButton::Right | MouseButton::Middle, true) if self.enable_pan => Drag::Pan,
            (_, false) => Drag::None,
            _ => self.drag,
        };
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64, camera: &mut Perspective) -> bool {
        let last = self.cursor.replace((x, y));
        if !self.enabled {
            return false;
        }
        let Some((last_x, last_y)) = last else {
            return false;
        };
        let (dx, dy) = ((x - last_x) as f32, (y - last_y) as f32);
        match self.drag {
            Drag::Rotate => {
                self.rotate(camera, -dx * self.rotate_speed, -dy * self.rotate_speed);
                true
            }
            Drag::Pan => {
                self.pan(camera, dx, dy);
                true
            }
            Drag::None => false,
        }
    }

    pub fn on_scroll(&mut self, lines: f32, camera: &mut Perspective) -> bool {
        if !self.enabled || !self.enable_zoom || lines == 0.0 {
            return false;
        }
        // scrolling up moves closer
        self.zoom(camera, (1.0 - self.zoom_speed).powf(lines));
        true
    }

    /// Rotate around the target by `azimuth` (around the up axis) and
    /// `polar` (towards/away from the up axis), keeping the distance.
    pub fn rotate(&self, camera: &mut Perspective, azimuth: f32, polar: f32) {
        let offset = camera.position - camera.target;
        let radius = offset.magnitude();
        if radius == 0.0 {
            return;
        }
        let theta = offset.x.atan2(offset.z) + azimuth;
        let phi = (offset.y / radius).clamp(-1.0, 1.0).acos() + polar;
        // keep away from the poles, look_at degenerates there
        let eps = 1e-4;
        let phi = clamp_between(phi, self.min_polar_angle.0, self.max_polar_angle.0)
            .clamp(eps, std::f32::consts::PI - eps);
        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = camera.target + offset;
    }

    /// Scale the distance to the target by `scale`, clamped to the limits.
    pub fn zoom(&self, camera: &mut Perspective, scale: f32) {
        let offset = camera.position - camera.target;
        let radius = offset.magnitude();
        if radius == 0.0 {
            return;
        }
        let new_radius = clamp_between(radius * scale, self.min_distance, self.max_distance);
        camera.position = camera.target + offset.normalize_to(new_radius);
    }

    /// Move position and target together in the view plane.
    pub fn pan(&self, camera: &mut Perspective, dx: f32, dy: f32) {
        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);
        let scale = camera.distance() * self.pan_speed;
        let delta = (-right * dx + up * dy) * scale;
        camera.position += delta;
        camera.target += delta;
    }
}

// Limits may come in either order; a NaN limit is ignored.
fn clamp_between(value: f32, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    value.max(lo).min(hi)
}

impl Default for OrbitControl {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: the uniform buffer and its bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device) -> Self {
        use wgpu::util::DeviceExt;

        let uniform = CameraUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Upload the camera matrices if they changed since the last upload.
    pub fn write(&mut self, queue: &wgpu::Queue, camera: &Perspective) {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }
}
