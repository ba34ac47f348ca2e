//! GUI overlay: a root panel sized to the window, flat coloured child panels
//! and the cooperative timers ticked once per frame.
//!
//! Panels are laid out in window pixels with the origin in the top left
//! corner and composited after the 3D pass.

pub mod timer;

use crate::pipelines::gui::GuiVertex;

pub use timer::{TimerId, TimerManager};

#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub name: String,
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
    pub visible: bool,
}

impl Panel {
    pub fn new(name: impl Into<String>, position: [f32; 2], size: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            position,
            size,
            color,
            visible: true,
        }
    }
}

/// Top-level container of the overlay.
#[derive(Debug)]
pub struct Root {
    width: f32,
    height: f32,
    panels: Vec<Panel>,
    pub timers: TimerManager,
    revision: u64,
}

impl Root {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            panels: Vec::new(),
            timers: TimerManager::new(),
            revision: 0,
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.revision += 1;
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn add(&mut self, panel: Panel) -> &mut Panel {
        self.revision += 1;
        self.panels.push(panel);
        let last = self.panels.len() - 1;
        &mut self.panels[last]
    }

    pub fn remove(&mut self, name: &str) -> Option<Panel> {
        let idx = self.panels.iter().position(|p| p.name == name)?;
        self.revision += 1;
        Some(self.panels.remove(idx))
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel_mut(&mut self, name: &str) -> Option<&mut Panel> {
        self.revision += 1;
        self.panels.iter_mut().find(|p| p.name == name)
    }

    /// Changes whenever the overlay may look different.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn process_timers(&mut self) -> usize {
        self.timers.process_timers()
    }

    /// Two triangles per visible panel, in normalized device coordinates.
    /// Panels are clipped to the root; a zero sized root produces nothing.
    pub fn quads(&self) -> (Vec<GuiVertex>, Vec<u32>) {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        if self.width <= 0.0 || self.height <= 0.0 {
            return (vertices, indices);
        }
        for panel in self.panels.iter().filter(|p| p.visible) {
            let x0 = panel.position[0].clamp(0.0, self.width);
            let y0 = panel.position[1].clamp(0.0, self.height);
            let x1 = (panel.position[0] + panel.size[0]).clamp(0.0, self.width);
            let y1 = (panel.position[1] + panel.size[1]).clamp(0.0, self.height);
            if x1 <= x0 || y1 <= y0 {
                continue;
            }
            let to_ndc = |x: f32, y: f32| {
                [
                    x / self.width * 2.0 - 1.0,
                    1.0 - y / self.height * 2.0,
                ]
            };
            let base = vertices.len() as u32;
            // counter-clockwise on screen: bottom left, bottom right, top right, top left
            for (x, y) in [(x0, y1), (x1, y1), (x1, y0), (x0, y0)] {
                vertices.push(GuiVertex {
                    position: to_ndc(x, y),
                    color: panel.color,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        (vertices, indices)
    }
}
