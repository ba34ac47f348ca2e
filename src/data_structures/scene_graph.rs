//! Scene graph: an ownership tree of nodes.
//!
//! Each [`Node`] exclusively owns its children, there is no sharing and no
//! way to form a cycle. A node is a plain group, a camera, an ambient light
//! or a mesh. The [`Scene`] wraps the root and counts mutable accesses so the
//! renderer can tell whether anything may have changed since the last frame.

use std::sync::Arc;

use crate::{
    camera::Perspective,
    data_structures::{instance::Transform, model::Geometry},
    pipelines::light::{AmbientLight, LightUniform},
};

#[derive(Clone, Debug)]
pub enum NodeKind {
    Group,
    /// The camera pose is expressed in world space, parent transforms do not
    /// apply to it.
    Camera(Perspective),
    AmbientLight(AmbientLight),
    Mesh(Arc<Geometry>),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    /// Invisible nodes are skipped together with their whole subtree.
    pub visible: bool,
    kind: NodeKind,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    pub fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            visible: true,
            kind,
            children: Vec::new(),
        }
    }

    pub fn camera(name: impl Into<String>, camera: Perspective) -> Self {
        Self::with_kind(name, NodeKind::Camera(camera))
    }

    pub fn ambient_light(name: impl Into<String>, light: AmbientLight) -> Self {
        Self::with_kind(name, NodeKind::AmbientLight(light))
    }

    pub fn mesh(name: impl Into<String>, geometry: Arc<Geometry>) -> Self {
        Self::with_kind(name, NodeKind::Mesh(geometry))
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Take ownership of `child` and return a handle to it for further setup.
    pub fn add(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        let idx = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(idx))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    /// Depth-first search by name, including `self`.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    /// Number of nodes in this subtree, `self` included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Read-only pre-order traversal of the visible subtree. `f` receives
    /// each node together with its world transform.
    pub fn visit<F>(&self, parent: &Transform, f: &mut F)
    where
        F: FnMut(&Node, &Transform),
    {
        if !self.visible {
            return;
        }
        let world = parent * &self.transform;
        f(self, &world);
        for child in &self.children {
            child.visit(&world, f);
        }
    }
}

fn first_camera(node: &Node) -> Option<&Perspective> {
    match &node.kind {
        NodeKind::Camera(camera) => Some(camera),
        _ => node.children.iter().find_map(first_camera),
    }
}

fn first_camera_mut(node: &mut Node) -> Option<&mut Perspective> {
    match &mut node.kind {
        NodeKind::Camera(camera) => Some(camera),
        _ => node.children.iter_mut().find_map(first_camera_mut),
    }
}

/// Draw data gathered from one traversal.
#[derive(Debug, Default)]
pub struct DrawList {
    pub light: LightUniform,
    /// World transforms grouped by geometry, in first-seen order.
    pub meshes: Vec<(Arc<Geometry>, Vec<Transform>)>,
}

impl DrawList {
    pub fn instance_count(&self) -> usize {
        self.meshes.iter().map(|(_, instances)| instances.len()).sum()
    }
}

#[derive(Debug)]
pub struct Scene {
    root: Node,
    revision: u64,
}

impl Scene {
    pub fn new(root: Node) -> Self {
        Self { root, revision: 0 }
    }

    /// Incremented on every mutable access to the graph.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        self.revision += 1;
        &mut self.root
    }

    pub fn add(&mut self, child: Node) -> &mut Node {
        self.root_mut().add(child)
    }

    /// The first camera in depth-first order.
    pub fn camera(&self) -> Option<&Perspective> {
        first_camera(&self.root)
    }

    pub fn camera_mut(&mut self) -> Option<&mut Perspective> {
        self.revision += 1;
        first_camera_mut(&mut self.root)
    }

    /// Ambient lights of the visible graph.
    pub fn ambient_lights(&self) -> Vec<AmbientLight> {
        let mut lights = Vec::new();
        self.root.visit(&Transform::identity(), &mut |node, _| {
            if let NodeKind::AmbientLight(light) = &node.kind {
                lights.push(*light);
            }
        });
        lights
    }

    /// Traverse the visible graph once, summing ambient light and batching
    /// mesh instances by geometry.
    pub fn draw_list(&self) -> DrawList {
        let mut ambients: Vec<AmbientLight> = Vec::new();
        let mut meshes: Vec<(Arc<Geometry>, Vec<Transform>)> = Vec::new();
        self.root
            .visit(&Transform::identity(), &mut |node, world| match &node.kind {
                NodeKind::AmbientLight(light) => ambients.push(*light),
                NodeKind::Mesh(geometry) => {
                    match meshes.iter().position(|(g, _)| g.id() == geometry.id()) {
                        Some(idx) => meshes[idx].1.push(*world),
                        None => meshes.push((geometry.clone(), vec![*world])),
                    }
                }
                NodeKind::Group | NodeKind::Camera(_) => (),
            });
        DrawList {
            light: LightUniform::from_ambients(&ambients),
            meshes,
        }
    }
}
