//! Engine data structures: transforms, geometry, textures and the scene graph.
//!
//! - `instance` holds node transforms and their per-instance GPU layout
//! - `model` contains CPU geometry and the uploaded GPU mesh buffers
//! - `scene_graph` is the node tree the renderer traverses every frame
//! - `texture` wraps render target textures (depth)

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
