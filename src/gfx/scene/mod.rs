//! # Scene Module
//!
//! CPU-side description of what is on screen: the lighting rig and the one
//! resident asset with its node hierarchy, geometry and animations.
//!
//! ## Key Components
//!
//! - [`Scene`] - Lighting plus zero-or-one [`ResidentAsset`]
//! - [`Asset`] - Arena of [`Node`]s, each a group or a mesh
//! - [`Aabb`] - World bounds used to frame the camera
//! - [`Vertex3D`] - Vertex layout shared with the renderer

pub mod asset;
pub mod bounds;
pub mod lights;
pub mod scene;
pub mod vertex;

pub use asset::{Asset, Geometry, MeshNode, Node, NodeId, NodeKind, Transform};
pub use bounds::Aabb;
pub use lights::LightingRig;
pub use scene::{ResidentAsset, Scene};
pub use vertex::Vertex3D;
