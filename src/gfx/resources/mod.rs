// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Materials, the depth buffer and the global uniform bindings.

pub mod depth_buffer;
pub mod global_bindings;
pub mod material;

// Re-export main types
pub use depth_buffer::DepthBuffer;
pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent};
pub use material::{Material, MaterialUniform};
