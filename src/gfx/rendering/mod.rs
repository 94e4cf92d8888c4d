// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! The [`SceneRenderer`] seam used by the presenter, and its wgpu
//! implementation with the pipeline and per-mesh GPU resources.

pub mod gpu_mesh;
pub mod pipeline;
pub mod render_engine;
pub mod renderer;

// Re-export main types
pub use gpu_mesh::{GpuMesh, ModelUniform};
pub use pipeline::{create_scene_pipeline, PipelineConfig};
pub use render_engine::RenderEngine;
pub use renderer::SceneRenderer;
