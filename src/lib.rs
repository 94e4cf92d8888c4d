// src/lib.rs
//! Glimmer glTF viewer
//!
//! Loads glTF/GLB models, frames them with an orbit camera, recolors their
//! surfaces and plays their embedded animations. Built on wgpu and winit.

pub mod animation;
pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod loader;
pub mod prelude;
pub mod presenter;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::GlimmerApp;
pub use config::ViewerConfig;
pub use error::{ViewerError, ViewerResult};
pub use presenter::{AssetPresenter, LoopControl, PresenterState};

/// Creates a viewer application for the default model set
pub fn default() -> anyhow::Result<GlimmerApp> {
    GlimmerApp::new(ViewerConfig::default())
}
