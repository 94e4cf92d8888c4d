//! # Glimmer Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use glimmer::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ViewerConfig::new(["models/Chair.glb"]).with_palette_hex(["#ff8800"])?;
//!     GlimmerApp::new(config)?.run()
//! }
//! ```

// Re-export core application types
pub use crate::app::GlimmerApp;
pub use crate::config::ViewerConfig;
pub use crate::error::{ViewerError, ViewerResult};
pub use crate::presenter::{AssetPresenter, LoopControl, PresenterState};

// Re-export graphics and scene types
pub use crate::animation::{AnimationClip, AnimationPlayer, AnimationSet};
pub use crate::gfx::camera::CameraManager;
pub use crate::gfx::color::Color;
pub use crate::gfx::rendering::{RenderEngine, SceneRenderer};
pub use crate::gfx::scene::{Aabb, Asset, LightingRig, Scene};

// Re-export loading and UI types
pub use crate::loader::{AssetLoader, AssetSource, FileSource, ThreadedLoader};
pub use crate::ui::{UiBinding, UiEvent};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3};
