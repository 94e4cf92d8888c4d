//! # Graphics Module
//!
//! Everything needed to put a loaded model on screen.
//!
//! - **Camera System** ([`camera`]) - Damped orbit camera that frames the model
//! - **Rendering** ([`rendering`]) - Lit triangle pipeline and the renderer seam
//! - **Scene** ([`scene`]) - Node hierarchy of the resident asset and its lights
//! - **Resources** ([`resources`]) - Materials, depth buffer and global uniforms
//!
//! Colors ([`color`]) are stored linear and converted at the edges.

pub mod camera;
pub mod color;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use color::Color;
pub use rendering::{RenderEngine, SceneRenderer};
