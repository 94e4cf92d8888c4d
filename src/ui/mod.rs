//! # User Interface Module
//!
//! Dear ImGui overlay with the viewer controls.
//!
//! ## Key Components
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`viewer_panel`] - Model, color and animation pickers
//! - [`UiBinding`] - Turns control changes into presenter calls
//!
//! ## Input Handling
//!
//! ImGui sees every window event first. While it wants the mouse or keyboard
//! the camera controller is not fed, so dragging a slider does not orbit.

pub mod binding;
pub mod manager;
pub mod panel;

// Re-export main types
pub use binding::{UiBinding, UiEvent, ViewerControls};
pub use manager::UiManager;
pub use panel::viewer_panel;
