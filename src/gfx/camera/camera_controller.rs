use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;

/// Remaining input below this is dropped instead of decayed forever.
const SETTLE_EPSILON: f32 = 1e-4;

/// Mouse driven orbit controls with optional damping.
///
/// Input events only accumulate deltas; [`CameraController::update`] feeds
/// them into the camera once per frame. With damping enabled, each frame
/// applies `damping_factor` of what is pending so motion eases out.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping: bool,
    pub damping_factor: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
    pending_pan: (f32, f32),
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.005, 0.5)
    }
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            damping: true,
            damping_factor: 0.1,
            is_shift_held: false,
            is_mouse_pressed: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            pending_pan: (0.0, 0.0),
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                self.pending_zoom += scroll_amount * self.zoom_speed;
            }
            DeviceEvent::MouseMotion { delta } if self.is_mouse_pressed => {
                if self.is_shift_held {
                    self.pending_pan.0 -= delta.0 as f32 * self.pan_speed;
                    self.pending_pan.1 += delta.1 as f32 * self.pan_speed;
                } else {
                    self.pending_yaw -= delta.0 as f32 * self.rotate_speed;
                    self.pending_pitch += delta.1 as f32 * self.rotate_speed;
                }
            }
            _ => (),
        }
    }

    /// Tracks modifier keys. Returns `true` when Shift+C asks for the camera
    /// to go back to its home view.
    pub fn process_keyed_events(&mut self, event: &KeyEvent) -> bool {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => {
                self.is_shift_held = *state == ElementState::Pressed;
                false
            }
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                ..
            } => self.is_shift_held,
            _ => false,
        }
    }

    /// Feeds pending input into the camera. Call once per frame.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        let factor = if self.damping {
            self.damping_factor.clamp(0.0, 1.0)
        } else {
            1.0
        };

        if self.pending_yaw != 0.0 {
            camera.add_yaw(self.pending_yaw * factor);
        }
        if self.pending_pitch != 0.0 {
            camera.add_pitch(self.pending_pitch * factor);
        }
        if self.pending_zoom != 0.0 {
            camera.add_distance(self.pending_zoom * factor);
        }
        if self.pending_pan != (0.0, 0.0) {
            camera.pan((self.pending_pan.0 * factor, self.pending_pan.1 * factor));
        }

        let keep = 1.0 - factor;
        let settle = |v: f32| if (v * keep).abs() < SETTLE_EPSILON { 0.0 } else { v * keep };
        self.pending_yaw = settle(self.pending_yaw);
        self.pending_pitch = settle(self.pending_pitch);
        self.pending_zoom = settle(self.pending_zoom);
        self.pending_pan = (settle(self.pending_pan.0), settle(self.pending_pan.1));
    }

    /// Drops any motion still in flight.
    pub fn reset(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 0.0;
        self.pending_pan = (0.0, 0.0);
    }

    /// Whether damped motion is still being applied
    pub fn is_moving(&self) -> bool {
        self.pending_yaw != 0.0
            || self.pending_pitch != 0.0
            || self.pending_zoom != 0.0
            || self.pending_pan != (0.0, 0.0)
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.is_mouse_pressed && self.is_shift_held
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed && !self.is_shift_held
    }
}
