use cgmath::{Matrix4, SquareMatrix, Vector3};
use winit::event::{DeviceEvent, KeyEvent};

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};
use crate::gfx::scene::bounds::Aabb;

/// How far back the camera sits when framing an asset, relative to the
/// length of its bounding box diagonal.
pub const FRAMING_DISTANCE_FACTOR: f32 = 1.5;

/// The persistent camera rig: orbit camera plus its damped controller.
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
    home: (Vector3<f32>, Vector3<f32>),
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self {
            home: (camera.eye, camera.target),
            camera,
            controller,
        }
    }

    pub fn process_event(&mut self, event: &DeviceEvent) {
        self.controller.process_events(event);
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        if self.controller.process_keyed_events(event) {
            self.reset_view();
        }
    }

    /// Points the camera at the center of `bounds` from in front of it.
    ///
    /// The eye goes to `(center.x, center.y, diagonal * 1.5)`. When that
    /// lands on the center itself, the eye is pushed back along +z by the
    /// same distance instead. The framed view becomes the view restored by
    /// [`Self::reset_view`]. Returns `false` without moving the camera for
    /// empty bounds.
    pub fn frame(&mut self, bounds: &Aabb) -> bool {
        if bounds.is_empty() {
            return false;
        }

        let center = bounds.center();
        let distance = bounds.diagonal() * FRAMING_DISTANCE_FACTOR;
        let mut eye = Vector3::new(center.x, center.y, distance);
        if !self.camera.set_view(eye, center) {
            // Point-sized bounds still get a visible offset
            let back = if distance > f32::EPSILON { distance } else { 1.0 };
            eye = center + Vector3::new(0.0, 0.0, back);
            if !self.camera.set_view(eye, center) {
                return false;
            }
        }

        self.controller.reset();
        self.home = (eye, center);
        true
    }

    /// Returns to the last framed view.
    pub fn reset_view(&mut self) {
        let (eye, target) = self.home;
        self.controller.reset();
        self.camera.set_view(eye, target);
    }

    /// Applies pending controller input and refreshes the camera uniform.
    pub fn update(&mut self) {
        self.controller.update(&mut self.camera);
        self.camera.update_view_proj();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }
}

impl Default for CameraManager {
    /// 75 degree perspective camera at `(0, 0, 5)` looking at the origin.
    fn default() -> Self {
        Self::new(
            OrbitCamera::looking_at(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 0.0), 1.0),
            CameraController::default(),
        )
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_looks_at_bounds_center() {
        let mut rig = CameraManager::default();
        let bounds = Aabb::new(Vector3::new(1.0, 1.0, -1.0), Vector3::new(3.0, 3.0, 1.0));

        assert!(rig.frame(&bounds));
        assert_eq!(rig.camera.target, Vector3::new(2.0, 2.0, 0.0));
        assert_eq!(rig.camera.eye.x, 2.0);
        assert_eq!(rig.camera.eye.y, 2.0);
        assert!((rig.camera.eye.z - bounds.diagonal() * 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_frame_backs_off_when_eye_would_sit_on_center() {
        let mut rig = CameraManager::default();
        // 2x4x4 box: diagonal 6, so the usual eye z of 9 is its center
        let bounds = Aabb::new(Vector3::new(-1.0, -2.0, 7.0), Vector3::new(1.0, 2.0, 11.0));
        assert_eq!(bounds.center(), Vector3::new(0.0, 0.0, 9.0));

        assert!(rig.frame(&bounds));
        assert_eq!(rig.camera.target, bounds.center());
        assert_eq!(rig.camera.eye.x, 0.0);
        assert_eq!(rig.camera.eye.y, 0.0);
        assert_eq!(rig.camera.eye.z, 18.0);
    }

    #[test]
    fn test_point_bounds_still_move_target() {
        let mut rig = CameraManager::default();
        let point = Vector3::new(4.0, -2.0, 0.0);

        assert!(rig.frame(&Aabb::new(point, point)));
        assert_eq!(rig.camera.target, point);
        assert_eq!(rig.camera.eye, Vector3::new(4.0, -2.0, 1.0));
    }

    #[test]
    fn test_empty_bounds_leave_camera_alone() {
        let mut rig = CameraManager::default();
        assert!(!rig.frame(&Aabb::empty()));
        assert_eq!(rig.camera.eye, Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(rig.camera.target, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_reset_view_returns_to_framed_view() {
        let mut rig = CameraManager::default();
        rig.frame(&Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0)));
        let framed = rig.camera.eye;

        rig.camera.add_yaw(1.0);
        rig.reset_view();
        assert_eq!(rig.camera.eye, framed);
    }
}
