use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Perspective camera orbiting `target` on a sphere of radius `distance`.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Derived from distance/pitch/yaw in `update()`
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(75.0).into(),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    /// Camera placed at `eye` looking at `target`.
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self::new(1.0, 0.0, 0.0, target, aspect);
        camera.set_view(eye, target);
        camera
    }

    /// Moves the camera to `eye` and aims it at `target`, deriving the orbit
    /// parameters from the offset between them. Returns `false` and leaves
    /// the camera untouched when the two points coincide.
    pub fn set_view(&mut self, eye: Vector3<f32>, target: Vector3<f32>) -> bool {
        let offset = eye - target;
        let distance = offset.magnitude();
        if !distance.is_finite() || distance <= f32::EPSILON {
            return false;
        }

        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        self.distance = distance;
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.yaw = offset.x.atan2(offset.z);
        self.target = target;
        self.up = Vector3::unit_y();
        self.eye = eye;
        if let Some(max_distance) = self.bounds.max_distance {
            if max_distance < distance {
                self.bounds.max_distance = Some(distance * 10.0);
            }
        }
        true
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        // Zoom faster the further out the camera is
        let corrected_zoom = self.distance.max(1.0).log10().max(0.1) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.clamp(min_yaw, f32::MAX);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.clamp(f32::MIN, max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale by distance for a consistent feel at all zoom levels
        let pan_scale = self.distance * 0.1;

        let total_movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;
        self.eye += total_movement;
        self.target += total_movement;
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(0.01),
            max_distance: Some(500.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.001,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.001,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn test_looking_at_derives_orbit_parameters() {
        let camera = OrbitCamera::looking_at(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0);
        assert!((camera.distance - 5.0).abs() < 1e-6);
        assert_eq!(camera.pitch, 0.0);
        assert_eq!(camera.yaw, 0.0);
    }

    #[test]
    fn test_orbiting_after_set_view_keeps_distance() {
        let target = Vector3::new(1.0, 2.0, 0.0);
        let mut camera = OrbitCamera::looking_at(Vector3::new(1.0, 2.0, 6.0), target, 1.0);

        camera.add_yaw(0.0);
        assert_close(camera.eye, Vector3::new(1.0, 2.0, 6.0));

        camera.add_yaw(std::f32::consts::FRAC_PI_2);
        assert_close(camera.eye, Vector3::new(7.0, 2.0, 0.0));
        assert!(((camera.eye - camera.target).magnitude() - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_set_view_rejects_degenerate_view() {
        let mut camera = OrbitCamera::looking_at(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0);
        assert!(!camera.set_view(Vector3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 1.0, 1.0)));
        assert_eq!(camera.eye, Vector3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_far_framing_widens_distance_bound() {
        let mut camera = OrbitCamera::looking_at(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0);
        assert!(camera.set_view(Vector3::new(0.0, 0.0, 1000.0), Vector3::zero()));
        camera.add_distance(10.0);
        assert!(camera.distance > 1000.0);
    }
}
