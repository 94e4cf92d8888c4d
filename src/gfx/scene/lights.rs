//! Fixed lighting rig of the viewer scene

use cgmath::{InnerSpace, Vector3};

use crate::gfx::color::Color;

/// Uniform light applied to every surface regardless of orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Light arriving from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface towards the light
    pub fn direction(&self) -> Vector3<f32> {
        if self.position.magnitude2() > 0.0 {
            self.position.normalize()
        } else {
            Vector3::unit_y()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
}

/// Number of point lights the shader evaluates
pub const POINT_LIGHT_COUNT: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct LightingRig {
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    pub points: [PointLight; POINT_LIGHT_COUNT],
}

impl Default for LightingRig {
    /// Soft grey ambient, a white key light from the upper front right and
    /// two white fill lights above and below the model.
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Color::from_hex_u32(0x404040),
                intensity: 2.0,
            },
            sun: DirectionalLight {
                color: Color::WHITE,
                intensity: 2.0,
                position: Vector3::new(5.0, 5.0, 5.0).normalize(),
            },
            points: [
                PointLight {
                    color: Color::WHITE,
                    intensity: 1.0,
                    position: Vector3::new(0.0, 10.0, 10.0),
                },
                PointLight {
                    color: Color::WHITE,
                    intensity: 1.0,
                    position: Vector3::new(0.0, -10.0, -10.0),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rig_sun_direction_is_unit() {
        let rig = LightingRig::default();
        let d = rig.sun.direction();
        assert!((d.magnitude() - 1.0).abs() < 1e-6);
        assert!((d.x - d.y).abs() < 1e-6 && (d.y - d.z).abs() < 1e-6);
        assert_eq!(rig.ambient.color.to_hex(), "#404040");
    }
}
