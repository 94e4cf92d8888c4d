//! Global uniform bindings for camera and scene lighting
//!
//! Per-frame data shared by every mesh: camera matrices and the lighting
//! rig. Bound to slot 0 of the scene pipeline.

use crate::{
    gfx::{
        camera::camera_utils::CameraUniform,
        scene::lights::{LightingRig, POINT_LIGHT_COUNT},
    },
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in `shader.wgsl` exactly. Every light
/// field is a vec4 so the layout needs no padding: rgb is the color already
/// multiplied by intensity, positions and directions carry `w = 1`/`w = 0`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    sun_direction: [f32; 4],
    sun_color: [f32; 4],
    point_positions: [[f32; 4]; POINT_LIGHT_COUNT],
    point_colors: [[f32; 4]; POINT_LIGHT_COUNT],
}

impl GlobalUBOContent {
    pub fn new(camera: &CameraUniform, lights: &LightingRig) -> Self {
        let rgb = |c: [f32; 3]| [c[0], c[1], c[2], 1.0];
        let sun = lights.sun.direction();

        let mut point_positions = [[0.0; 4]; POINT_LIGHT_COUNT];
        let mut point_colors = [[0.0; 4]; POINT_LIGHT_COUNT];
        for (i, point) in lights.points.iter().enumerate() {
            point_positions[i] = [point.position.x, point.position.y, point.position.z, 1.0];
            point_colors[i] = rgb(point.color.scaled(point.intensity));
        }

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ambient: rgb(lights.ambient.color.scaled(lights.ambient.intensity)),
            sun_direction: [sun.x, sun.y, sun.z, 0.0],
            sun_color: rgb(lights.sun.color.scaled(lights.sun.intensity)),
            point_positions,
            point_colors,
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Layout and bind group for the global uniforms
pub struct GlobalBindings {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[binding_types::uniform_entry(0)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    /// Used when creating render pipelines that read the globals.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
