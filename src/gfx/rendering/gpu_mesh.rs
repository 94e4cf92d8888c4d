//! GPU-side copy of one mesh node

use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::{
    gfx::{
        camera::camera_utils::convert_matrix4_to_array,
        resources::material::MaterialUniform,
        scene::asset::{MeshNode, NodeId},
    },
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// Per-mesh transform uniform
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub world: [[f32; 4]; 4],
    /// Inverse transpose of `world`, for normals
    pub normal: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn new(world: Matrix4<f32>) -> Self {
        let normal = world
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            world: convert_matrix4_to_array(world),
            normal: convert_matrix4_to_array(normal),
        }
    }
}

/// Layout of bind group 1: model uniform, then material uniform
pub fn mesh_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Mesh Bind Group Layout"),
        entries: &[binding_types::uniform_entry(0), binding_types::uniform_entry(1)],
    })
}

pub struct GpuMesh {
    pub node: NodeId,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    model_ubo: UniformBuffer<ModelUniform>,
    material_ubo: UniformBuffer<MaterialUniform>,
    bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        node: NodeId,
        mesh: &MeshNode,
        world: Matrix4<f32>,
    ) -> Self {
        let label = format!("Mesh node {}", node);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} vertices", label)),
            contents: bytemuck::cast_slice(&mesh.geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} indices", label)),
            contents: bytemuck::cast_slice(&mesh.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let model_ubo = UniformBuffer::new_with_data(device, &ModelUniform::new(world));
        let material_ubo = UniformBuffer::new_with_data(device, &mesh.material.uniform());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_ubo.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material_ubo.binding_resource(),
                },
            ],
        });

        Self {
            node,
            vertex_buffer,
            index_buffer,
            index_count: mesh.geometry.indices.len() as u32,
            model_ubo,
            material_ubo,
            bind_group,
        }
    }

    /// Mirrors the node's current world matrix and material. Unchanged
    /// values are not re-uploaded.
    pub fn sync(&mut self, queue: &wgpu::Queue, mesh: &MeshNode, world: Matrix4<f32>) {
        self.model_ubo.update_content(queue, ModelUniform::new(world));
        self.material_ubo.update_content(queue, mesh.material.uniform());
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_normal_matrix_undoes_nonuniform_scale() {
        let uniform = ModelUniform::new(Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0));
        assert_eq!(uniform.normal[0][0], 0.5);
        assert_eq!(uniform.normal[1][1], 1.0);
    }

    #[test]
    fn test_normal_matrix_ignores_translation_for_normals() {
        let uniform = ModelUniform::new(Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)));
        // Upper 3x3 stays identity
        assert_eq!(uniform.normal[0][0..3], [1.0, 0.0, 0.0]);
        assert_eq!(uniform.normal[2][0..3], [0.0, 0.0, 1.0]);
    }
}
