//! Scene render pipeline creation

use wgpu::*;

use crate::gfx::{resources::depth_buffer::DepthBuffer, scene::vertex::Vertex3D};

/// Configuration for the scene pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig<'a> {
    pub label: &'a str,
    pub color_format: TextureFormat,
    pub cull_mode: Option<Face>,
    pub bind_group_layouts: &'a [&'a BindGroupLayout],
}

impl<'a> PipelineConfig<'a> {
    pub fn new(color_format: TextureFormat, bind_group_layouts: &'a [&'a BindGroupLayout]) -> Self {
        Self {
            label: "Scene Pipeline",
            color_format,
            cull_mode: Some(Face::Back),
            bind_group_layouts,
        }
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }
}

/// Builds the lit triangle pipeline from `shader.wgsl`.
pub fn create_scene_pipeline(device: &Device, config: &PipelineConfig<'_>) -> RenderPipeline {
    let shader = device.create_shader_module(wgpu::include_wgsl!("shader.wgsl"));

    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some(&format!("{} Layout", config.label)),
        bind_group_layouts: config.bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(config.label),
        layout: Some(&layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::desc()],
            compilation_options: PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: config.color_format,
                blend: Some(BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: config.cull_mode,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
