//! WGPU-based rendering engine for the viewer
//!
//! Owns the surface, device and every GPU resource of the resident asset,
//! and draws the scene followed by the optional ImGui overlay.

use std::sync::Arc;
use wgpu::{Device, TextureFormat};

use crate::{
    error::ViewerError,
    gfx::{
        camera::orbit_camera::OrbitCamera,
        resources::{
            depth_buffer::DepthBuffer,
            global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent},
        },
        scene::{
            asset::{Asset, Node},
            lights::LightingRig,
            scene::Scene,
        },
    },
    ui::manager::UiManager,
};

use super::{
    gpu_mesh::{mesh_bind_group_layout, GpuMesh},
    pipeline::{create_scene_pipeline, PipelineConfig},
    renderer::SceneRenderer,
};

/// Linear clear color behind the model
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.06,
    a: 1.0,
};

/// Core rendering engine managing GPU resources and draw calls
///
/// Handles surface configuration, the depth buffer, the scene pipeline,
/// the global camera/light uniforms and one [`GpuMesh`] per mesh node of
/// the resident asset. The UI overlay, when attached, is drawn last.
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_buffer: DepthBuffer,
    format: TextureFormat,
    pipeline: wgpu::RenderPipeline,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    mesh_layout: wgpu::BindGroupLayout,
    meshes: Vec<GpuMesh>,
    overlay: Option<UiManager>,
    disposed: bool,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    ///
    /// # Errors
    /// Returns [`ViewerError::Surface`] if no surface, adapter or device
    /// can be created.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine, ViewerError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|err| ViewerError::Surface(err.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| ViewerError::Surface(format!("no suitable adapter: {}", err)))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|err| ViewerError::Surface(format!("device request failed: {}", err)))?;

        // Shading happens in linear space, so let the surface encode to sRGB
        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| ViewerError::Surface("surface reports no formats".to_string()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_buffer = DepthBuffer::new(&device, config.width, config.height);

        let global_ubo = GlobalUBO::new_with_data(
            &device,
            &GlobalUBOContent::new(&Default::default(), &LightingRig::default()),
        );
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let mesh_layout = mesh_bind_group_layout(&device);

        let pipeline = create_scene_pipeline(
            &device,
            &PipelineConfig::new(format, &[global_bindings.bind_group_layout(), &mesh_layout]),
        );

        log::info!(
            "Render engine ready: {} ({:?}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format,
            config.width,
            config.height
        );

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_buffer,
            format,
            pipeline,
            global_ubo,
            global_bindings,
            mesh_layout,
            meshes: Vec::new(),
            overlay: None,
            disposed: false,
        })
    }

    /// Installs the UI overlay drawn after the scene pass
    pub fn attach_overlay(&mut self, overlay: UiManager) {
        self.overlay = Some(overlay);
    }

    pub fn overlay(&self) -> Option<&UiManager> {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> Option<&mut UiManager> {
        self.overlay.as_mut()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Gets the surface texture format
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Mirrors node transforms and materials of `asset` into the mesh uniforms
    fn sync_meshes(&mut self, asset: &Asset) {
        let worlds = asset.world_matrices();
        for mesh in &mut self.meshes {
            let node = asset.node(mesh.node).and_then(Node::as_mesh);
            if let (Some(node), Some(world)) = (node, worlds.get(mesh.node)) {
                mesh.sync(&self.queue, node, *world);
            }
        }
    }
}

impl SceneRenderer for RenderEngine {
    fn upload_asset(&mut self, asset: &Asset) {
        let worlds = asset.world_matrices();
        self.meshes = asset
            .mesh_nodes()
            .into_iter()
            .filter_map(|id| {
                let mesh = asset.node(id)?.as_mesh()?;
                if mesh.geometry.indices.is_empty() {
                    return None;
                }
                let world = worlds.get(id).copied()?;
                Some(GpuMesh::new(&self.device, &self.mesh_layout, id, mesh, world))
            })
            .collect();
        log::debug!("Uploaded {} meshes for '{}'", self.meshes.len(), asset.url);
    }

    fn release_asset(&mut self) {
        if !self.meshes.is_empty() {
            log::debug!("Released {} meshes", self.meshes.len());
        }
        self.meshes.clear();
    }

    fn render(&mut self, scene: &Scene, camera: &OrbitCamera) -> Result<(), ViewerError> {
        if self.disposed {
            return Ok(());
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(ViewerError::Surface("surface outdated, reconfigured".to_string()));
            }
            Err(err) => return Err(ViewerError::Surface(err.to_string())),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.global_ubo.update_content(
            &self.queue,
            GlobalUBOContent::new(&camera.uniform, &scene.lights),
        );
        if let Some(asset) = scene.asset() {
            self.sync_meshes(asset);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_buffer.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
            for mesh in &self.meshes {
                mesh.draw(&mut render_pass);
            }
        }

        if let Some(overlay) = self.overlay.as_mut() {
            if let Err(err) = overlay.render_display_only(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            ) {
                log::warn!("UI overlay skipped: {}", err);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the surface and depth buffer
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_buffer.resize(&self.device, width, height);
    }

    fn dispose(&mut self) {
        self.meshes.clear();
        self.overlay = None;
        self.disposed = true;
    }
}
