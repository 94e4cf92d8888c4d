// src/ui/manager.rs
//! ImGui overlay manager
//!
//! Bridges Dear ImGui to winit (input, cursor) and wgpu (drawing). The
//! overlay is drawn onto the already rendered scene.

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

use crate::error::ViewerError;

const FONT_SIZE: f32 = 18.0;

/// ImGui context, platform glue and renderer for the viewer overlay
///
/// A frame is built with [`UiManager::update_logic`] and drawn by the next
/// [`UiManager::render_display_only`].
pub struct UiManager {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
    frame_pending: bool,
}

impl UiManager {
    /// Creates the overlay for `window`, drawing into targets of
    /// `output_color_format`.
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        // Locked DPI: scaling is handled through the font size
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: FONT_SIZE,
                ..Default::default()
            }),
        }]);

        // imgui colors are sRGB; an sRGB target would encode them twice
        let renderer_config = if output_color_format.is_srgb() {
            RendererConfig::new_srgb()
        } else {
            RendererConfig::new()
        };
        let renderer = Renderer::new(
            &mut context,
            device,
            queue,
            RendererConfig {
                texture_format: output_color_format,
                ..renderer_config
            },
        );

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
            frame_pending: false,
        }
    }

    /// Feeds a window event to ImGui.
    ///
    /// Every event is forwarded (resizes and focus changes matter too).
    /// Returns true when the event is keyboard or mouse input that ImGui
    /// claims, so camera controls should ignore it.
    pub fn handle_input(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) -> bool {
        let wrapped: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        self.platform
            .handle_event(self.context.io_mut(), window, &wrapped);

        let io = self.context.io();
        match event {
            WindowEvent::KeyboardInput { .. } | WindowEvent::ModifiersChanged(_) => {
                io.want_capture_keyboard
            }
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. } => io.want_capture_mouse,
            _ => false,
        }
    }

    /// Whether ImGui currently wants mouse or keyboard input
    pub fn wants_input(&self) -> bool {
        let io = self.context.io();
        io.want_capture_mouse || io.want_capture_keyboard
    }

    /// Builds this frame's UI with `run_ui`
    ///
    /// Returns true if the UI wants to capture input this frame.
    pub fn update_logic<F>(&mut self, window: &Window, run_ui: F) -> Result<bool, ViewerError>
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        self.platform
            .prepare_frame(self.context.io_mut(), window)
            .map_err(|err| ViewerError::Ui(err.to_string()))?;

        let ui = self.context.new_frame();
        run_ui(ui);

        let cursor = ui.mouse_cursor();
        if self.last_cursor != cursor {
            self.last_cursor = cursor;
            self.platform.prepare_render(ui, window);
        }
        self.frame_pending = true;

        Ok(self.wants_input())
    }

    /// Draws the UI built by the last `update_logic()` call onto
    /// `color_attachment`, keeping the scene underneath. Does nothing when
    /// no frame was built since the last draw.
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) -> Result<(), ViewerError> {
        if !std::mem::replace(&mut self.frame_pending, false) {
            return Ok(());
        }

        let draw_data = self.context.render();
        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return Ok(());
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.renderer
            .render(draw_data, queue, device, &mut render_pass)
            .map_err(|err| ViewerError::Ui(format!("{:?}", err)))
    }
}
