//! Windowed viewer application
//!
//! Wires winit, the render engine, the ImGui overlay and the
//! [`AssetPresenter`] together. Frames are driven by redraw requests: each
//! `RedrawRequested` builds the UI, dispatches control changes, ticks the
//! presenter and asks for the next frame only while the presenter runs.

use anyhow::Context;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::{
    config::ViewerConfig,
    gfx::rendering::render_engine::RenderEngine,
    loader::{FileSource, ThreadedLoader},
    presenter::{AssetPresenter, LoopControl},
    ui::{UiBinding, UiManager},
};

pub struct GlimmerApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    title: String,
    window: Option<Arc<Window>>,
    presenter: Option<AssetPresenter<RenderEngine>>,
    binding: UiBinding,
}

impl GlimmerApp {
    /// Creates the application for `config`. Nothing is opened until
    /// [`GlimmerApp::run`].
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        Ok(Self {
            event_loop,
            app_state: AppState {
                title: "Glimmer".to_string(),
                window: None,
                presenter: None,
                binding: UiBinding::new(config),
            },
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.app_state.title = title.into();
        self
    }

    /// Runs the event loop until the window is closed
    pub fn run(self) -> anyhow::Result<()> {
        let GlimmerApp {
            event_loop,
            mut app_state,
        } = self;

        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop
            .run_app(&mut app_state)
            .context("event loop terminated with an error")
    }
}

impl AppState {
    /// Builds the window, renderer, overlay and presenter, then starts the
    /// presenter on the configured assets.
    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(self.title.clone())
                    .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
            )
            .context("failed to create window")?;
        let window_handle = Arc::new(window);

        let (width, height) = window_handle.inner_size().into();
        let mut renderer =
            pollster::block_on(RenderEngine::new(window_handle.clone(), width, height))?;

        let overlay = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window_handle,
        );
        renderer.attach_overlay(overlay);

        let config = self.binding.config();
        let loader = ThreadedLoader::new(FileSource::new(config.base_dir.clone()));
        let mut presenter = AssetPresenter::new(renderer, Box::new(loader));
        presenter.resize(width, height);
        presenter.start(config);

        window_handle.request_redraw();
        self.window = Some(window_handle);
        self.presenter = Some(presenter);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.dispose();
        }
        event_loop.exit();
    }

    fn redraw(&mut self, window: &Window) {
        let Some(presenter) = self.presenter.as_mut() else {
            return;
        };

        let names = presenter.animation_names();
        let resident = presenter.scene().asset().map(|asset| asset.url.clone());
        let binding = &mut self.binding;
        let mut events = Vec::new();
        if let Some(overlay) = presenter.renderer_mut().overlay_mut() {
            if let Err(err) = overlay.update_logic(window, |ui| {
                events = binding.build_panel(ui, resident.as_deref(), &names)
            }) {
                log::warn!("UI frame skipped: {}", err);
            }
        }
        UiBinding::dispatch_all(events, presenter);

        if presenter.tick() == LoopControl::Continue {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            log::error!("Failed to start viewer: {:#}", err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let Some(presenter) = self.presenter.as_mut() else {
            return;
        };

        // Handle UI input first
        let ui_captured = presenter
            .renderer_mut()
            .overlay_mut()
            .map(|overlay| overlay.handle_input(&window, window_id, &event))
            .unwrap_or(false);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.shutdown(event_loop);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !ui_captured {
                    presenter.camera_mut().process_keyboard_event(&event);
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                presenter.resize(width, height);
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.redraw(&window);
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(presenter) = self.presenter.as_mut() else {
            return;
        };

        // Camera only moves while ImGui does not want the mouse or keyboard
        let ui_wants_input = presenter
            .renderer()
            .overlay()
            .map(UiManager::wants_input)
            .unwrap_or(false);
        if !ui_wants_input {
            presenter.camera_mut().process_event(&event);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.dispose();
        }
    }
}
