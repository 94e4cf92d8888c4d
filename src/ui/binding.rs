// src/ui/binding.rs
//! Routes control changes to the presenter
//!
//! The panel never touches the presenter directly. It edits
//! [`ViewerControls`], which report a [`UiEvent`] only when a value really
//! changed, and [`UiBinding::dispatch`] turns each event into exactly one
//! presenter call.

use crate::{
    config::ViewerConfig,
    gfx::{color::Color, rendering::renderer::SceneRenderer},
    presenter::AssetPresenter,
};

use super::panel::viewer_panel;

/// A user-driven change of one control
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ModelSelected(String),
    ColorChanged(Color),
    AnimationSelected(String),
}

/// Current values of the viewer controls
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerControls {
    model_index: usize,
    /// sRGB, as edited by the color picker
    color: [f32; 3],
    animation: Option<String>,
    animation_names: Vec<String>,
    /// Asset the clip names belong to
    resident: Option<String>,
}

impl ViewerControls {
    /// Controls showing the first model and the first palette color
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            model_index: 0,
            color: config.initial_color().to_srgb(),
            animation: None,
            animation_names: Vec::new(),
            resident: None,
        }
    }

    pub fn model_index(&self) -> usize {
        self.model_index
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn animation(&self) -> Option<&str> {
        self.animation.as_deref()
    }

    pub fn animation_names(&self) -> &[String] {
        &self.animation_names
    }

    /// Selects model `index` of `config`. Out-of-range or unchanged
    /// selections produce no event.
    pub fn select_model(&mut self, index: usize, config: &ViewerConfig) -> Option<UiEvent> {
        if index == self.model_index {
            return None;
        }
        let url = config.asset_urls.get(index)?;
        self.model_index = index;
        Some(UiEvent::ModelSelected(url.clone()))
    }

    pub fn set_color(&mut self, srgb: [f32; 3]) -> Option<UiEvent> {
        if srgb == self.color {
            return None;
        }
        self.color = srgb;
        Some(UiEvent::ColorChanged(Color::from_srgb(srgb[0], srgb[1], srgb[2])))
    }

    pub fn select_animation(&mut self, name: &str) -> Option<UiEvent> {
        if self.animation.as_deref() == Some(name) {
            return None;
        }
        self.animation = Some(name.to_string());
        Some(UiEvent::AnimationSelected(name.to_string()))
    }

    /// Adopts the clip names of the resident asset `resident`. Any change
    /// of resident asset clears the selection without an event, even when
    /// the new asset carries the same clip names.
    pub fn sync_animations(&mut self, resident: Option<&str>, names: &[String]) {
        if self.resident.as_deref() != resident {
            self.resident = resident.map(str::to_string);
            self.animation = None;
        }
        if self.animation_names.as_slice() != names {
            self.animation_names = names.to_vec();
            self.animation = None;
        }
    }
}

/// Owns the viewer config and control values and applies control changes
/// to an [`AssetPresenter`].
pub struct UiBinding {
    config: ViewerConfig,
    controls: ViewerControls,
}

impl UiBinding {
    pub fn new(config: ViewerConfig) -> Self {
        let controls = ViewerControls::new(&config);
        Self { config, controls }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn controls(&self) -> &ViewerControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ViewerControls {
        &mut self.controls
    }

    /// Draws the control panel for this frame and returns the changes made.
    ///
    /// `resident` is the url of the asset currently shown, if any, and
    /// `animation_names` its clips.
    pub fn build_panel(
        &mut self,
        ui: &imgui::Ui,
        resident: Option<&str>,
        animation_names: &[String],
    ) -> Vec<UiEvent> {
        self.controls.sync_animations(resident, animation_names);
        viewer_panel(ui, &mut self.controls, &self.config)
    }

    /// Forwards one event to the presenter.
    pub fn dispatch<R: SceneRenderer>(event: UiEvent, presenter: &mut AssetPresenter<R>) {
        match event {
            UiEvent::ModelSelected(url) => presenter.load_asset(&url),
            UiEvent::ColorChanged(color) => presenter.set_color(color),
            UiEvent::AnimationSelected(name) => {
                presenter.play_animation(&name);
            }
        }
    }

    pub fn dispatch_all<R: SceneRenderer>(
        events: impl IntoIterator<Item = UiEvent>,
        presenter: &mut AssetPresenter<R>,
    ) {
        for event in events {
            Self::dispatch(event, presenter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{
        tests::{animated_cube, presenter},
        PresenterState,
    };

    fn config() -> ViewerConfig {
        ViewerConfig::new(["a.glb", "b.glb"])
    }

    #[test]
    fn test_controls_only_report_real_changes() {
        let config = config();
        let mut controls = ViewerControls::new(&config);

        assert_eq!(controls.select_model(0, &config), None);
        assert_eq!(controls.select_model(7, &config), None);
        assert_eq!(
            controls.select_model(1, &config),
            Some(UiEvent::ModelSelected("b.glb".into()))
        );

        assert_eq!(controls.set_color(controls.color()), None);
        assert!(matches!(controls.set_color([0.0, 0.0, 1.0]), Some(UiEvent::ColorChanged(_))));

        assert!(controls.select_animation("Wave").is_some());
        assert_eq!(controls.select_animation("Wave"), None);
    }

    #[test]
    fn test_initial_color_comes_from_palette() {
        let [r, g, b] = ViewerControls::new(&config()).color();
        // Default palette starts with #ff0000
        assert!((r - 1.0).abs() < 1e-4);
        assert_eq!((g, b), (0.0, 0.0));
    }

    #[test]
    fn test_new_clip_names_clear_selection_silently() {
        let mut controls = ViewerControls::new(&config());
        controls.sync_animations(Some("a.glb"), &["Idle".to_string(), "Wave".to_string()]);
        controls.select_animation("Wave");

        controls.sync_animations(Some("a.glb"), &["Idle".to_string(), "Wave".to_string()]);
        assert_eq!(controls.animation(), Some("Wave"));

        controls.sync_animations(Some("a.glb"), &["Run".to_string()]);
        assert_eq!(controls.animation(), None);
        assert_eq!(controls.animation_names(), ["Run".to_string()]);
    }

    #[test]
    fn test_switching_asset_clears_selection_with_same_clip_names() {
        let names = ["Idle".to_string(), "Wave".to_string()];
        let mut controls = ViewerControls::new(&config());
        controls.sync_animations(Some("a.glb"), &names);
        controls.select_animation("Wave");

        controls.sync_animations(Some("b.glb"), &names);
        assert_eq!(controls.animation(), None);

        // Picking the same clip on the new asset is a real change again
        assert_eq!(
            controls.select_animation("Wave"),
            Some(UiEvent::AnimationSelected("Wave".into()))
        );

        controls.sync_animations(None, &[]);
        assert_eq!(controls.animation(), None);
        assert!(controls.animation_names().is_empty());
    }

    #[test]
    fn test_model_selection_loads_asset() {
        let (mut presenter, loader) = presenter();

        UiBinding::dispatch(UiEvent::ModelSelected("b.glb".into()), &mut presenter);

        assert_eq!(loader.urls(), vec!["b.glb".to_string()]);
        assert_eq!(presenter.state(), &PresenterState::Loading { url: "b.glb".into() });
    }

    #[test]
    fn test_color_and_animation_events_reach_resident_asset() {
        let (mut presenter, loader) = presenter();
        presenter.load_asset("robot.glb");
        loader.complete(0, Ok(animated_cube("robot.glb")));
        presenter.poll_loads();

        UiBinding::dispatch_all(
            [
                UiEvent::ColorChanged(Color::new(0.0, 1.0, 0.0)),
                UiEvent::AnimationSelected("Jump".into()),
            ],
            &mut presenter,
        );

        assert_eq!(presenter.active_animations(), vec!["Jump".to_string()]);
        let asset = presenter.scene().asset().unwrap();
        let cube = asset.node(1).and_then(|node| node.as_mesh()).unwrap();
        assert_eq!(cube.material.color(), Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_events_without_asset_are_harmless() {
        let (mut presenter, _loader) = presenter();

        UiBinding::dispatch(UiEvent::ColorChanged(Color::BLACK), &mut presenter);
        UiBinding::dispatch(UiEvent::AnimationSelected("Idle".into()), &mut presenter);

        assert_eq!(presenter.state(), &PresenterState::Empty);
        assert!(presenter.active_animations().is_empty());
    }
}
