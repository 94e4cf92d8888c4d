// src/ui/panel.rs
//! Viewer control panel
//!
//! Model picker, color picker with palette swatches and animation picker.

use crate::config::ViewerConfig;

use super::binding::{UiEvent, ViewerControls};

/// Draws the viewer panel and returns one event per control the user changed
/// this frame.
///
/// # Arguments
/// * `ui` - ImGui UI context
/// * `controls` - Control values, edited in place
/// * `config` - Source of the model list and the palette
pub fn viewer_panel(
    ui: &imgui::Ui,
    controls: &mut ViewerControls,
    config: &ViewerConfig,
) -> Vec<UiEvent> {
    let mut events = Vec::new();

    let display_size = ui.io().display_size;
    // Minimized window
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return events;
    }

    ui.window("Viewer")
        .size([320.0, 0.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .collapsible(true)
        .build(|| {
            model_picker(ui, controls, config, &mut events);
            ui.separator();
            color_picker(ui, controls, config, &mut events);
            ui.separator();
            animation_picker(ui, controls, &mut events);
        });

    events
}

fn model_picker(
    ui: &imgui::Ui,
    controls: &mut ViewerControls,
    config: &ViewerConfig,
    events: &mut Vec<UiEvent>,
) {
    if config.asset_urls.is_empty() {
        ui.text_disabled("No models configured");
        return;
    }

    let mut index = controls.model_index();
    if ui.combo_simple_string("Model", &mut index, config.asset_urls.as_slice()) {
        events.extend(controls.select_model(index, config));
    }
}

fn color_picker(
    ui: &imgui::Ui,
    controls: &mut ViewerControls,
    config: &ViewerConfig,
    events: &mut Vec<UiEvent>,
) {
    let mut color = controls.color();
    if ui.color_edit3("Color", &mut color) {
        events.extend(controls.set_color(color));
    }

    for (i, swatch) in config.palette.iter().enumerate() {
        if i > 0 {
            ui.same_line();
        }
        let [r, g, b] = swatch.to_srgb();
        if ui.color_button(format!("##palette{}", i), [r, g, b, 1.0]) {
            events.extend(controls.set_color([r, g, b]));
        }
        if ui.is_item_hovered() {
            ui.tooltip_text(swatch.to_hex());
        }
    }
}

fn animation_picker(ui: &imgui::Ui, controls: &mut ViewerControls, events: &mut Vec<UiEvent>) {
    if controls.animation_names().is_empty() {
        ui.text_disabled("No animations");
        return;
    }

    let preview = controls.animation().unwrap_or("All clips").to_string();
    let mut picked = None;
    if let Some(_combo) = ui.begin_combo("Animation", &preview) {
        for name in controls.animation_names() {
            let is_selected = controls.animation() == Some(name.as_str());
            if ui.selectable_config(name).selected(is_selected).build() {
                picked = Some(name.clone());
            }
        }
    }

    if let Some(name) = picked {
        events.extend(controls.select_animation(&name));
    }
}
