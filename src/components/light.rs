use egui::DragValue;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ComponentKind;

/// Directional light. The direction comes from the owning game object's transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightComponent {
    #[serde(skip, default = "super::enabled_by_default")]
    pub enabled: bool,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

pub fn draw(ui: &mut egui::Ui, light_component: &mut LightComponent) -> bool {
    let remove_requested =
        super::draw_header(ui, ComponentKind::Light, &mut light_component.enabled, true);

    ui.columns(2, |columns| {
        columns[0].label("color:");
        columns[1].color_edit_button_rgb(light_component.color.as_mut());
    });

    ui.columns(2, |columns| {
        columns[0].label("intensity:");
        columns[1].add(
            DragValue::new(&mut light_component.intensity)
                .clamp_range(0.0..=100.0)
                .speed(0.1),
        );
    });

    remove_requested
}
