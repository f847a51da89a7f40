use std::fmt::{self, Display};

use egui::ComboBox;
use glam::Vec4;
use serde::{Deserialize, Serialize};

use super::ComponentKind;

/// Primitive shape drawn by a [`RendererComponent`]; also the key instances are batched by.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Cube = 0,
    Sphere = 1,
    Plane = 2,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 3] = [GeometryKind::Cube, GeometryKind::Sphere, GeometryKind::Plane];

    pub const fn name(self) -> &'static str {
        match self {
            GeometryKind::Cube => "Cube",
            GeometryKind::Sphere => "Sphere",
            GeometryKind::Plane => "Plane",
        }
    }
}

impl Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererComponent {
    #[serde(skip, default = "super::enabled_by_default")]
    pub enabled: bool,
    pub geometry: GeometryKind,
    pub color: Vec4,
}

impl RendererComponent {
    pub fn new(geometry: GeometryKind, color: Vec4) -> Self {
        Self {
            enabled: true,
            geometry,
            color,
        }
    }
}

impl Default for RendererComponent {
    fn default() -> Self {
        Self::new(GeometryKind::Cube, Vec4::ONE)
    }
}

pub fn draw(ui: &mut egui::Ui, renderer_component: &mut RendererComponent) -> bool {
    let remove_requested = super::draw_header(
        ui,
        ComponentKind::Renderer,
        &mut renderer_component.enabled,
        true,
    );

    ui.columns(2, |columns| {
        columns[0].label("geometry:");
        ComboBox::from_id_source("renderer geometry")
            .selected_text(renderer_component.geometry.name())
            .show_ui(&mut columns[1], |ui| {
                for geometry in GeometryKind::ALL {
                    ui.selectable_value(&mut renderer_component.geometry, geometry, geometry.name());
                }
            });
    });

    ui.columns(2, |columns| {
        columns[0].label("color:");
        columns[1].color_edit_button_rgba_unmultiplied(renderer_component.color.as_mut());
    });

    remove_requested
}
