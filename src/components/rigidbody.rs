use egui::{ComboBox, DragValue};
use serde::{Deserialize, Serialize};

use super::ComponentKind;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Static = 0,
    Dynamic = 1,
}

impl BodyKind {
    pub const ALL: [BodyKind; 2] = [BodyKind::Static, BodyKind::Dynamic];
}

// Simulation is not implemented; the component only carries authoring data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidbodyComponent {
    #[serde(skip, default = "super::enabled_by_default")]
    pub enabled: bool,
    pub body: BodyKind,
    pub mass: f32,
    pub use_gravity: bool,
    pub damping: f32,
    pub angular_damping: f32,
}

impl Default for RigidbodyComponent {
    fn default() -> Self {
        Self {
            enabled: true,
            body: BodyKind::Dynamic,
            mass: 1.0,
            use_gravity: true,
            damping: 0.0,
            angular_damping: 0.05,
        }
    }
}

pub fn draw(ui: &mut egui::Ui, rigidbody_component: &mut RigidbodyComponent) -> bool {
    let remove_requested = super::draw_header(
        ui,
        ComponentKind::Rigidbody,
        &mut rigidbody_component.enabled,
        true,
    );

    ui.columns(2, |columns| {
        columns[0].label("type:");
        ComboBox::from_id_source("rigidbody type")
            .selected_text(format!("{:?}", rigidbody_component.body))
            .show_ui(&mut columns[1], |ui| {
                for body in BodyKind::ALL {
                    ui.selectable_value(&mut rigidbody_component.body, body, format!("{:?}", body));
                }
            });
    });

    if rigidbody_component.body == BodyKind::Dynamic {
        ui.columns(2, |columns| {
            columns[0].label("use gravity:");
            columns[1].checkbox(&mut rigidbody_component.use_gravity, "");
        });

        ui.columns(2, |columns| {
            columns[0].label("mass:");
            columns[1].add(
                DragValue::new(&mut rigidbody_component.mass)
                    .clamp_range(0.001..=1000.0)
                    .speed(0.1)
                    .suffix("kg"),
            );
        });

        ui.columns(2, |columns| {
            columns[0].label("damping:");
            columns[1].add(
                DragValue::new(&mut rigidbody_component.damping)
                    .clamp_range(0.0..=1.0)
                    .speed(0.01),
            );
        });

        ui.columns(2, |columns| {
            columns[0].label("angular damping:");
            columns[1].add(
                DragValue::new(&mut rigidbody_component.angular_damping)
                    .clamp_range(0.0..=1.0)
                    .speed(0.01),
            );
        });
    }

    remove_requested
}
