use egui::DragValue;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::ComponentKind;

/// Position, rotation (Euler degrees) and scale of a game object. The forward vector and
/// model matrix are derived values, recomputed by [`TransformComponent::update_transform`]
/// only when one of the three source vectors changed since the last recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformComponent {
    #[serde(skip, default = "super::enabled_by_default")]
    pub enabled: bool,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    #[serde(skip)]
    derived: Option<Derived>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Derived {
    source: [Vec3; 3],
    forward: Vec3,
    model: Mat4,
}

impl TransformComponent {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        let mut transform = Self {
            enabled: true,
            position,
            rotation,
            scale,
            derived: None,
        };
        transform.update_transform();

        transform
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO, Vec3::ONE)
    }

    pub fn build_rotation(&self) -> Quat {
        let mut rotation = Quat::IDENTITY;
        rotation *= Quat::from_axis_angle(Vec3::X, self.rotation.x.to_radians());
        rotation *= Quat::from_axis_angle(Vec3::Y, self.rotation.y.to_radians());
        rotation *= Quat::from_axis_angle(Vec3::Z, self.rotation.z.to_radians());

        rotation
    }

    pub fn build_transform_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.build_rotation(), self.position)
    }

    /// Recomputes `forward` and `model` if position, rotation or scale changed.
    /// Returns whether a recompute happened.
    pub fn update_transform(&mut self) -> bool {
        let source = [self.position, self.rotation, self.scale];

        if matches!(&self.derived, Some(derived) if derived.source == source) {
            return false;
        }

        let rotation = self.build_rotation();

        self.derived = Some(Derived {
            source,
            forward: rotation * Vec3::NEG_Z,
            model: Mat4::from_scale_rotation_translation(self.scale, rotation, self.position),
        });

        true
    }

    /// Forward vector as of the last [`TransformComponent::update_transform`].
    pub fn forward(&self) -> Vec3 {
        match &self.derived {
            Some(derived) => derived.forward,
            None => self.build_rotation() * Vec3::NEG_Z,
        }
    }

    /// Model matrix as of the last [`TransformComponent::update_transform`].
    pub fn model(&self) -> Mat4 {
        match &self.derived {
            Some(derived) => derived.model,
            None => self.build_transform_matrix(),
        }
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }
}

// Derived values are a cache and take no part in equality.
impl PartialEq for TransformComponent {
    fn eq(&self, other: &Self) -> bool {
        self.enabled == other.enabled
            && self.position == other.position
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}

pub fn draw(ui: &mut egui::Ui, transform: &mut TransformComponent) {
    super::draw_header(ui, ComponentKind::Transform, &mut transform.enabled, false);

    ui.columns(4, |columns| {
        columns[0].label("Position");
        columns[1].add(
            DragValue::new(&mut transform.position.x)
                .speed(0.1)
                .suffix("m"),
        );
        columns[2].add(
            DragValue::new(&mut transform.position.y)
                .speed(0.1)
                .suffix("m"),
        );
        columns[3].add(
            DragValue::new(&mut transform.position.z)
                .speed(0.1)
                .suffix("m"),
        );
    });
    ui.columns(4, |columns| {
        columns[0].label("Rotation");
        columns[1].add(
            DragValue::new(&mut transform.rotation.x)
                .speed(0.1)
                .suffix("°"),
        );
        columns[2].add(
            DragValue::new(&mut transform.rotation.y)
                .speed(0.1)
                .suffix("°"),
        );
        columns[3].add(
            DragValue::new(&mut transform.rotation.z)
                .speed(0.1)
                .suffix("°"),
        );
    });
    ui.columns(4, |columns| {
        columns[0].label("Scale");
        columns[1].add(
            DragValue::new(&mut transform.scale.x)
                .speed(0.1)
                .suffix("x"),
        );
        columns[2].add(
            DragValue::new(&mut transform.scale.y)
                .speed(0.1)
                .suffix("x"),
        );
        columns[3].add(
            DragValue::new(&mut transform.scale.z)
                .speed(0.1)
                .suffix("x"),
        );
    });
}
