use std::fmt::{self, Display};

use egui::{Align, Layout, Ui};

pub mod light;
pub mod renderer;
pub mod rigidbody;
pub mod transform;

pub use self::{
    light::LightComponent,
    renderer::{GeometryKind, RendererComponent},
    rigidbody::{BodyKind, RigidbodyComponent},
    transform::TransformComponent,
};

/// Concrete component kinds. The discriminant is the kind's type tag: a unique power of two
/// that is OR-ed into a game object's component mask and written to scene files.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Transform = 1 << 0,
    Light = 1 << 1,
    Renderer = 1 << 2,
    Rigidbody = 1 << 3,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Transform,
        ComponentKind::Light,
        ComponentKind::Renderer,
        ComponentKind::Rigidbody,
    ];

    pub const fn tag(self) -> i32 {
        self as i32
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "Transform",
            ComponentKind::Light => "Light",
            ComponentKind::Renderer => "Renderer",
            ComponentKind::Rigidbody => "Rigidbody",
        }
    }

    /// Size in bytes of the kind's serialized payload.
    pub const fn payload_size(self) -> usize {
        match self {
            ComponentKind::Transform => 9 * 4,
            ComponentKind::Light => 4 * 4,
            ComponentKind::Renderer => 4 + 4 * 4,
            ComponentKind::Rigidbody => 4 + 4 + 1 + 4 + 4,
        }
    }
}

impl Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Transform(TransformComponent),
    Light(LightComponent),
    Renderer(RendererComponent),
    Rigidbody(RigidbodyComponent),
}

impl Component {
    pub fn with_defaults(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Transform => TransformComponent::default().into(),
            ComponentKind::Light => LightComponent::default().into(),
            ComponentKind::Renderer => RendererComponent::default().into(),
            ComponentKind::Rigidbody => RigidbodyComponent::default().into(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Transform(_) => ComponentKind::Transform,
            Component::Light(_) => ComponentKind::Light,
            Component::Renderer(_) => ComponentKind::Renderer,
            Component::Rigidbody(_) => ComponentKind::Rigidbody,
        }
    }

    pub fn tag(&self) -> i32 {
        self.kind().tag()
    }

    pub fn enabled(&self) -> bool {
        match self {
            Component::Transform(transform) => transform.enabled,
            Component::Light(light) => light.enabled,
            Component::Renderer(renderer) => renderer.enabled,
            Component::Rigidbody(rigidbody) => rigidbody.enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            Component::Transform(transform) => transform.enabled = enabled,
            Component::Light(light) => light.enabled = enabled,
            Component::Renderer(renderer) => renderer.enabled = enabled,
            Component::Rigidbody(rigidbody) => rigidbody.enabled = enabled,
        }
    }
}

/// Mutable access to the data of one component. The variant behind it cannot be replaced, so
/// the owner's component mask stays valid.
#[derive(Debug)]
pub enum ComponentMut<'a> {
    Transform(&'a mut TransformComponent),
    Light(&'a mut LightComponent),
    Renderer(&'a mut RendererComponent),
    Rigidbody(&'a mut RigidbodyComponent),
}

impl ComponentMut<'_> {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentMut::Transform(_) => ComponentKind::Transform,
            ComponentMut::Light(_) => ComponentKind::Light,
            ComponentMut::Renderer(_) => ComponentKind::Renderer,
            ComponentMut::Rigidbody(_) => ComponentKind::Rigidbody,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            ComponentMut::Transform(transform) => transform.enabled = enabled,
            ComponentMut::Light(light) => light.enabled = enabled,
            ComponentMut::Renderer(renderer) => renderer.enabled = enabled,
            ComponentMut::Rigidbody(rigidbody) => rigidbody.enabled = enabled,
        }
    }
}

impl Component {
    pub fn data_mut(&mut self) -> ComponentMut<'_> {
        match self {
            Component::Transform(transform) => ComponentMut::Transform(transform),
            Component::Light(light) => ComponentMut::Light(light),
            Component::Renderer(renderer) => ComponentMut::Renderer(renderer),
            Component::Rigidbody(rigidbody) => ComponentMut::Rigidbody(rigidbody),
        }
    }
}

/// Typed access to one variant of [`Component`].
pub trait ComponentType: Into<Component> {
    const KIND: ComponentKind;

    fn from_component(component: &Component) -> Option<&Self>;

    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! impl_component_type {
    ($ty:ident, $variant:ident) => {
        impl From<$ty> for Component {
            fn from(component: $ty) -> Self {
                Component::$variant(component)
            }
        }

        impl ComponentType for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_component_type!(TransformComponent, Transform);
impl_component_type!(LightComponent, Light);
impl_component_type!(RendererComponent, Renderer);
impl_component_type!(RigidbodyComponent, Rigidbody);

pub(crate) fn enabled_by_default() -> bool {
    true
}

/// Draws the inspector section of a component. Returns `true` when the user asked for the
/// component to be removed from its game object.
pub fn draw(ui: &mut Ui, component: ComponentMut) -> bool {
    match component {
        ComponentMut::Transform(transform) => {
            transform::draw(ui, transform);
            false
        }
        ComponentMut::Light(light) => light::draw(ui, light),
        ComponentMut::Renderer(renderer) => renderer::draw(ui, renderer),
        ComponentMut::Rigidbody(rigidbody) => rigidbody::draw(ui, rigidbody),
    }
}

fn draw_header(ui: &mut Ui, kind: ComponentKind, enabled: &mut bool, removable: bool) -> bool {
    let mut remove_requested = false;

    ui.horizontal(|ui| {
        ui.checkbox(enabled, "");
        ui.heading(kind.name());

        if removable {
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                remove_requested = ui.small_button("X").clicked();
            });
        }
    });
    ui.add_space(8.0);

    remove_requested
}
