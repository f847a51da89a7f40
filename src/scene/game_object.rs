use crate::{
    components::{Component, ComponentKind, ComponentMut, ComponentType, TransformComponent},
    error::ComponentError,
};

pub const DEFAULT_GAME_OBJECT_NAME: &str = "New GameObject";

/// Named, toggleable owner of at most one component per [`ComponentKind`].
///
/// `Clone` deep-copies every component.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    pub enabled: bool,
    pub name: String,
    components: Vec<Component>,
    component_mask: i32,
}

impl GameObject {
    /// Creates a game object carrying a default transform.
    pub fn new(name: impl Into<String>) -> Self {
        let mut game_object = Self::bare(name);
        game_object
            .components
            .push(TransformComponent::default().into());
        game_object.component_mask = ComponentKind::Transform.tag();

        game_object
    }

    /// Creates a game object carrying a default transform and `component`. A transform
    /// argument takes the place of the default one.
    pub fn with_component<T>(name: impl Into<String>, component: T) -> Self
    where
        T: ComponentType,
    {
        let mut game_object = Self::new(name);
        if T::KIND == ComponentKind::Transform {
            game_object.components.clear();
            game_object.component_mask = 0;
        }

        game_object.components.push(component.into());
        game_object.component_mask |= T::KIND.tag();
        game_object.debug_assert_mask();

        game_object
    }

    /// A game object without any components.
    pub(crate) fn bare(name: impl Into<String>) -> Self {
        Self {
            enabled: true,
            name: name.into(),
            components: vec![],
            component_mask: 0,
        }
    }

    pub fn component_mask(&self) -> i32 {
        self.component_mask
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Components for in-place editing. Only their data is reachable, so neither the set of
    /// kinds nor the mask can change.
    pub fn components_mut(&mut self) -> impl Iterator<Item = ComponentMut<'_>> {
        self.components.iter_mut().map(Component::data_mut)
    }

    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.component_mask & kind.tag() != 0
    }

    pub fn add_component<T>(&mut self, component: T) -> Result<&mut T, ComponentError>
    where
        T: ComponentType,
    {
        self.insert_component(component.into())?;

        let component = self
            .components
            .last_mut()
            .and_then(T::from_component_mut)
            .expect("component was just pushed");

        Ok(component)
    }

    pub fn insert_component(&mut self, component: Component) -> Result<(), ComponentError> {
        let kind = component.kind();

        if self.has_component(kind) {
            return Err(ComponentError::AlreadyPresent(kind));
        }

        self.components.push(component);
        self.component_mask |= kind.tag();
        self.debug_assert_mask();

        Ok(())
    }

    pub fn get_component<T>(&self) -> Option<&T>
    where
        T: ComponentType,
    {
        self.components.iter().find_map(T::from_component)
    }

    pub fn get_component_mut<T>(&mut self) -> Option<&mut T>
    where
        T: ComponentType,
    {
        self.components.iter_mut().find_map(T::from_component_mut)
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components
            .iter()
            .find(|component| component.kind() == kind)
    }

    pub fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components
            .iter_mut()
            .find(|component| component.kind() == kind)
    }

    /// Releases the component of the given kind. Returns `None` if there is none.
    pub fn remove_component(&mut self, kind: ComponentKind) -> Option<Component> {
        let index = self
            .components
            .iter()
            .position(|component| component.kind() == kind)?;

        let component = self.components.remove(index);
        self.component_mask &= !kind.tag();
        self.debug_assert_mask();

        Some(component)
    }

    /// Replaces every component at once, dropping the previous ones.
    pub(crate) fn replace_components(
        &mut self,
        components: Vec<Component>,
    ) -> Result<(), ComponentError> {
        let mut component_mask = 0;

        for component in &components {
            let tag = component.tag();

            if component_mask & tag != 0 {
                return Err(ComponentError::AlreadyPresent(component.kind()));
            }

            component_mask |= tag;
        }

        self.components = components;
        self.component_mask = component_mask;

        Ok(())
    }

    fn debug_assert_mask(&self) {
        debug_assert_eq!(
            self.component_mask,
            self.components
                .iter()
                .fold(0, |mask, component| mask | component.tag()),
            "component mask out of sync for '{}'",
            self.name
        );
    }
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new(DEFAULT_GAME_OBJECT_NAME)
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;
    use crate::components::{
        GeometryKind, LightComponent, RendererComponent, RigidbodyComponent,
    };

    fn mask_of(game_object: &GameObject) -> i32 {
        game_object
            .components()
            .iter()
            .fold(0, |mask, component| mask | component.tag())
    }

    #[test]
    fn new_game_object_has_transform() {
        let game_object = GameObject::default();

        assert_eq!(game_object.name, "New GameObject");
        assert!(game_object.enabled);
        assert_eq!(game_object.components().len(), 1);
        assert!(game_object.get_component::<TransformComponent>().is_some());
        assert_eq!(game_object.component_mask(), ComponentKind::Transform.tag());
    }

    #[test]
    fn with_component_adds_to_default_transform() {
        let light = GameObject::with_component("Sun", LightComponent::default());

        assert_eq!(light.name, "Sun");
        assert_eq!(light.components().len(), 2);
        assert_eq!(
            light.component_mask(),
            ComponentKind::Transform.tag() | ComponentKind::Light.tag()
        );

        let position = Vec3::new(1.0, 2.0, 3.0);
        let moved = GameObject::with_component("Moved", TransformComponent::from_position(position));

        assert_eq!(moved.components().len(), 1);
        assert_eq!(moved.component_mask(), ComponentKind::Transform.tag());
        assert_eq!(moved.get_component::<TransformComponent>().unwrap().position, position);
    }

    #[test]
    fn editing_through_components_mut_keeps_mask() {
        let mut game_object =
            GameObject::with_component("Cube", RendererComponent::new(GeometryKind::Cube, Vec4::ONE));
        let mask = game_object.component_mask();

        for mut component in game_object.components_mut() {
            component.set_enabled(false);
            if let ComponentMut::Renderer(renderer) = component {
                renderer.geometry = GeometryKind::Plane;
            }
        }

        assert_eq!(game_object.component_mask(), mask);
        assert_eq!(mask_of(&game_object), mask);
        assert!(game_object.components().iter().all(|component| !component.enabled()));
        assert_eq!(
            game_object.get_component::<RendererComponent>().unwrap().geometry,
            GeometryKind::Plane
        );
    }

    #[test]
    fn mask_tracks_random_add_remove_sequences() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let mut game_object = GameObject::new("random");

        for _ in 0..1000 {
            let kind = ComponentKind::ALL[rng.usize(..ComponentKind::ALL.len())];

            if rng.bool() {
                let had = game_object.has_component(kind);
                let result = game_object.insert_component(Component::with_defaults(kind));

                assert_eq!(result.is_err(), had);
            } else {
                let had = game_object.has_component(kind);

                assert_eq!(game_object.remove_component(kind).is_some(), had);
            }

            assert_eq!(game_object.component_mask(), mask_of(&game_object));
        }
    }

    #[test]
    fn duplicate_component_is_rejected() {
        let mut game_object = GameObject::new("Cube");
        game_object
            .add_component(RendererComponent::default())
            .unwrap();

        let result = game_object.add_component(RendererComponent::new(
            GeometryKind::Sphere,
            Vec4::ZERO,
        ));

        assert_eq!(
            result.err(),
            Some(ComponentError::AlreadyPresent(ComponentKind::Renderer))
        );
        assert_eq!(game_object.components().len(), 2);
        assert_eq!(
            game_object
                .get_component::<RendererComponent>()
                .unwrap()
                .geometry,
            GeometryKind::Cube
        );
    }

    #[test]
    fn removing_absent_component_is_a_no_op() {
        let mut game_object = GameObject::new("Empty");

        assert!(game_object.remove_component(ComponentKind::Light).is_none());
        assert_eq!(game_object.component_mask(), ComponentKind::Transform.tag());
    }

    #[test]
    fn remove_subtracts_tag() {
        let mut game_object = GameObject::new("Sun");
        game_object.add_component(LightComponent::default()).unwrap();

        let removed = game_object.remove_component(ComponentKind::Light).unwrap();

        assert_eq!(removed.kind(), ComponentKind::Light);
        assert!(game_object.get_component::<LightComponent>().is_none());
        assert_eq!(game_object.component_mask(), ComponentKind::Transform.tag());
    }

    #[test]
    fn clone_deep_copies_every_component_in_order() {
        let mut original = GameObject::new("Original");
        original.add_component(RigidbodyComponent::default()).unwrap();
        original.add_component(LightComponent::default()).unwrap();

        let mut copy = original.clone();
        copy.get_component_mut::<TransformComponent>()
            .unwrap()
            .position = Vec3::ONE;

        let kinds = copy
            .components()
            .iter()
            .map(Component::kind)
            .collect::<Vec<_>>();

        assert_eq!(
            kinds,
            vec![
                ComponentKind::Transform,
                ComponentKind::Rigidbody,
                ComponentKind::Light
            ]
        );
        assert_eq!(copy.component_mask(), original.component_mask());
        assert_eq!(
            original
                .get_component::<TransformComponent>()
                .unwrap()
                .position,
            Vec3::ZERO
        );
    }

    #[test]
    fn replace_components_rejects_duplicates_and_keeps_old_list() {
        let mut game_object = GameObject::new("Keep");

        let result = game_object.replace_components(vec![
            Component::with_defaults(ComponentKind::Light),
            Component::with_defaults(ComponentKind::Light),
        ]);

        assert!(result.is_err());
        assert_eq!(game_object.components().len(), 1);
        assert_eq!(game_object.component_mask(), ComponentKind::Transform.tag());
    }
}
