use std::{collections::BTreeMap, path::Path};

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::{
    components::{GeometryKind, LightComponent, RendererComponent, TransformComponent},
    error::SceneError,
    helpers::{Handle, Pool},
    rendering::{GpuDevice, ShaderProgram},
    resources::GeometrySource,
};

use self::batch::{BaseGeometry, GeometryBatch};
pub use self::game_object::{GameObject, DEFAULT_GAME_OBJECT_NAME};

pub mod batch;
pub mod game_object;
pub mod serialization;

pub type GameObjectId = Handle<GameObject>;

pub const DEFAULT_SCENE_NAME: &str = "Untitled";

pub const DEFAULT_LIGHT_COLOR: Vec3 = Vec3::ONE;
pub const DEFAULT_LIGHT_INTENSITY: f32 = 1.0;
pub const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::NEG_Y;

/// Per-frame inputs of [`Scene::render`] supplied by the window layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    pub view: Mat4,
    pub projection: Mat4,
    pub viewer_position: Vec3,
    pub viewport: (u32, u32),
}

#[derive(Debug)]
pub struct Scene {
    pub name: String,
    game_objects: Pool<GameObject>,
    order: Vec<GameObjectId>,
    main_light: Option<GameObjectId>,
    batches: BTreeMap<GeometryKind, GeometryBatch>,
    base_geometries: BTreeMap<GeometryKind, BaseGeometry>,
}

impl Scene {
    /// Scene with a directional light and a cube.
    pub fn new() -> Self {
        let mut scene = Self::empty(DEFAULT_SCENE_NAME);
        scene.reset();

        scene
    }

    /// Replaces the content with the default directional light and cube. GPU resources are
    /// kept.
    pub fn reset(&mut self) {
        self.replace_content(DEFAULT_SCENE_NAME.to_owned(), vec![]);

        let light = self.create_light();
        if let Some(transform) = self
            .get_mut(light)
            .and_then(|light| light.get_component_mut::<TransformComponent>())
        {
            transform.position = Vec3::new(0.0, 5.0, 0.0);
            transform.rotation = Vec3::new(-60.0, 30.0, 0.0);
            transform.update_transform();
        }

        self.create_primitive(GeometryKind::Cube);
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            game_objects: Pool::default(),
            order: vec![],
            main_light: None,
            batches: GeometryKind::ALL
                .into_iter()
                .map(|kind| (kind, GeometryBatch::default()))
                .collect(),
            base_geometries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in scene order.
    pub fn ids(&self) -> &[GameObjectId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (GameObjectId, &GameObject)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.game_objects.get(&id).map(|game_object| (id, game_object)))
    }

    pub fn contains(&self, id: GameObjectId) -> bool {
        self.game_objects.contains(&id)
    }

    pub fn get(&self, id: GameObjectId) -> Option<&GameObject> {
        self.game_objects.get(&id)
    }

    pub fn get_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        self.game_objects.get_mut(&id)
    }

    pub fn add_game_object(&mut self, game_object: GameObject) -> GameObjectId {
        let id = self.game_objects.add(game_object);
        self.order.push(id);

        id
    }

    pub fn create_game_object(&mut self, name: impl Into<String>) -> GameObjectId {
        self.add_game_object(GameObject::new(name))
    }

    pub fn create_primitive(&mut self, geometry: GeometryKind) -> GameObjectId {
        self.add_game_object(GameObject::with_component(
            geometry.name(),
            RendererComponent::new(geometry, Vec4::ONE),
        ))
    }

    pub fn create_light(&mut self) -> GameObjectId {
        self.add_game_object(GameObject::with_component(
            "Directional Light",
            LightComponent::default(),
        ))
    }

    /// Appends a deep copy of `id` to the end of the scene.
    pub fn duplicate(&mut self, id: GameObjectId) -> Option<GameObjectId> {
        let copy = self.get(id)?.clone();

        Some(self.add_game_object(copy))
    }

    /// Destroys the game object and all its components. Its id never resolves again.
    pub fn remove_game_object(&mut self, id: GameObjectId) -> Option<GameObject> {
        let game_object = self.game_objects.remove(&id)?;
        self.order.retain(|&other| other != id);

        if self.main_light == Some(id) {
            self.main_light = None;
        }

        Some(game_object)
    }

    /// Moves a game object to `index` in scene order, clamped to the last position.
    pub fn move_game_object(&mut self, id: GameObjectId, index: usize) -> bool {
        let Some(from) = self.order.iter().position(|&other| other == id) else {
            return false;
        };

        self.order.remove(from);
        let index = index.min(self.order.len());
        self.order.insert(index, id);

        true
    }

    /// The light chosen by the last render data collection.
    pub fn main_light(&self) -> Option<GameObjectId> {
        self.main_light
    }

    pub fn batch(&self, geometry: GeometryKind) -> Option<&GeometryBatch> {
        self.batches.get(&geometry)
    }

    pub fn base_geometry(&self, geometry: GeometryKind) -> Option<&BaseGeometry> {
        self.base_geometries.get(&geometry)
    }

    /// Rebuilds every geometry batch from the enabled game objects and picks the main light.
    pub fn collect_render_data(&mut self) {
        puffin_egui::puffin::profile_function!();

        for batch in self.batches.values_mut() {
            batch.clear();
        }

        self.main_light = None;

        for &id in &self.order {
            let Some(game_object) = self.game_objects.get_mut(&id) else {
                continue;
            };

            if !game_object.enabled {
                continue;
            }

            if let Some(transform) = game_object.get_component_mut::<TransformComponent>() {
                transform.update_transform();
            }

            if self.main_light.is_none()
                && game_object
                    .get_component::<LightComponent>()
                    .is_some_and(|light| light.enabled)
            {
                self.main_light = Some(id);
            }

            let (Some(transform), Some(renderer)) = (
                game_object.get_component::<TransformComponent>(),
                game_object.get_component::<RendererComponent>(),
            ) else {
                continue;
            };

            if !transform.enabled || !renderer.enabled {
                continue;
            }

            self.batches
                .entry(renderer.geometry)
                .or_default()
                .push(transform.model(), renderer.color);
        }

        for batch in self.batches.values_mut() {
            batch.finish_collection();
        }
    }

    /// Uploads the instance data of every dirty, non-empty batch. Returns how many batches
    /// were uploaded.
    pub fn update_storage_buffers(&mut self, device: &mut dyn GpuDevice) -> usize {
        puffin_egui::puffin::profile_function!();

        self.batches
            .values_mut()
            .map(|batch| batch.update_storage_buffers(device))
            .filter(|uploaded| *uploaded)
            .count()
    }

    pub fn render(
        &mut self,
        shader: &mut dyn ShaderProgram,
        device: &mut dyn GpuDevice,
        view_params: &ViewParams,
    ) {
        puffin_egui::puffin::profile_function!();

        self.collect_render_data();
        self.update_storage_buffers(device);

        let (light_color, light_direction, light_intensity) = self.light_parameters();
        let (width, height) = view_params.viewport;

        shader.use_program();
        shader.set_mat4("view", view_params.view);
        shader.set_mat4("projection", view_params.projection);
        shader.set_vec3("viewPos", view_params.viewer_position);
        shader.set_vec2("viewportSize", Vec2::new(width as f32, height as f32));
        shader.set_vec3("lightColor", light_color);
        shader.set_vec3("lightDir", light_direction);
        shader.set_float("lightIntensity", light_intensity);

        device.set_viewport(width, height);

        puffin_egui::puffin::profile_scope!("draw batches");
        for (geometry, batch) in &self.batches {
            if batch.is_empty() {
                continue;
            }

            match self.base_geometries.get(geometry) {
                Some(base_geometry) => batch.draw(device, base_geometry),
                None => log::trace!("skipping {geometry} batch without base geometry"),
            }
        }
    }

    fn light_parameters(&self) -> (Vec3, Vec3, f32) {
        let main_light = self.main_light.and_then(|id| self.get(id));

        let Some(light) = main_light.and_then(|game_object| game_object.get_component::<LightComponent>())
        else {
            return (
                DEFAULT_LIGHT_COLOR,
                DEFAULT_LIGHT_DIRECTION,
                DEFAULT_LIGHT_INTENSITY,
            );
        };

        let direction = main_light
            .and_then(|game_object| game_object.get_component::<TransformComponent>())
            .map_or(DEFAULT_LIGHT_DIRECTION, TransformComponent::forward);

        (light.color, direction, light.intensity)
    }

    /// Uploads the base geometry of every kind `source` provides. Kinds without data are left
    /// unavailable and never draw. Any previously uploaded geometry is released first.
    pub fn initialize_base_geometries(
        &mut self,
        device: &mut dyn GpuDevice,
        source: &dyn GeometrySource,
    ) {
        for (_, base_geometry) in std::mem::take(&mut self.base_geometries) {
            device.delete_vertex_array(base_geometry.vertex_array);
        }

        for geometry in GeometryKind::ALL {
            let Some(mesh) = source.mesh(geometry).filter(|mesh| !mesh.is_empty()) else {
                log::warn!("no base geometry for {geometry}, it will not be rendered");
                continue;
            };

            let indices = (!mesh.indices.is_empty()).then_some(mesh.indices.as_slice());
            let vertex_array = device.create_vertex_array(&mesh.vertices, indices);

            let base_geometry = BaseGeometry {
                vertex_array,
                vertex_count: mesh.vertex_count() as u32,
                index_count: mesh.indices.len() as u32,
            };

            log::info!(
                "uploaded {geometry} base geometry ({} vertices, {} indices)",
                base_geometry.vertex_count,
                base_geometry.index_count
            );

            self.base_geometries.insert(geometry, base_geometry);
        }
    }

    /// Frees every storage buffer and vertex array the scene holds.
    pub fn release_gpu_resources(&mut self, device: &mut dyn GpuDevice) {
        for batch in self.batches.values_mut() {
            batch.release(device);
        }

        for (_, base_geometry) in std::mem::take(&mut self.base_geometries) {
            device.delete_vertex_array(base_geometry.vertex_array);
        }
    }

    fn holds_gpu_resources(&self) -> bool {
        !self.base_geometries.is_empty()
            || self.batches.values().any(GeometryBatch::has_gpu_resources)
    }

    pub fn save<P>(&self, path: &P) -> Result<(), SceneError>
    where
        P: AsRef<Path>,
    {
        serialization::write_to_file(self, path.as_ref())?;
        log::info!(
            "saved scene '{}' ({} objects) to {}",
            self.name,
            self.len(),
            path.as_ref().display()
        );

        Ok(())
    }

    /// Replaces the scene's name and game objects with the file's content. On error the
    /// scene is left unchanged.
    pub fn load<P>(&mut self, path: &P) -> Result<(), SceneError>
    where
        P: AsRef<Path>,
    {
        let (name, game_objects) = serialization::read_from_file(path.as_ref())?;

        self.replace_content(name, game_objects);
        log::info!(
            "loaded scene '{}' ({} objects) from {}",
            self.name,
            self.len(),
            path.as_ref().display()
        );

        Ok(())
    }

    /// Swaps in new content, retiring every existing id.
    pub(crate) fn replace_content(&mut self, name: String, game_objects: Vec<GameObject>) {
        for id in std::mem::take(&mut self.order) {
            self.game_objects.remove(&id);
        }

        self.name = name;
        self.main_light = None;

        for game_object in game_objects {
            self.add_game_object(game_object);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        if self.holds_gpu_resources() {
            log::warn!(
                "scene '{}' dropped without releasing its gpu resources",
                self.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::{Component, ComponentKind},
        rendering::recording::{RecordingDevice, RecordingShader, UniformValue},
        resources::Resources,
    };
    use approx::assert_abs_diff_eq;

    fn view_params() -> ViewParams {
        ViewParams {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            viewer_position: Vec3::ZERO,
            viewport: (800, 600),
        }
    }

    fn renderable(geometry: GeometryKind, position: Vec3) -> GameObject {
        let mut game_object = GameObject::new(geometry.name());
        game_object
            .get_component_mut::<TransformComponent>()
            .unwrap()
            .position = position;
        game_object
            .add_component(RendererComponent::new(geometry, Vec4::ONE))
            .unwrap();

        game_object
    }

    fn light(name: &str) -> GameObject {
        let mut game_object = GameObject::new(name);
        game_object.add_component(LightComponent::default()).unwrap();

        game_object
    }

    #[test]
    fn new_scene_has_demo_content() {
        let scene = Scene::new();
        let names = scene
            .iter()
            .map(|(_, game_object)| game_object.name.as_str())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["Directional Light", "Cube"]);
        assert!(scene.iter().next().unwrap().1.has_component(ComponentKind::Light));
        assert!(scene.iter().nth(1).unwrap().1.has_component(ComponentKind::Renderer));
    }

    #[test]
    fn batches_count_only_fully_enabled_renderables() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut scene = Scene::empty("batches");
        let mut expected = BTreeMap::<GeometryKind, u32>::new();

        for _ in 0..200 {
            let geometry = GeometryKind::ALL[rng.usize(..GeometryKind::ALL.len())];
            let mut game_object = renderable(geometry, Vec3::splat(rng.f32()));

            game_object.enabled = rng.u8(..4) != 0;
            for mut component in game_object.components_mut() {
                component.set_enabled(rng.u8(..4) != 0);
            }
            if rng.u8(..8) == 0 {
                game_object.remove_component(ComponentKind::Transform);
            }

            let visible = game_object.enabled
                && game_object.components().len() == 2
                && game_object.components().iter().all(Component::enabled);
            if visible {
                *expected.entry(geometry).or_default() += 1;
            }

            scene.add_game_object(game_object);
        }

        scene.collect_render_data();

        for geometry in GeometryKind::ALL {
            let batch = scene.batch(geometry).unwrap();
            let count = expected.get(&geometry).copied().unwrap_or(0);

            assert_eq!(batch.instance_count(), count);
            assert_eq!(batch.model_matrices().len(), count as usize);
            assert_eq!(batch.instance_colors().len(), count as usize);
        }
    }

    #[test]
    fn batch_keeps_scene_order() {
        let mut scene = Scene::empty("order");
        scene.add_game_object(renderable(GeometryKind::Sphere, Vec3::X));
        scene.add_game_object(renderable(GeometryKind::Cube, Vec3::Z));
        scene.add_game_object(renderable(GeometryKind::Sphere, Vec3::Y));

        scene.collect_render_data();

        let spheres = scene.batch(GeometryKind::Sphere).unwrap();
        assert_eq!(
            spheres.model_matrices(),
            &[Mat4::from_translation(Vec3::X), Mat4::from_translation(Vec3::Y)]
        );
    }

    #[test]
    fn main_light_is_first_enabled_light_in_order() {
        let mut scene = Scene::empty("lights");
        let mut disabled = light("disabled");
        disabled.enabled = false;
        let mut disabled_component = light("disabled component");
        disabled_component
            .get_component_mut::<LightComponent>()
            .unwrap()
            .enabled = false;

        scene.add_game_object(disabled);
        scene.add_game_object(disabled_component);
        let unrelated = scene.add_game_object(renderable(GeometryKind::Cube, Vec3::ZERO));
        let first = scene.add_game_object(light("first"));
        scene.add_game_object(light("second"));

        scene.collect_render_data();
        assert_eq!(scene.main_light(), Some(first));

        assert!(scene.move_game_object(unrelated, 0));
        scene.collect_render_data();
        assert_eq!(scene.main_light(), Some(first));

        scene.get_mut(first).unwrap().enabled = false;
        scene.collect_render_data();
        assert_eq!(scene.get(scene.main_light().unwrap()).unwrap().name, "second");
    }

    #[test]
    fn no_main_light_without_lights() {
        let mut scene = Scene::empty("dark");
        scene.add_game_object(renderable(GeometryKind::Plane, Vec3::ZERO));

        scene.collect_render_data();

        assert_eq!(scene.main_light(), None);
    }

    #[test]
    fn second_upload_without_changes_is_skipped() {
        let mut device = RecordingDevice::new();
        let mut scene = Scene::empty("dirty");
        scene.add_game_object(renderable(GeometryKind::Cube, Vec3::ZERO));

        scene.collect_render_data();

        assert_eq!(scene.update_storage_buffers(&mut device), 1);
        assert_eq!(scene.update_storage_buffers(&mut device), 0);
        assert_eq!(device.storage_writes(), 2);

        scene.release_gpu_resources(&mut device);
    }

    #[test]
    fn moved_object_is_reuploaded() {
        let mut device = RecordingDevice::new();
        let mut scene = Scene::empty("moved");
        let cube = scene.add_game_object(renderable(GeometryKind::Cube, Vec3::ZERO));

        scene.collect_render_data();
        scene.update_storage_buffers(&mut device);

        scene.collect_render_data();
        assert_eq!(scene.update_storage_buffers(&mut device), 0);

        scene
            .get_mut(cube)
            .unwrap()
            .get_component_mut::<TransformComponent>()
            .unwrap()
            .position = Vec3::X;
        scene.collect_render_data();

        assert_eq!(scene.update_storage_buffers(&mut device), 1);
        scene.release_gpu_resources(&mut device);
    }

    #[test]
    fn render_uses_default_light_without_main_light() {
        let mut device = RecordingDevice::new();
        let mut shader = RecordingShader::new();
        let mut scene = Scene::empty("defaults");

        scene.render(&mut shader, &mut device, &view_params());

        assert_eq!(shader.uniform("lightColor"), Some(UniformValue::Vec3(Vec3::ONE)));
        assert_eq!(shader.uniform("lightDir"), Some(UniformValue::Vec3(Vec3::NEG_Y)));
        assert_eq!(shader.uniform("lightIntensity"), Some(UniformValue::Float(1.0)));
        assert_eq!(
            shader.uniform("viewportSize"),
            Some(UniformValue::Vec2(Vec2::new(800.0, 600.0)))
        );
        assert!(device.draw_calls().is_empty());
    }

    #[test]
    fn render_uses_main_light_parameters() {
        let mut device = RecordingDevice::new();
        let mut shader = RecordingShader::new();
        let mut scene = Scene::empty("lit");
        let mut sun = light("sun");
        {
            let light = sun.get_component_mut::<LightComponent>().unwrap();
            light.color = Vec3::new(1.0, 0.5, 0.25);
            light.intensity = 2.5;
        }
        sun.get_component_mut::<TransformComponent>()
            .unwrap()
            .rotation = Vec3::new(-90.0, 0.0, 0.0);
        scene.add_game_object(sun);

        scene.render(&mut shader, &mut device, &view_params());

        assert_eq!(
            shader.uniform("lightColor"),
            Some(UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.25)))
        );
        assert_eq!(shader.uniform("lightIntensity"), Some(UniformValue::Float(2.5)));

        let Some(UniformValue::Vec3(direction)) = shader.uniform("lightDir") else {
            panic!("lightDir not set");
        };
        assert_abs_diff_eq!(direction, Vec3::NEG_Y, epsilon = 1e-6);
    }

    #[test]
    fn kinds_without_base_geometry_do_not_draw() {
        let mut device = RecordingDevice::new();
        let mut shader = RecordingShader::new();
        let mut resources = Resources::builtin();
        resources.insert(GeometryKind::Sphere, Default::default());

        let mut scene = Scene::empty("partial");
        scene.initialize_base_geometries(&mut device, &resources);
        scene.add_game_object(renderable(GeometryKind::Sphere, Vec3::ZERO));
        scene.add_game_object(renderable(GeometryKind::Plane, Vec3::ZERO));

        scene.render(&mut shader, &mut device, &view_params());

        let draws = device.draw_calls();
        assert_eq!(draws.len(), 1);
        assert_eq!(
            draws[0].vertex_array,
            scene.base_geometry(GeometryKind::Plane).unwrap().vertex_array
        );
        assert!(scene.base_geometry(GeometryKind::Sphere).is_none());

        scene.release_gpu_resources(&mut device);
    }

    #[test]
    fn reinitializing_base_geometry_releases_previous_upload() {
        let mut device = RecordingDevice::new();
        let mut scene = Scene::empty("reinit");
        let resources = Resources::builtin();

        scene.initialize_base_geometries(&mut device, &resources);
        scene.initialize_base_geometries(&mut device, &resources);

        assert_eq!(device.live_vertex_arrays(), GeometryKind::ALL.len());

        scene.release_gpu_resources(&mut device);
        assert_eq!(device.live_vertex_arrays(), 0);
    }

    #[test]
    fn release_frees_everything_exactly_once() {
        let mut device = RecordingDevice::new();
        let mut shader = RecordingShader::new();
        let mut scene = Scene::new();

        scene.initialize_base_geometries(&mut device, &Resources::builtin());
        scene.render(&mut shader, &mut device, &view_params());

        scene.release_gpu_resources(&mut device);
        scene.release_gpu_resources(&mut device);

        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
        assert!(!scene.holds_gpu_resources());
    }

    #[test]
    fn removed_ids_never_resolve_again() {
        let mut scene = Scene::empty("ids");
        let removed = scene.create_game_object("removed");

        assert!(scene.remove_game_object(removed).is_some());
        let reused = scene.create_game_object("reused");

        assert!(scene.get(removed).is_none());
        assert!(scene.remove_game_object(removed).is_none());
        assert_eq!(scene.get(reused).unwrap().name, "reused");
        assert_eq!(scene.ids(), &[reused]);
    }

    #[test]
    fn duplicate_appends_deep_copy() {
        let mut scene = Scene::empty("copy");
        let cube = scene.create_primitive(GeometryKind::Cube);
        scene.create_light();

        let copy = scene.duplicate(cube).unwrap();
        scene
            .get_mut(copy)
            .unwrap()
            .get_component_mut::<RendererComponent>()
            .unwrap()
            .color = Vec4::ZERO;

        assert_eq!(scene.ids().last(), Some(&copy));
        assert_eq!(
            scene
                .get(cube)
                .unwrap()
                .get_component::<RendererComponent>()
                .unwrap()
                .color,
            Vec4::ONE
        );
    }

    #[test]
    fn move_clamps_to_end() {
        let mut scene = Scene::empty("move");
        let a = scene.create_game_object("a");
        let b = scene.create_game_object("b");
        let c = scene.create_game_object("c");

        assert!(scene.move_game_object(a, 10));
        assert_eq!(scene.ids(), &[b, c, a]);

        assert!(scene.move_game_object(c, 0));
        assert_eq!(scene.ids(), &[c, b, a]);
    }

    #[test]
    fn replacing_content_retires_old_ids() {
        let mut scene = Scene::new();
        let old_ids = scene.ids().to_vec();

        scene.replace_content("replaced".to_owned(), vec![GameObject::new("only")]);

        assert_eq!(scene.name, "replaced");
        assert_eq!(scene.len(), 1);
        assert!(old_ids.iter().all(|&id| scene.get(id).is_none()));
    }
}
