use std::{fs, path::PathBuf};

use glam::{Vec3, Vec4};
use scene_editor::{
    components::{ComponentKind, GeometryKind, RendererComponent, TransformComponent},
    error::SceneError,
    scene::Scene,
};

fn temporary_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "scene_editor_persistence_{}_{name}.escn",
        std::process::id()
    ))
}

fn snapshot(scene: &Scene) -> Vec<scene_editor::scene::GameObject> {
    scene.iter().map(|(_, object)| object.clone()).collect()
}

#[test]
fn saved_scene_loads_back_identically() {
    let path = temporary_path("round_trip");
    let mut scene = Scene::new();
    scene.name = "Persisted".to_owned();

    let sphere = scene.create_primitive(GeometryKind::Sphere);
    let sphere_object = scene.get_mut(sphere).unwrap();
    sphere_object.enabled = false;
    sphere_object
        .get_component_mut::<RendererComponent>()
        .unwrap()
        .color = Vec4::new(0.2, 0.4, 0.6, 1.0);
    let transform = sphere_object
        .get_component_mut::<TransformComponent>()
        .unwrap();
    transform.position = Vec3::new(1.0, 2.0, 3.0);
    transform.update_transform();

    scene.save(&path).unwrap();

    let mut loaded = Scene::empty("other");
    loaded.load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(loaded.name, "Persisted");
    assert_eq!(snapshot(&loaded), snapshot(&scene));

    loaded.collect_render_data();
    let main_light = loaded.main_light().unwrap();
    assert!(loaded.get(main_light).unwrap().has_component(ComponentKind::Light));
}

#[test]
fn truncated_file_leaves_scene_unchanged() {
    let path = temporary_path("truncated");
    let scene = Scene::new();
    scene.save(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    let mut target = Scene::empty("untouched");
    let cube = target.create_primitive(GeometryKind::Cube);
    let before = snapshot(&target);

    let result = target.load(&path);
    fs::remove_file(&path).ok();

    assert!(result.is_err());
    assert_eq!(target.name, "untouched");
    assert_eq!(snapshot(&target), before);
    assert!(target.contains(cube));
}

#[test]
fn foreign_file_is_rejected() {
    let path = temporary_path("foreign");
    fs::write(&path, b"PNG\0 not a scene file").unwrap();

    let mut scene = Scene::new();
    let result = scene.load(&path);
    fs::remove_file(&path).ok();

    assert!(matches!(result, Err(SceneError::BadMagic(magic)) if &magic == b"PNG\0"));
    assert_eq!(scene.len(), 2);
}

#[test]
fn missing_file_reports_io_error() {
    let mut scene = Scene::new();

    assert!(matches!(
        scene.load(&temporary_path("missing")),
        Err(SceneError::Io(_))
    ));
}

#[test]
fn save_into_missing_directory_reports_io_error() {
    let directory = std::env::temp_dir().join(format!(
        "scene_editor_persistence_{}_no_such_directory",
        std::process::id()
    ));
    let path = directory.join("scene.escn");

    let result = Scene::new().save(&path);

    assert!(matches!(result, Err(SceneError::Io(_))));
    assert!(!directory.exists());
}

#[test]
fn failed_rename_leaves_target_and_no_temporary_file() {
    let target = temporary_path("directory_target");
    fs::create_dir_all(&target).unwrap();
    let marker = target.join("marker");
    fs::write(&marker, b"keep").unwrap();

    let result = Scene::new().save(&target);

    let file_name = target.file_name().unwrap().to_string_lossy().into_owned();
    let temporary = target.with_file_name(format!(".{file_name}.tmp"));
    let temporary_left = temporary.exists();
    let marker_contents = fs::read(&marker).ok();
    fs::remove_dir_all(&target).ok();
    fs::remove_file(&temporary).ok();

    assert!(matches!(result, Err(SceneError::Io(_))));
    assert!(!temporary_left);
    assert_eq!(marker_contents.as_deref(), Some(&b"keep"[..]));
}
