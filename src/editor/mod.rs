use std::path::{Path, PathBuf};

use egui::{Context, TopBottomPanel};
use native_dialog::FileDialog;
use winit::event::VirtualKeyCode;

use crate::{
    config::SceneConfig,
    input::InputState,
    scene::{GameObjectId, Scene},
};

pub mod debugger;
pub mod hierarchy;
pub mod inspector;

const SCENE_FILE_FILTER: (&str, &[&str]) = ("Scene", &["escn"]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    New,
    Save,
    SaveAs,
    Load,
}

/// Editor state that outlives a frame. The selection does not own the object: it is cleared
/// as soon as its id stops resolving.
#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    pub selected: Option<GameObjectId>,
    pub show_hierarchy: bool,
    pub show_inspector: bool,
    pub show_profiler: bool,
    /// File the scene was last saved to or loaded from.
    pub scene_path: Option<PathBuf>,
    pub default_path: PathBuf,
    pub status: Option<String>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(SceneConfig::default().default_path)
    }
}

impl Editor {
    pub fn new(default_path: PathBuf) -> Self {
        Self {
            selected: None,
            show_hierarchy: true,
            show_inspector: true,
            show_profiler: false,
            scene_path: None,
            default_path,
            status: None,
        }
    }

    pub fn clear_stale_selection(&mut self, scene: &Scene) {
        if self.selected.is_some_and(|id| !scene.contains(id)) {
            self.selected = None;
        }
    }

    /// Delete removes the selection, Ctrl+C copies it.
    pub fn handle_shortcuts(&mut self, scene: &mut Scene, input: &InputState, previous: &InputState) {
        self.clear_stale_selection(scene);

        let Some(selected) = self.selected else {
            return;
        };

        if input.just_pressed(previous, VirtualKeyCode::Delete) {
            scene.remove_game_object(selected);
            self.selected = None;
        } else if input.ctrl_held() && input.just_pressed(previous, VirtualKeyCode::C) {
            scene.duplicate(selected);
        }
    }

    pub fn new_scene(&mut self, scene: &mut Scene) {
        scene.reset();
        self.selected = None;
        self.scene_path = None;
        self.status = Some("New scene".to_owned());
    }

    pub fn save_scene(&mut self, scene: &Scene, path: PathBuf) {
        match scene.save(&path) {
            Ok(()) => {
                self.status = Some(format!("Saved {}", path.display()));
                self.scene_path = Some(path);
            }
            Err(error) => {
                log::error!("failed to save scene to {}: {error}", path.display());
                self.status = Some(format!("Save failed: {error}"));
            }
        }
    }

    /// On failure the scene is left as it was.
    pub fn load_scene(&mut self, scene: &mut Scene, path: PathBuf) {
        match scene.load(&path) {
            Ok(()) => {
                self.clear_stale_selection(scene);
                self.status = Some(format!("Loaded {}", path.display()));
                self.scene_path = Some(path);
            }
            Err(error) => {
                log::error!("failed to load scene from {}: {error}", path.display());
                self.status = Some(format!("Load failed: {error}"));
            }
        }
    }

    fn run_file_action(&mut self, scene: &mut Scene, action: FileAction) {
        match action {
            FileAction::New => self.new_scene(scene),
            FileAction::Save => {
                let path = self
                    .scene_path
                    .clone()
                    .unwrap_or_else(|| self.default_path.clone());
                self.save_scene(scene, path);
            }
            FileAction::SaveAs => {
                let result = self.file_dialog().show_save_single_file();
                if let Some(path) = self.dialog_result(result) {
                    self.save_scene(scene, path);
                }
            }
            FileAction::Load => {
                let result = self.file_dialog().show_open_single_file();
                if let Some(path) = self.dialog_result(result) {
                    self.load_scene(scene, path);
                }
            }
        }
    }

    fn file_dialog(&self) -> FileDialog<'_> {
        let current = self.scene_path.as_deref().unwrap_or(&self.default_path);
        let dialog = FileDialog::new().add_filter(SCENE_FILE_FILTER.0, SCENE_FILE_FILTER.1);

        match current.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            Some(parent) => dialog.set_location(parent),
            None => dialog.set_location(Path::new(".")),
        }
    }

    fn dialog_result(
        &mut self,
        result: Result<Option<PathBuf>, native_dialog::Error>,
    ) -> Option<PathBuf> {
        match result {
            Ok(path) => path,
            Err(error) => {
                log::error!("file dialog failed: {error}");
                self.status = Some(format!("File dialog failed: {error}"));
                None
            }
        }
    }
}

/// Draws every editor window for this frame and applies the edits made in them.
pub fn update(context: &Context, scene: &mut Scene, editor: &mut Editor) {
    puffin_egui::puffin::profile_function!();

    editor.clear_stale_selection(scene);

    if let Some(action) = toolbar(context, scene, editor) {
        editor.run_file_action(scene, action);
    }

    hierarchy::update(context, scene, editor);
    inspector::update(context, scene, editor);
    debugger::update(context, &mut editor.show_profiler);
}

fn toolbar(context: &Context, scene: &mut Scene, editor: &mut Editor) -> Option<FileAction> {
    let mut action = None;

    TopBottomPanel::top("toolbar").show(context, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                for (label, file_action) in [
                    ("New Scene", FileAction::New),
                    ("Save Scene", FileAction::Save),
                    ("Save Scene As...", FileAction::SaveAs),
                    ("Load Scene...", FileAction::Load),
                ] {
                    if ui.button(label).clicked() {
                        action = Some(file_action);
                        ui.close_menu();
                    }
                }
            });

            ui.menu_button("View", |ui| {
                ui.checkbox(&mut editor.show_hierarchy, "Hierarchy");
                ui.checkbox(&mut editor.show_inspector, "Inspector");
                ui.checkbox(&mut editor.show_profiler, "Profiler");
            });

            ui.separator();
            ui.label("Scene");
            ui.text_edit_singleline(&mut scene.name);

            if let Some(status) = &editor.status {
                ui.separator();
                ui.weak(status.as_str());
            }
        });
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::GeometryKind;

    fn temporary_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "scene_editor_editor_{}_{name}.escn",
            std::process::id()
        ))
    }

    fn pressed(keys: &[VirtualKeyCode]) -> InputState {
        let mut input = InputState::default();
        for key in keys {
            input.set_key(*key, true);
        }

        input
    }

    #[test]
    fn delete_removes_the_selection_once() {
        let mut scene = Scene::empty("test");
        let cube = scene.create_primitive(GeometryKind::Cube);
        let sphere = scene.create_primitive(GeometryKind::Sphere);
        let mut editor = Editor {
            selected: Some(cube),
            ..Default::default()
        };

        let input = pressed(&[VirtualKeyCode::Delete]);
        editor.handle_shortcuts(&mut scene, &input, &InputState::default());

        assert_eq!(scene.ids(), [sphere]);
        assert_eq!(editor.selected, None);

        editor.selected = Some(sphere);
        editor.handle_shortcuts(&mut scene, &input, &input);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn ctrl_c_copies_the_selection() {
        let mut scene = Scene::empty("test");
        let cube = scene.create_primitive(GeometryKind::Cube);
        let mut editor = Editor {
            selected: Some(cube),
            ..Default::default()
        };

        let only_c = pressed(&[VirtualKeyCode::C]);
        editor.handle_shortcuts(&mut scene, &only_c, &InputState::default());
        assert_eq!(scene.len(), 1);

        let ctrl_c = pressed(&[VirtualKeyCode::LControl, VirtualKeyCode::C]);
        let ctrl = pressed(&[VirtualKeyCode::LControl]);
        editor.handle_shortcuts(&mut scene, &ctrl_c, &ctrl);

        assert_eq!(scene.len(), 2);
        assert_eq!(editor.selected, Some(cube));
        assert_eq!(scene.get(scene.ids()[1]), scene.get(cube));
    }

    #[test]
    fn stale_selection_is_cleared() {
        let mut scene = Scene::empty("test");
        let cube = scene.create_primitive(GeometryKind::Cube);
        let mut editor = Editor {
            selected: Some(cube),
            ..Default::default()
        };

        scene.remove_game_object(cube);
        editor.handle_shortcuts(
            &mut scene,
            &pressed(&[VirtualKeyCode::Delete]),
            &InputState::default(),
        );

        assert_eq!(editor.selected, None);
    }

    #[test]
    fn save_then_load_tracks_path_and_retires_selection() {
        let path = temporary_path("save_load");
        let mut scene = Scene::new();
        scene.name = "Saved".to_owned();
        let mut editor = Editor {
            selected: scene.ids().first().copied(),
            ..Default::default()
        };

        editor.save_scene(&scene, path.clone());
        assert_eq!(editor.scene_path.as_deref(), Some(path.as_path()));

        scene.name = "Changed".to_owned();
        editor.load_scene(&mut scene, path.clone());
        std::fs::remove_file(&path).ok();

        assert_eq!(scene.name, "Saved");
        assert_eq!(scene.len(), 2);
        assert_eq!(editor.selected, None);
        assert!(editor.status.as_deref().is_some_and(|status| status.starts_with("Loaded")));
    }

    #[test]
    fn failed_load_keeps_scene_and_reports() {
        let mut scene = Scene::new();
        let ids = scene.ids().to_vec();
        let mut editor = Editor::default();

        editor.load_scene(&mut scene, temporary_path("does_not_exist"));

        assert_eq!(scene.ids(), ids);
        assert_eq!(editor.scene_path, None);
        assert!(editor
            .status
            .as_deref()
            .is_some_and(|status| status.starts_with("Load failed")));
    }

    #[test]
    fn new_scene_resets_content_and_path() {
        let mut scene = Scene::empty("old");
        let plane = scene.create_primitive(GeometryKind::Plane);
        let mut editor = Editor {
            selected: Some(plane),
            scene_path: Some(PathBuf::from("old.escn")),
            ..Default::default()
        };

        editor.run_file_action(&mut scene, FileAction::New);

        assert_eq!(scene.name, crate::scene::DEFAULT_SCENE_NAME);
        assert_eq!(scene.len(), 2);
        assert!(!scene.contains(plane));
        assert_eq!(editor.selected, None);
        assert_eq!(editor.scene_path, None);
    }

    #[test]
    fn save_without_path_uses_default_path() {
        let path = temporary_path("default");
        let mut scene = Scene::new();
        let mut editor = Editor::new(path.clone());

        editor.run_file_action(&mut scene, FileAction::Save);
        let saved = path.exists();
        std::fs::remove_file(&path).ok();

        assert!(saved);
        assert_eq!(editor.scene_path, Some(path));
    }

    #[test]
    fn full_frame_draws_headless() {
        let context = egui::Context::default();
        let mut scene = Scene::new();
        let mut editor = Editor {
            selected: scene.ids().last().copied(),
            ..Default::default()
        };

        for _ in 0..2 {
            let _ = context.run(egui::RawInput::default(), |context| {
                update(context, &mut scene, &mut editor);
            });
        }

        assert_eq!(scene.len(), 2);
        assert!(editor.selected.is_some());
    }
}
