use egui::{Context, Ui, Window};

use crate::{
    components::GeometryKind,
    scene::{GameObjectId, Scene},
};

use super::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    Empty,
    Primitive(GeometryKind),
    Light,
}

/// Edits requested while drawing, applied once the scene is no longer borrowed by the UI.
#[derive(Debug, Default, PartialEq)]
pub struct HierarchyChanges {
    pub create: Vec<Creation>,
    pub copy: Vec<GameObjectId>,
    pub remove: Vec<GameObjectId>,
    pub move_to: Vec<(GameObjectId, usize)>,
    pub selected: Option<GameObjectId>,
}

pub fn update(context: &Context, scene: &mut Scene, editor: &mut Editor) {
    puffin_egui::puffin::profile_function!();

    let mut changes = HierarchyChanges::default();

    let window = Window::new("Hierarchy")
        .open(&mut editor.show_hierarchy)
        .default_pos([8.0, 32.0])
        .min_width(220.0)
        .show(context, |ui| {
            for (index, (id, game_object)) in scene.iter().enumerate() {
                let label = if game_object.enabled {
                    egui::RichText::new(&game_object.name)
                } else {
                    egui::RichText::new(&game_object.name).weak()
                };

                let response = ui
                    .push_id(id, |ui| ui.selectable_label(editor.selected == Some(id), label))
                    .inner;

                if response.clicked() {
                    changes.selected = Some(id);
                }

                response.context_menu(|ui| {
                    item_context_menu(ui, id, index, scene.len(), &mut changes);
                });
            }
        });

    if let Some(window) = window {
        window.response.context_menu(|ui| {
            create_context_menu(ui, &mut changes);
        });
    }

    apply(scene, editor, changes);
}

fn item_context_menu(
    ui: &mut Ui,
    id: GameObjectId,
    index: usize,
    count: usize,
    changes: &mut HierarchyChanges,
) {
    if ui.button("Copy").clicked() {
        changes.copy.push(id);
        ui.close_menu();
    }

    if ui.button("Delete").clicked() {
        changes.remove.push(id);
        ui.close_menu();
    }

    ui.separator();

    if ui.add_enabled(index > 0, egui::Button::new("Move Up")).clicked() {
        changes.move_to.push((id, index - 1));
        ui.close_menu();
    }

    if ui
        .add_enabled(index + 1 < count, egui::Button::new("Move Down"))
        .clicked()
    {
        changes.move_to.push((id, index + 1));
        ui.close_menu();
    }
}

fn create_context_menu(ui: &mut Ui, changes: &mut HierarchyChanges) {
    let mut create = |ui: &mut Ui, label: &str, creation| {
        if ui.button(label).clicked() {
            changes.create.push(creation);
            ui.close_menu();
        }
    };

    create(ui, "Create Empty", Creation::Empty);
    for geometry in GeometryKind::ALL {
        create(ui, &format!("Create {geometry}"), Creation::Primitive(geometry));
    }
    create(ui, "Create Light", Creation::Light);
}

pub fn apply(scene: &mut Scene, editor: &mut Editor, changes: HierarchyChanges) {
    if let Some(selected) = changes.selected {
        editor.selected = Some(selected);
    }

    for creation in changes.create {
        let id = match creation {
            Creation::Empty => scene.create_game_object("GameObject"),
            Creation::Primitive(geometry) => scene.create_primitive(geometry),
            Creation::Light => scene.create_light(),
        };
        editor.selected = Some(id);
    }

    for id in changes.copy {
        if scene.duplicate(id).is_none() {
            log::warn!("cannot copy {id}: it is no longer in the scene");
        }
    }

    for (id, index) in changes.move_to {
        scene.move_game_object(id, index);
    }

    for id in changes.remove {
        if scene.remove_game_object(id).is_some() && editor.selected == Some(id) {
            editor.selected = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_objects_are_appended_and_selected() {
        let mut scene = Scene::empty("test");
        let mut editor = Editor::default();

        apply(
            &mut scene,
            &mut editor,
            HierarchyChanges {
                create: vec![
                    Creation::Empty,
                    Creation::Primitive(GeometryKind::Sphere),
                    Creation::Light,
                ],
                ..Default::default()
            },
        );

        let names: Vec<_> = scene.iter().map(|(_, object)| object.name.clone()).collect();
        assert_eq!(names, ["GameObject", "Sphere", "Directional Light"]);
        assert_eq!(editor.selected, scene.ids().last().copied());
    }

    #[test]
    fn deleting_the_selection_clears_it() {
        let mut scene = Scene::empty("test");
        let cube = scene.create_primitive(GeometryKind::Cube);
        let plane = scene.create_primitive(GeometryKind::Plane);
        let mut editor = Editor {
            selected: Some(cube),
            ..Default::default()
        };

        apply(
            &mut scene,
            &mut editor,
            HierarchyChanges {
                remove: vec![plane],
                ..Default::default()
            },
        );
        assert_eq!(editor.selected, Some(cube));

        apply(
            &mut scene,
            &mut editor,
            HierarchyChanges {
                remove: vec![cube],
                ..Default::default()
            },
        );
        assert_eq!(editor.selected, None);
        assert!(scene.is_empty());
    }

    #[test]
    fn copy_appends_a_duplicate_and_keeps_selection() {
        let mut scene = Scene::empty("test");
        let cube = scene.create_primitive(GeometryKind::Cube);
        scene.create_primitive(GeometryKind::Plane);
        let mut editor = Editor {
            selected: Some(cube),
            ..Default::default()
        };

        apply(
            &mut scene,
            &mut editor,
            HierarchyChanges {
                copy: vec![cube],
                ..Default::default()
            },
        );

        assert_eq!(scene.len(), 3);
        assert_eq!(editor.selected, Some(cube));
        let copy = scene.ids()[2];
        assert_ne!(copy, cube);
        assert_eq!(scene.get(copy), scene.get(cube));
    }

    #[test]
    fn move_reorders_objects() {
        let mut scene = Scene::empty("test");
        let cube = scene.create_primitive(GeometryKind::Cube);
        let sphere = scene.create_primitive(GeometryKind::Sphere);
        let mut editor = Editor::default();

        apply(
            &mut scene,
            &mut editor,
            HierarchyChanges {
                move_to: vec![(sphere, 0)],
                ..Default::default()
            },
        );

        assert_eq!(scene.ids(), [sphere, cube]);
    }

    #[test]
    fn drawing_without_input_changes_nothing() {
        let context = Context::default();
        let mut scene = Scene::new();
        let expected: Vec<_> = scene.iter().map(|(_, object)| object.clone()).collect();
        let mut editor = Editor::default();

        let _ = context.run(egui::RawInput::default(), |context| {
            update(context, &mut scene, &mut editor);
        });

        let objects: Vec<_> = scene.iter().map(|(_, object)| object.clone()).collect();
        assert_eq!(objects, expected);
        assert_eq!(editor.selected, None);
    }
}
