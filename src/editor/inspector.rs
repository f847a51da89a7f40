use egui::{Context, Ui, Window};

use crate::{
    components::{self, Component, ComponentKind},
    scene::{game_object::GameObject, Scene},
};

use super::Editor;

pub fn update(context: &Context, scene: &mut Scene, editor: &mut Editor) {
    puffin_egui::puffin::profile_function!();

    let selected = editor.selected.and_then(|id| scene.get_mut(id));

    Window::new("Inspector")
        .open(&mut editor.show_inspector)
        .default_pos([900.0, 32.0])
        .min_width(280.0)
        .show(context, |ui| match selected {
            Some(game_object) => draw_game_object(ui, game_object),
            None => {
                ui.weak("Nothing selected");
            }
        });
}

pub fn draw_game_object(ui: &mut Ui, game_object: &mut GameObject) {
    ui.columns(2, |columns| {
        columns[0].label("Name");
        columns[1].text_edit_singleline(&mut game_object.name);
    });
    ui.checkbox(&mut game_object.enabled, "Enabled");

    ui.separator();

    let mut removed = vec![];
    for component in game_object.components_mut() {
        let kind = component.kind();
        ui.push_id(kind.tag(), |ui| {
            if components::draw(ui, component) {
                removed.push(kind);
            }
        });

        ui.separator();
    }

    for kind in removed {
        game_object.remove_component(kind);
    }

    let missing: Vec<_> = ComponentKind::ALL
        .into_iter()
        .filter(|kind| !game_object.has_component(*kind))
        .collect();

    ui.add_enabled_ui(!missing.is_empty(), |ui| {
        ui.menu_button("Add Component", |ui| {
            for kind in missing {
                if ui.button(kind.name()).clicked() {
                    if let Err(error) = game_object.insert_component(Component::with_defaults(kind)) {
                        log::warn!("{error}");
                    }
                    ui.close_menu();
                }
            }
        });
    });
}
