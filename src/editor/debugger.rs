use egui::{Context, Window};

/// Puffin flame graph of the last frames. Scopes are only recorded while the window is open.
pub fn update(context: &Context, open: &mut bool) {
    puffin_egui::puffin::set_scopes_on(*open);

    Window::new("Profiler")
        .open(open)
        .min_width(512.0)
        .show(context, |ui| puffin_egui::profiler_ui(ui));
}
