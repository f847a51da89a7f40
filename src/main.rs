use std::path::PathBuf;

use scene_editor::{
    app::App,
    config::{EditorConfig, DEFAULT_CONFIG_PATH},
};
use winit::{
    event::Event,
    event_loop::{ControlFlow, EventLoop},
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = EditorConfig::load_or_default(&config_path);

    let event_loop = EventLoop::new();
    let mut app = App::new(&event_loop, &config)?;

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window_id() => app.handle_window_event(event),
            Event::DeviceEvent { ref event, .. } => app.handle_device_event(event),
            Event::MainEventsCleared => {
                app.update();
                app.request_redraw();
            }
            Event::RedrawRequested(window_id) if window_id == app.window_id() => app.render(),
            Event::LoopDestroyed => app.shutdown(),
            _ => {}
        }

        if app.exit_requested() {
            *control_flow = ControlFlow::Exit;
        }
    })
}
