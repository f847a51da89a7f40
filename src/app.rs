use std::time::Instant;

use anyhow::Context;
use winit::{
    dpi::LogicalSize,
    event::{DeviceEvent, ElementState, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::EventLoop,
    window::{WindowBuilder, WindowId},
};

use crate::{
    config::EditorConfig,
    editor::{self, Editor},
    input::{CameraController, InputState},
    rendering::{camera::Camera, renderer::Renderer, shader::InstancedShader},
    resources::Resources,
    scene::{Scene, ViewParams},
    ui::Egui,
};

/// Owns the window, the GPU and the edited scene, and drives one editor frame at a time.
pub struct App {
    pub scene: Scene,
    pub editor: Editor,
    camera: Camera,
    controller: CameraController,
    input: InputState,
    previous_input: InputState,
    egui: Egui,
    shader: InstancedShader,
    renderer: Renderer,
    last_frame: Instant,
    exit_requested: bool,
}

impl App {
    pub fn new(event_loop: &EventLoop<()>, config: &EditorConfig) -> anyhow::Result<Self> {
        let window = WindowBuilder::new()
            .with_title(&config.window.title)
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
            .build(event_loop)
            .context("failed to create window")?;

        let mut renderer = Renderer::new(window)?;
        let egui = Egui::new(&renderer);
        let shader = InstancedShader::new(&renderer.gpu, renderer.surface_format);

        let resources = match &config.assets.models_dir {
            Some(models_dir) => Resources::load(models_dir),
            None => Resources::builtin(),
        };

        let mut scene = Scene::new();
        let mut editor = Editor::new(config.scene.default_path.clone());
        if config.scene.load_on_start {
            editor.load_scene(&mut scene, config.scene.default_path.clone());
        }
        scene.initialize_base_geometries(&mut renderer.gpu, &resources);

        Ok(Self {
            scene,
            editor,
            camera: config.camera.build_camera(),
            controller: CameraController::new(
                config.camera.move_speed,
                config.camera.mouse_sensitivity,
            ),
            input: InputState::default(),
            previous_input: InputState::default(),
            egui,
            shader,
            renderer,
            last_frame: Instant::now(),
            exit_requested: false,
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.renderer.window.id()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn request_redraw(&self) {
        self.renderer.window.request_redraw();
    }

    /// Key presses egui consumed never reach the editor; releases always do so no key stays
    /// held.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        let response = self.egui.handle_event(event);

        match event {
            WindowEvent::CloseRequested => self.exit_requested = true,
            WindowEvent::Resized(size) => self.renderer.resize(*size),
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                self.renderer.resize(**new_inner_size)
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } if response.consumed => {}
            _ => self.input.handle_window_event(event),
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        self.input.handle_device_event(event);
    }

    pub fn update(&mut self) {
        puffin_egui::puffin::GlobalProfiler::lock().new_frame();
        puffin_egui::puffin::profile_function!();

        let now = Instant::now();
        let delta_time = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self
            .input
            .just_pressed(&self.previous_input, VirtualKeyCode::Escape)
        {
            self.exit_requested = true;
        }

        self.controller.update(
            &mut self.camera,
            &self.input,
            &self.previous_input,
            delta_time,
        );

        if !self.egui.wants_keyboard_input() {
            self.editor
                .handle_shortcuts(&mut self.scene, &self.input, &self.previous_input);
        }

        let Self {
            egui,
            renderer,
            scene,
            editor,
            ..
        } = self;
        egui.run(&renderer.window, |context| {
            editor::update(context, scene, editor);
        });

        self.previous_input = self.input.next_frame();
    }

    pub fn render(&mut self) {
        puffin_egui::puffin::profile_function!();

        let size = self.renderer.size();
        let view_params = ViewParams {
            view: self.camera.view_matrix(),
            projection: self
                .camera
                .projection_matrix(size.width as f32 / size.height.max(1) as f32),
            viewer_position: self.camera.position,
            viewport: (size.width, size.height),
        };

        let Self {
            renderer,
            egui,
            shader,
            scene,
            ..
        } = self;

        let result = renderer.render(|mut frame| {
            scene.render(&mut *shader, &mut *frame.gpu, &view_params);
            frame
                .gpu
                .encode_frame(shader, frame.encoder, frame.color_view, frame.depth_view);
            egui.render(&mut frame);
        });

        match result {
            Ok(()) => self.egui.free_textures(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, exiting");
                self.exit_requested = true;
            }
            Err(error) => log::warn!("dropped frame: {error}"),
        }
    }

    /// Frees the scene's GPU resources while the device is still alive.
    pub fn shutdown(&mut self) {
        self.scene.release_gpu_resources(&mut self.renderer.gpu);
    }
}
