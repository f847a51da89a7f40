use egui::{ClippedPrimitive, TexturesDelta};
use egui_wgpu::renderer::ScreenDescriptor;
use egui_winit::EventResponse;
use winit::{event::WindowEvent, window::Window};

use crate::rendering::renderer::{Frame, Renderer};

/// egui context plus its winit input state and wgpu painter.
pub struct Egui {
    pub context: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    clipped_primitives: Vec<ClippedPrimitive>,
    textures_delta: TexturesDelta,
    screen_descriptor: ScreenDescriptor,
}

impl Egui {
    pub fn new(renderer: &Renderer) -> Self {
        Self {
            context: egui::Context::default(),
            state: egui_winit::State::new(&renderer.window),
            renderer: egui_wgpu::Renderer::new(&renderer.gpu.device, renderer.surface_format, None, 1),
            clipped_primitives: vec![],
            textures_delta: TexturesDelta::default(),
            screen_descriptor: ScreenDescriptor {
                size_in_pixels: [
                    renderer.window.inner_size().width,
                    renderer.window.inner_size().height,
                ],
                pixels_per_point: renderer.window.scale_factor() as f32,
            },
        }
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        self.state.on_event(&self.context, event)
    }

    pub fn wants_keyboard_input(&self) -> bool {
        self.context.wants_keyboard_input()
    }

    /// Runs one egui frame and tessellates its output for [`Egui::render`].
    pub fn run<F>(&mut self, window: &Window, run_ui: F)
    where
        F: FnOnce(&egui::Context),
    {
        puffin_egui::puffin::profile_function!();

        let raw_input = self.state.take_egui_input(window);
        let full_output = self.context.run(raw_input, run_ui);

        self.state
            .handle_platform_output(window, &self.context, full_output.platform_output);

        self.clipped_primitives = self.context.tessellate(full_output.shapes);
        self.textures_delta.append(full_output.textures_delta);
        self.screen_descriptor = ScreenDescriptor {
            size_in_pixels: [window.inner_size().width, window.inner_size().height],
            pixels_per_point: window.scale_factor() as f32,
        };
    }

    /// Paints the last tessellated frame on top of the color target.
    pub fn render(&mut self, frame: &mut Frame) {
        puffin_egui::puffin::profile_function!();

        for (id, image_delta) in &self.textures_delta.set {
            self.renderer
                .update_texture(&frame.gpu.device, &frame.gpu.queue, *id, image_delta);
        }
        self.textures_delta.set.clear();

        self.renderer.update_buffers(
            &frame.gpu.device,
            &frame.gpu.queue,
            frame.encoder,
            &self.clipped_primitives,
            &self.screen_descriptor,
        );

        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });

        self.renderer.render(
            &mut render_pass,
            &self.clipped_primitives,
            &self.screen_descriptor,
        );
    }

    /// Frees textures egui released this frame. Call after the frame was submitted.
    pub fn free_textures(&mut self) {
        for id in self.textures_delta.free.drain(..) {
            self.renderer.free_texture(&id);
        }
    }
}
