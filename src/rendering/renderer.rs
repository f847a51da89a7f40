use std::iter;

use anyhow::{anyhow, Context};
use winit::{dpi::PhysicalSize, window::Window};

use super::{wgpu_device::WgpuDevice, DEPTH_TEXTURE_FORMAT};

/// Window surface, depth target and the [`WgpuDevice`] the scene draws through.
pub struct Renderer {
    pub surface: wgpu::Surface,
    pub surface_format: wgpu::TextureFormat,
    pub surface_configuration: wgpu::SurfaceConfiguration,
    pub gpu: WgpuDevice,
    depth_texture_view: wgpu::TextureView,
    // Must outlive `surface`.
    pub window: Window,
}

pub struct Frame<'frame> {
    pub gpu: &'frame mut WgpuDevice,
    pub encoder: &'frame mut wgpu::CommandEncoder,
    pub color_view: &'frame wgpu::TextureView,
    pub depth_view: &'frame wgpu::TextureView,
}

impl Renderer {
    pub fn new(window: Window) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: Default::default(),
        });

        let surface = unsafe { instance.create_surface(&window) }
            .context("failed to create window surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible graphics adapter"))?;

        log::info!("using adapter {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::default(),
                label: None,
            },
            None, // Trace path
        ))
        .context("failed to request graphics device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let surface_format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("surface supports no formats"))?;

        let size = window.inner_size();
        let surface_configuration = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &surface_configuration);

        let depth_texture_view = create_depth_texture_view(&device, &surface_configuration);

        Ok(Self {
            surface,
            surface_format,
            surface_configuration,
            gpu: WgpuDevice::new(device, queue),
            depth_texture_view,
            window,
        })
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(
            self.surface_configuration.width,
            self.surface_configuration.height,
        )
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        self.surface_configuration.width = size.width;
        self.surface_configuration.height = size.height;
        self.surface
            .configure(&self.gpu.device, &self.surface_configuration);
        self.depth_texture_view =
            create_depth_texture_view(&self.gpu.device, &self.surface_configuration);
    }

    /// Acquires the next surface texture, lets `record` fill a command encoder and presents.
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render<F>(&mut self, record: F) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(Frame),
    {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.resize(self.window.inner_size());
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        let color_view = {
            puffin_egui::puffin::profile_scope!("output.texture.create_view()");
            output
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default())
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            puffin_egui::puffin::profile_scope!("render record");
            record(Frame {
                gpu: &mut self.gpu,
                encoder: &mut encoder,
                color_view: &color_view,
                depth_view: &self.depth_texture_view,
            });
        }

        {
            puffin_egui::puffin::profile_scope!("render submit");
            self.gpu.queue.submit(iter::once(encoder.finish()));
        }

        puffin_egui::puffin::profile_scope!("render present");
        output.present();

        Ok(())
    }
}

fn create_depth_texture_view(
    device: &wgpu::Device,
    surface_configuration: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth texture"),
        size: wgpu::Extent3d {
            width: surface_configuration.width,
            height: surface_configuration.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
