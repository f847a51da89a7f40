use glam::{Mat4, Vec2, Vec3, Vec4};
use wgpu::util::DeviceExt;

use super::{wgpu_device::WgpuDevice, ShaderProgram, DEPTH_TEXTURE_FORMAT, VERTEX_STRIDE_FLOATS};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_position: Vec4,
    pub light_color: Vec4,
    pub light_direction: Vec4,
    /// x: light intensity, yz: viewport size.
    pub params: Vec4,
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_position: Vec4::ZERO,
            light_color: Vec4::ONE,
            light_direction: Vec4::new(0.0, -1.0, 0.0, 0.0),
            params: Vec4::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

impl Globals {
    pub fn set_mat4(&mut self, name: &str, value: Mat4) -> bool {
        match name {
            "view" => self.view = value,
            "projection" => self.projection = value,
            _ => return false,
        }

        true
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) -> bool {
        match name {
            "viewportSize" => {
                self.params.y = value.x;
                self.params.z = value.y;
            }
            _ => return false,
        }

        true
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) -> bool {
        match name {
            "viewPos" => self.view_position = value.extend(1.0),
            "lightColor" => self.light_color = value.extend(1.0),
            "lightDir" => self.light_direction = value.extend(0.0),
            _ => return false,
        }

        true
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        match name {
            "lightIntensity" => self.params.x = value,
            _ => return false,
        }

        true
    }
}

/// The instanced lit pipeline. Uniforms are staged on the CPU and uploaded once per frame.
pub struct InstancedShader {
    pipeline: wgpu::RenderPipeline,
    globals: Globals,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
}

impl InstancedShader {
    pub fn new(gpu: &WgpuDevice, surface_format: wgpu::TextureFormat) -> Self {
        let device = &gpu.device;
        let globals = Globals::default();

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instanced shader globals buffer"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("instanced shader globals bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("instanced shader globals bind group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("instanced shader pipeline layout"),
            bind_group_layouts: &[&globals_bind_group_layout, gpu.instance_bind_group_layout()],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("instanced shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../assets/shaders/instanced.wgsl").into(),
            ),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("instanced shader render pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (VERTEX_STRIDE_FLOATS * std::mem::size_of::<f32>())
                        as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_TEXTURE_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        Self {
            pipeline,
            globals,
            globals_buffer,
            globals_bind_group,
        }
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn globals_bind_group(&self) -> &wgpu::BindGroup {
        &self.globals_bind_group
    }

    pub fn upload_globals(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));
    }
}

fn unknown_uniform(name: &str) {
    log::warn!("instanced shader has no uniform named '{name}'");
}

impl ShaderProgram for InstancedShader {
    fn use_program(&mut self) {}

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        if !self.globals.set_mat4(name, value) {
            unknown_uniform(name);
        }
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        if !self.globals.set_vec2(name, value) {
            unknown_uniform(name);
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        if !self.globals.set_vec3(name, value) {
            unknown_uniform(name);
        }
    }

    fn set_vec4(&mut self, name: &str, _value: Vec4) {
        unknown_uniform(name);
    }

    fn set_float(&mut self, name: &str, value: f32) {
        if !self.globals.set_float(name, value) {
            unknown_uniform(name);
        }
    }

    fn set_int(&mut self, name: &str, _value: i32) {
        unknown_uniform(name);
    }
}
