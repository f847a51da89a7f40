use std::collections::BTreeMap;

use wgpu::util::DeviceExt;

use super::{
    shader::InstancedShader, BufferId, GpuDevice, VertexArrayId, INSTANCE_COLORS_BINDING,
    MODEL_MATRICES_BINDING,
};

const MIN_STORAGE_BUFFER_SIZE: u64 = 256;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.2,
    b: 0.2,
    a: 1.0,
};

struct VertexArray {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
}

struct StorageBuffer {
    buffer: wgpu::Buffer,
    size: u64,
}

struct PendingDraw {
    vertex_array: VertexArrayId,
    indexed: bool,
    element_count: u32,
    instance_count: u32,
    model_matrices: BufferId,
    instance_colors: BufferId,
}

/// [`GpuDevice`] on top of wgpu. Draws are queued during [`crate::scene::Scene::render`] and
/// encoded into a render pass by [`WgpuDevice::encode_frame`].
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    instance_bind_group_layout: wgpu::BindGroupLayout,
    vertex_arrays: BTreeMap<VertexArrayId, VertexArray>,
    storage_buffers: BTreeMap<BufferId, StorageBuffer>,
    bound_storage_buffers: BTreeMap<u32, BufferId>,
    viewport: Option<(u32, u32)>,
    pending_draws: Vec<PendingDraw>,
    next_id: u32,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let storage_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let instance_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("instance data bind group layout"),
                entries: &[
                    storage_entry(MODEL_MATRICES_BINDING),
                    storage_entry(INSTANCE_COLORS_BINDING),
                ],
            });

        Self {
            device,
            queue,
            instance_bind_group_layout,
            vertex_arrays: Default::default(),
            storage_buffers: Default::default(),
            bound_storage_buffers: Default::default(),
            viewport: None,
            pending_draws: vec![],
            next_id: 0,
        }
    }

    pub fn instance_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.instance_bind_group_layout
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn create_raw_storage_buffer(&self, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance storage buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn queue_draw(&mut self, vertex_array: VertexArrayId, indexed: bool, count: u32, instances: u32) {
        let (Some(&model_matrices), Some(&instance_colors)) = (
            self.bound_storage_buffers.get(&MODEL_MATRICES_BINDING),
            self.bound_storage_buffers.get(&INSTANCE_COLORS_BINDING),
        ) else {
            log::warn!("draw of {vertex_array:?} without instance buffers bound");
            return;
        };

        self.pending_draws.push(PendingDraw {
            vertex_array,
            indexed,
            element_count: count,
            instance_count: instances,
            model_matrices,
            instance_colors,
        });
    }

    /// Records the queued draws into a render pass that clears both targets.
    pub fn encode_frame(
        &mut self,
        shader: &InstancedShader,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        puffin_egui::puffin::profile_function!();

        shader.upload_globals(&self.queue);

        let pending_draws = std::mem::take(&mut self.pending_draws);
        let bind_groups = pending_draws
            .iter()
            .map(|draw| {
                let model_matrices = self.storage_buffers.get(&draw.model_matrices)?;
                let instance_colors = self.storage_buffers.get(&draw.instance_colors)?;

                Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("instance data bind group"),
                    layout: &self.instance_bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: MODEL_MATRICES_BINDING,
                            resource: model_matrices.buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: INSTANCE_COLORS_BINDING,
                            resource: instance_colors.buffer.as_entire_binding(),
                        },
                    ],
                }))
            })
            .collect::<Vec<_>>();

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        render_pass.set_pipeline(shader.pipeline());
        render_pass.set_bind_group(0, shader.globals_bind_group(), &[]);

        if let Some((width, height)) = self.viewport {
            render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
        }

        for (draw, bind_group) in pending_draws.iter().zip(&bind_groups) {
            let (Some(bind_group), Some(vertex_array)) =
                (bind_group, self.vertex_arrays.get(&draw.vertex_array))
            else {
                continue;
            };

            render_pass.set_bind_group(1, bind_group, &[]);
            render_pass.set_vertex_buffer(0, vertex_array.vertex_buffer.slice(..));

            match (&vertex_array.index_buffer, draw.indexed) {
                (Some(index_buffer), true) => {
                    render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..draw.element_count, 0, 0..draw.instance_count);
                }
                _ => render_pass.draw(0..draw.element_count, 0..draw.instance_count),
            }
        }
    }
}

impl GpuDevice for WgpuDevice {
    fn create_vertex_array(&mut self, vertices: &[f32], indices: Option<&[u32]>) -> VertexArrayId {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("base geometry vertex buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = indices.map(|indices| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("base geometry index buffer"),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
        });

        let id = VertexArrayId(self.next_id());
        self.vertex_arrays.insert(
            id,
            VertexArray {
                vertex_buffer,
                index_buffer,
            },
        );

        id
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        if let Some(vertex_array) = self.vertex_arrays.remove(&vertex_array) {
            vertex_array.vertex_buffer.destroy();
            if let Some(index_buffer) = vertex_array.index_buffer {
                index_buffer.destroy();
            }
        }
    }

    fn create_storage_buffer(&mut self) -> BufferId {
        let buffer = self.create_raw_storage_buffer(MIN_STORAGE_BUFFER_SIZE);
        let id = BufferId(self.next_id());

        self.storage_buffers.insert(
            id,
            StorageBuffer {
                buffer,
                size: MIN_STORAGE_BUFFER_SIZE,
            },
        );

        id
    }

    fn write_storage_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        let required = data.len() as u64;

        let needs_growth = match self.storage_buffers.get(&buffer) {
            Some(storage_buffer) => storage_buffer.size < required,
            None => {
                log::error!("write to unknown storage buffer {buffer:?}");
                return;
            }
        };

        if needs_growth {
            let size = required.next_power_of_two();
            log::debug!("growing storage buffer {buffer:?} to {size} bytes");

            let grown = StorageBuffer {
                buffer: self.create_raw_storage_buffer(size),
                size,
            };

            if let Some(old) = self.storage_buffers.insert(buffer, grown) {
                old.buffer.destroy();
            }
        }

        if let Some(storage_buffer) = self.storage_buffers.get(&buffer) {
            self.queue.write_buffer(&storage_buffer.buffer, 0, data);
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(storage_buffer) = self.storage_buffers.remove(&buffer) {
            storage_buffer.buffer.destroy();
        }
        self.bound_storage_buffers.retain(|_, bound| *bound != buffer);
    }

    fn bind_storage_buffer(&mut self, binding: u32, buffer: BufferId) {
        self.bound_storage_buffers.insert(binding, buffer);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width > 0 && height > 0).then_some((width, height));
    }

    fn draw_arrays_instanced(
        &mut self,
        vertex_array: VertexArrayId,
        vertex_count: u32,
        instance_count: u32,
    ) {
        self.queue_draw(vertex_array, false, vertex_count, instance_count);
    }

    fn draw_elements_instanced(
        &mut self,
        vertex_array: VertexArrayId,
        index_count: u32,
        instance_count: u32,
    ) {
        self.queue_draw(vertex_array, true, index_count, instance_count);
    }
}
