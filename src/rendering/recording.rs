//! Headless backend that records every call made through [`GpuDevice`] and
//! [`ShaderProgram`]. Used to exercise the scene's render path without a GPU.

use std::collections::{BTreeMap, BTreeSet};

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::{BufferId, GpuDevice, ShaderProgram, VertexArrayId};

#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    CreateVertexArray {
        vertex_array: VertexArrayId,
        vertex_count: u32,
        index_count: u32,
    },
    DeleteVertexArray(VertexArrayId),
    CreateStorageBuffer(BufferId),
    WriteStorageBuffer {
        buffer: BufferId,
        data: Vec<u8>,
    },
    DeleteBuffer(BufferId),
    BindStorageBuffer {
        binding: u32,
        buffer: BufferId,
    },
    SetViewport {
        width: u32,
        height: u32,
    },
    Draw(DrawCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub vertex_array: VertexArrayId,
    pub indexed: bool,
    pub element_count: u32,
    pub instance_count: u32,
    /// Storage buffers bound at the time of the draw, by binding slot.
    pub storage_buffers: BTreeMap<u32, BufferId>,
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub commands: Vec<GpuCommand>,
    next_id: u32,
    live_vertex_arrays: BTreeSet<VertexArrayId>,
    live_buffers: BTreeSet<BufferId>,
    bound_storage_buffers: BTreeMap<u32, BufferId>,
    buffer_contents: BTreeMap<BufferId, Vec<u8>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn draw_calls(&self) -> Vec<&DrawCall> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                GpuCommand::Draw(draw_call) => Some(draw_call),
                _ => None,
            })
            .collect()
    }

    pub fn storage_writes(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, GpuCommand::WriteStorageBuffer { .. }))
            .count()
    }

    /// Last data written to a storage buffer.
    pub fn buffer_contents(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffer_contents.get(&buffer).map(Vec::as_slice)
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.live_vertex_arrays.len()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl GpuDevice for RecordingDevice {
    fn create_vertex_array(&mut self, vertices: &[f32], indices: Option<&[u32]>) -> VertexArrayId {
        let vertex_array = VertexArrayId(self.next_id());
        self.live_vertex_arrays.insert(vertex_array);

        self.commands.push(GpuCommand::CreateVertexArray {
            vertex_array,
            vertex_count: (vertices.len() / super::VERTEX_STRIDE_FLOATS) as u32,
            index_count: indices.map_or(0, |indices| indices.len() as u32),
        });

        vertex_array
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        assert!(
            self.live_vertex_arrays.remove(&vertex_array),
            "{vertex_array:?} deleted twice or never created"
        );
        self.commands.push(GpuCommand::DeleteVertexArray(vertex_array));
    }

    fn create_storage_buffer(&mut self) -> BufferId {
        let buffer = BufferId(self.next_id());
        self.live_buffers.insert(buffer);
        self.commands.push(GpuCommand::CreateStorageBuffer(buffer));

        buffer
    }

    fn write_storage_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        assert!(self.live_buffers.contains(&buffer), "write to dead {buffer:?}");

        self.buffer_contents.insert(buffer, data.to_vec());
        self.commands.push(GpuCommand::WriteStorageBuffer {
            buffer,
            data: data.to_vec(),
        });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        assert!(
            self.live_buffers.remove(&buffer),
            "{buffer:?} deleted twice or never created"
        );
        self.buffer_contents.remove(&buffer);
        self.bound_storage_buffers.retain(|_, bound| *bound != buffer);
        self.commands.push(GpuCommand::DeleteBuffer(buffer));
    }

    fn bind_storage_buffer(&mut self, binding: u32, buffer: BufferId) {
        self.bound_storage_buffers.insert(binding, buffer);
        self.commands
            .push(GpuCommand::BindStorageBuffer { binding, buffer });
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.commands.push(GpuCommand::SetViewport { width, height });
    }

    fn draw_arrays_instanced(
        &mut self,
        vertex_array: VertexArrayId,
        vertex_count: u32,
        instance_count: u32,
    ) {
        self.commands.push(GpuCommand::Draw(DrawCall {
            vertex_array,
            indexed: false,
            element_count: vertex_count,
            instance_count,
            storage_buffers: self.bound_storage_buffers.clone(),
        }));
    }

    fn draw_elements_instanced(
        &mut self,
        vertex_array: VertexArrayId,
        index_count: u32,
        instance_count: u32,
    ) {
        self.commands.push(GpuCommand::Draw(DrawCall {
            vertex_array,
            indexed: true,
            element_count: index_count,
            instance_count,
            storage_buffers: self.bound_storage_buffers.clone(),
        }));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Float(f32),
    Int(i32),
}

#[derive(Debug, Default)]
pub struct RecordingShader {
    pub uniforms: BTreeMap<String, UniformValue>,
    pub use_count: usize,
}

impl RecordingShader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }
}

impl ShaderProgram for RecordingShader {
    fn use_program(&mut self) {
        self.use_count += 1;
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.uniforms.insert(name.to_owned(), UniformValue::Mat4(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.uniforms.insert(name.to_owned(), UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.uniforms.insert(name.to_owned(), UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.uniforms.insert(name.to_owned(), UniformValue::Vec4(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms.insert(name.to_owned(), UniformValue::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.uniforms.insert(name.to_owned(), UniformValue::Int(value));
    }
}
