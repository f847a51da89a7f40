//! GPU-facing seams of the editor.
//!
//! The scene never talks to a graphics API directly. It drives a [`GpuDevice`] (buffers,
//! vertex arrays, instanced draws) and a [`ShaderProgram`] (uniforms set by name), so the
//! batching logic runs the same against [`wgpu_device::WgpuDevice`] in the editor and
//! [`recording::RecordingDevice`] in tests.

use glam::{Mat4, Vec2, Vec3, Vec4};

pub mod camera;
pub mod recording;
pub mod renderer;
pub mod shader;
pub mod wgpu_device;

/// Storage-buffer slot the per-instance model matrices are bound to.
pub const MODEL_MATRICES_BINDING: u32 = 0;
/// Storage-buffer slot the per-instance colors are bound to.
pub const INSTANCE_COLORS_BINDING: u32 = 1;

/// Floats per vertex in base geometry: position xyz followed by normal xyz.
pub const VERTEX_STRIDE_FLOATS: usize = 6;

pub const DEPTH_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexArrayId(pub u32);

pub trait GpuDevice {
    /// Uploads static interleaved position + normal data, plus optional indices.
    fn create_vertex_array(&mut self, vertices: &[f32], indices: Option<&[u32]>) -> VertexArrayId;

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);

    fn create_storage_buffer(&mut self) -> BufferId;

    /// Replaces the whole content of a storage buffer.
    fn write_storage_buffer(&mut self, buffer: BufferId, data: &[u8]);

    fn delete_buffer(&mut self, buffer: BufferId);

    fn bind_storage_buffer(&mut self, binding: u32, buffer: BufferId);

    fn set_viewport(&mut self, width: u32, height: u32);

    fn draw_arrays_instanced(
        &mut self,
        vertex_array: VertexArrayId,
        vertex_count: u32,
        instance_count: u32,
    );

    fn draw_elements_instanced(
        &mut self,
        vertex_array: VertexArrayId,
        index_count: u32,
        instance_count: u32,
    );
}

/// Uniform access by name on a ready-to-use shader program.
pub trait ShaderProgram {
    fn use_program(&mut self);

    fn set_mat4(&mut self, name: &str, value: Mat4);

    fn set_vec2(&mut self, name: &str, value: Vec2);

    fn set_vec3(&mut self, name: &str, value: Vec3);

    fn set_vec4(&mut self, name: &str, value: Vec4);

    fn set_float(&mut self, name: &str, value: f32);

    fn set_int(&mut self, name: &str, value: i32);
}
