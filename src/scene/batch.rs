use glam::{Mat4, Vec4};

use crate::rendering::{
    BufferId, GpuDevice, VertexArrayId, INSTANCE_COLORS_BINDING, MODEL_MATRICES_BINDING,
};

/// Per-instance data of every visible object sharing one geometry kind, drawn with a single
/// instanced call.
#[derive(Debug, Default)]
pub struct GeometryBatch {
    model_matrices: Vec<Mat4>,
    instance_colors: Vec<Vec4>,
    instance_count: u32,
    dirty: bool,
    matrix_buffer: Option<BufferId>,
    color_buffer: Option<BufferId>,
    // What the GPU buffers hold, used to detect frames with unchanged data.
    uploaded_matrices: Vec<Mat4>,
    uploaded_colors: Vec<Vec4>,
    uploaded: bool,
}

impl GeometryBatch {
    pub fn model_matrices(&self) -> &[Mat4] {
        &self.model_matrices
    }

    pub fn instance_colors(&self) -> &[Vec4] {
        &self.instance_colors
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_empty(&self) -> bool {
        self.instance_count == 0
    }

    pub fn matrix_buffer(&self) -> Option<BufferId> {
        self.matrix_buffer
    }

    pub fn color_buffer(&self) -> Option<BufferId> {
        self.color_buffer
    }

    pub(crate) fn has_gpu_resources(&self) -> bool {
        self.matrix_buffer.is_some() || self.color_buffer.is_some()
    }

    /// Starts a new collection pass.
    pub(crate) fn clear(&mut self) {
        self.model_matrices.clear();
        self.instance_colors.clear();
        self.instance_count = 0;
        self.dirty = true;
    }

    pub(crate) fn push(&mut self, model: Mat4, color: Vec4) {
        self.model_matrices.push(model);
        self.instance_colors.push(color);
        self.instance_count += 1;
    }

    /// Ends a collection pass. The batch stays dirty only if its arrays differ from what was
    /// last uploaded.
    pub(crate) fn finish_collection(&mut self) {
        debug_assert_eq!(self.model_matrices.len(), self.instance_colors.len());
        debug_assert_eq!(self.model_matrices.len(), self.instance_count as usize);

        self.dirty = !self.uploaded
            || self.model_matrices != self.uploaded_matrices
            || self.instance_colors != self.uploaded_colors;
    }

    /// Uploads both arrays if the batch is dirty and not empty. Returns whether an upload
    /// happened.
    pub(crate) fn update_storage_buffers(&mut self, device: &mut dyn GpuDevice) -> bool {
        if !self.dirty || self.instance_count == 0 {
            return false;
        }

        let matrix_buffer = *self.matrix_buffer.get_or_insert_with(|| {
            log::debug!("allocating model matrix storage buffer");
            device.create_storage_buffer()
        });
        let color_buffer = *self.color_buffer.get_or_insert_with(|| {
            log::debug!("allocating instance color storage buffer");
            device.create_storage_buffer()
        });

        device.write_storage_buffer(matrix_buffer, bytemuck::cast_slice(&self.model_matrices));
        device.write_storage_buffer(color_buffer, bytemuck::cast_slice(&self.instance_colors));

        self.uploaded_matrices.clone_from(&self.model_matrices);
        self.uploaded_colors.clone_from(&self.instance_colors);
        self.uploaded = true;
        self.dirty = false;

        true
    }

    pub(crate) fn draw(&self, device: &mut dyn GpuDevice, base_geometry: &BaseGeometry) {
        let (Some(matrix_buffer), Some(color_buffer)) = (self.matrix_buffer, self.color_buffer)
        else {
            return;
        };

        if self.instance_count == 0 {
            return;
        }

        device.bind_storage_buffer(MODEL_MATRICES_BINDING, matrix_buffer);
        device.bind_storage_buffer(INSTANCE_COLORS_BINDING, color_buffer);

        if base_geometry.index_count > 0 {
            device.draw_elements_instanced(
                base_geometry.vertex_array,
                base_geometry.index_count,
                self.instance_count,
            );
        } else {
            device.draw_arrays_instanced(
                base_geometry.vertex_array,
                base_geometry.vertex_count,
                self.instance_count,
            );
        }
    }

    /// Frees both storage buffers. Safe to call repeatedly.
    pub(crate) fn release(&mut self, device: &mut dyn GpuDevice) {
        if let Some(buffer) = self.matrix_buffer.take() {
            device.delete_buffer(buffer);
        }

        if let Some(buffer) = self.color_buffer.take() {
            device.delete_buffer(buffer);
        }

        self.uploaded_matrices.clear();
        self.uploaded_colors.clear();
        self.uploaded = false;
        self.dirty = true;
    }
}

/// Static shared vertex data of one geometry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseGeometry {
    pub vertex_array: VertexArrayId,
    pub vertex_count: u32,
    /// Zero when the geometry is drawn without an index buffer.
    pub index_count: u32,
}
