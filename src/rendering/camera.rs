use glam::{Mat4, Vec3};

const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Free-flying editor camera. Yaw and pitch are in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, world_up: Vec3) -> Self {
        let forward = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);

        let mut camera = Self {
            position,
            forward,
            right: Vec3::X,
            up: Vec3::Y,
            world_up,
            yaw: forward.x.atan2(forward.z),
            pitch: forward.y.clamp(-1.0, 1.0).asin().clamp(-MAX_PITCH, MAX_PITCH),
            fov_degrees: 45.0,
            z_near: 0.1,
            z_far: 100.0,
        };
        camera.update_camera_vectors();

        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.world_up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            aspect_ratio,
            self.z_near,
            self.z_far,
        )
    }

    /// Turns the camera by the given yaw and pitch deltas in radians.
    pub fn process_mouse_movement(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw -= delta_yaw;
        self.pitch = (self.pitch - delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
        self.update_camera_vectors();
    }

    /// Moves along the camera's right, world up and forward axes.
    pub fn translate_local(&mut self, offset: Vec3) {
        self.position += self.right * offset.x + self.world_up * offset.y + self.forward * offset.z;
    }

    fn update_camera_vectors(&mut self) {
        self.forward = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.right = self.forward.cross(self.world_up).normalize();
        self.up = self.right.cross(self.forward).normalize();
    }
}
