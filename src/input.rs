use std::collections::HashSet;

use glam::{Vec2, Vec3};
use winit::event::{DeviceEvent, ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::rendering::camera::Camera;

/// Keys held and mouse motion accumulated during one frame. Edge-triggered actions compare
/// the current state against the previous frame's snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    held_keys: HashSet<VirtualKeyCode>,
    mouse_delta: Vec2,
}

impl InputState {
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => self.set_key(*key, *state == ElementState::Pressed),
            WindowEvent::Focused(false) => self.held_keys.clear(),
            _ => {}
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (x, y) } = event {
            self.mouse_delta += Vec2::new(*x as f32, *y as f32);
        }
    }

    pub fn set_key(&mut self, key: VirtualKeyCode, pressed: bool) {
        if pressed {
            self.held_keys.insert(key);
        } else {
            self.held_keys.remove(&key);
        }
    }

    pub fn is_held(&self, key: VirtualKeyCode) -> bool {
        self.held_keys.contains(&key)
    }

    /// Held now but not in `previous`.
    pub fn just_pressed(&self, previous: &InputState, key: VirtualKeyCode) -> bool {
        self.is_held(key) && !previous.is_held(key)
    }

    pub fn ctrl_held(&self) -> bool {
        self.is_held(VirtualKeyCode::LControl) || self.is_held(VirtualKeyCode::RControl)
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Ends the frame: returns its snapshot and resets the accumulated mouse motion.
    pub fn next_frame(&mut self) -> InputState {
        let snapshot = self.clone();
        self.mouse_delta = Vec2::ZERO;

        snapshot
    }
}

/// WASD flight, Q up and E down, and Left Alt toggled mouse-look.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub mouse_look: bool,
}

impl CameraController {
    pub fn new(move_speed: f32, mouse_sensitivity: f32) -> Self {
        Self {
            move_speed,
            mouse_sensitivity,
            mouse_look: false,
        }
    }

    pub fn update(
        &mut self,
        camera: &mut Camera,
        input: &InputState,
        previous: &InputState,
        delta_time: f32,
    ) {
        if input.just_pressed(previous, VirtualKeyCode::LAlt) {
            self.mouse_look = !self.mouse_look;
        }

        if self.mouse_look {
            let delta = input.mouse_delta() * self.mouse_sensitivity;
            if delta != Vec2::ZERO {
                camera.process_mouse_movement(delta.x, delta.y);
            }
        }

        let axis = |positive, negative| {
            f32::from(u8::from(input.is_held(positive))) - f32::from(u8::from(input.is_held(negative)))
        };

        let direction = Vec3::new(
            axis(VirtualKeyCode::D, VirtualKeyCode::A),
            axis(VirtualKeyCode::Q, VirtualKeyCode::E),
            axis(VirtualKeyCode::W, VirtualKeyCode::S),
        );

        if direction != Vec3::ZERO {
            camera.translate_local(direction.normalize() * self.move_speed * delta_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn just_pressed_fires_once_per_press() {
        let mut input = InputState::default();
        input.set_key(VirtualKeyCode::Delete, true);

        let previous = InputState::default();
        assert!(input.just_pressed(&previous, VirtualKeyCode::Delete));

        let previous = input.next_frame();
        assert!(!input.just_pressed(&previous, VirtualKeyCode::Delete));

        input.set_key(VirtualKeyCode::Delete, false);
        let previous = input.next_frame();
        input.set_key(VirtualKeyCode::Delete, true);
        assert!(input.just_pressed(&previous, VirtualKeyCode::Delete));
    }

    #[test]
    fn mouse_delta_accumulates_until_next_frame() {
        let mut input = InputState::default();
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (1.0, 2.0) });
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -1.0) });

        assert_eq!(input.mouse_delta(), Vec2::new(4.0, 1.0));

        let snapshot = input.next_frame();

        assert_eq!(snapshot.mouse_delta(), Vec2::new(4.0, 1.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn left_alt_toggles_mouse_look_on_edges_only() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let mut controller = CameraController::new(1.0, 0.01);
        let mut input = InputState::default();

        input.set_key(VirtualKeyCode::LAlt, true);
        let previous = InputState::default();
        controller.update(&mut camera, &input, &previous, 0.016);
        assert!(controller.mouse_look);

        let previous = input.next_frame();
        controller.update(&mut camera, &input, &previous, 0.016);
        assert!(controller.mouse_look);
    }

    #[test]
    fn held_keys_move_camera() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let mut controller = CameraController::new(2.0, 0.01);
        let mut input = InputState::default();
        input.set_key(VirtualKeyCode::W, true);

        let previous = input.clone();
        controller.update(&mut camera, &input, &previous, 0.5);

        assert_abs_diff_eq!(camera.position, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn q_raises_and_e_lowers_camera() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let mut controller = CameraController::new(2.0, 0.01);

        let mut input = InputState::default();
        input.set_key(VirtualKeyCode::Q, true);
        controller.update(&mut camera, &input, &input.clone(), 0.5);
        assert_abs_diff_eq!(camera.position, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);

        let mut input = InputState::default();
        input.set_key(VirtualKeyCode::E, true);
        controller.update(&mut camera, &input, &input.clone(), 1.0);
        assert_abs_diff_eq!(camera.position, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn mouse_is_ignored_without_mouse_look() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let before = camera.clone();
        let mut controller = CameraController::new(1.0, 0.01);
        let mut input = InputState::default();
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (50.0, 0.0) });

        controller.update(&mut camera, &input, &InputState::default(), 0.016);

        assert_eq!(camera, before);
    }
}
