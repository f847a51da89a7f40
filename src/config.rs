//! Editor configuration, read from `scene_editor.toml`.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, rendering::camera::Camera};

pub const DEFAULT_CONFIG_PATH: &str = "scene_editor.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub assets: AssetsConfig,
    pub scene: SceneConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Scene Editor".to_owned(),
            width: 1200,
            height: 900,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    /// Units per second.
    pub move_speed: f32,
    /// Radians per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    pub fov_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            move_speed: 5.0,
            mouse_sensitivity: 0.003,
            fov_degrees: 45.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

impl CameraConfig {
    pub fn build_camera(&self) -> Camera {
        let mut camera = Camera::new(self.position, self.target, Vec3::Y);
        camera.fov_degrees = self.fov_degrees;
        camera.z_near = self.z_near;
        camera.z_far = self.z_far;

        camera
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory with `cube.gltf`, `sphere.gltf` and `plane.gltf`. Built-in primitives are
    /// used when unset.
    pub models_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub default_path: PathBuf,
    pub load_on_start: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_path: PathBuf::from("scene.escn"),
            load_on_start: false,
        }
    }
}

impl EditorConfig {
    pub fn load<P>(path: &P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let contents = fs::read_to_string(path)?;

        Ok(toml::from_str(&contents)?)
    }

    /// Falls back to defaults when the file is missing or invalid.
    pub fn load_or_default<P>(path: &P) -> Self
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        match Self::load(&path) {
            Ok(config) => {
                log::info!("loaded configuration from {}", path.display());
                config
            }
            Err(ConfigError::Io(error)) if error.kind() == ErrorKind::NotFound => {
                log::info!("no configuration at {}, using defaults", path.display());
                Self::default()
            }
            Err(error) => {
                log::warn!(
                    "ignoring configuration at {}: {error}",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn save<P>(&self, path: &P) -> Result<(), ConfigError>
    where
        P: AsRef<Path>,
    {
        fs::write(path, toml::to_string_pretty(self)?)?;

        Ok(())
    }
}
