use thiserror::Error;

use crate::components::ComponentKind;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("not a scene file (magic {0:?})")]
    BadMagic([u8; 4]),

    #[error("unsupported scene format version {0}")]
    UnsupportedVersion(u32),

    #[error("malformed scene file: {0}")]
    Malformed(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentError {
    #[error("game object already has a {0} component")]
    AlreadyPresent(ComponentKind),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gltf error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("mesh has no {0} attribute")]
    MissingAttribute(&'static str),

    #[error("unsupported mesh data: {0}")]
    Unsupported(String),
}
