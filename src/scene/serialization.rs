//! Binary scene files.
//!
//! ```text
//! file      := magic "ESCN" | version u32 | name | object count u32 | object*
//! object    := enabled u8 | name | component mask i32 | component count u32 | component*
//! component := type tag i32 | enabled u8 | payload length u32 | payload
//! name      := length u32 | UTF-8 bytes
//! ```
//!
//! Integers are little-endian. Payloads are the component structs encoded with bincode's
//! fixed-width little-endian layout, so their sizes match [`ComponentKind::payload_size`].
//! The payload length lets readers skip components of kinds they do not know.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;

use super::{GameObject, Scene};
use crate::{
    components::{Component, ComponentKind},
    error::SceneError,
};

pub const MAGIC: [u8; 4] = *b"ESCN";
pub const VERSION: u32 = 1;
pub const MAX_NAME_LEN: usize = 64 * 1024;

// enabled + name length + mask + component count
const MIN_OBJECT_SIZE: usize = 1 + 4 + 4 + 4;
// tag + enabled + payload length
const MIN_COMPONENT_SIZE: usize = 4 + 1 + 4;

pub(crate) fn write_to_file(scene: &Scene, path: &Path) -> Result<(), SceneError> {
    let bytes = encode(&scene.name, scene.iter().map(|(_, game_object)| game_object))?;
    let temporary_path = temporary_sibling(path);

    let result = File::create(&temporary_path)
        .and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&temporary_path, path));

    if let Err(error) = result {
        fs::remove_file(&temporary_path).ok();
        return Err(error.into());
    }

    Ok(())
}

pub(crate) fn read_from_file(path: &Path) -> Result<(String, Vec<GameObject>), SceneError> {
    let bytes = fs::read(path)?;

    decode(&bytes)
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".to_owned());

    path.with_file_name(format!(".{file_name}.tmp"))
}

pub fn encode<'a, I>(scene_name: &str, game_objects: I) -> Result<Vec<u8>, SceneError>
where
    I: IntoIterator<Item = &'a GameObject>,
{
    let game_objects = game_objects.into_iter().collect::<Vec<_>>();
    let mut bytes = vec![];

    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    write_name(&mut bytes, scene_name)?;
    write_len(&mut bytes, game_objects.len())?;

    for game_object in game_objects {
        game_object.write_to(&mut bytes)?;
    }

    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<(String, Vec<GameObject>), SceneError> {
    let mut decoder = Decoder::new(bytes);

    let magic = decoder.read_array::<4>()?;
    if magic != MAGIC {
        return Err(SceneError::BadMagic(magic));
    }

    let version = decoder.read_u32()?;
    if version != VERSION {
        return Err(SceneError::UnsupportedVersion(version));
    }

    let name = decoder.read_name()?;
    let object_count = decoder.read_count(MIN_OBJECT_SIZE)?;

    let mut game_objects = Vec::with_capacity(object_count);
    for _ in 0..object_count {
        let mut game_object = GameObject::bare("");
        game_object.read_from(&mut decoder)?;
        game_objects.push(game_object);
    }

    if decoder.remaining() > 0 {
        log::debug!("ignoring {} trailing bytes", decoder.remaining());
    }

    Ok((name, game_objects))
}

impl GameObject {
    pub fn write_to(&self, bytes: &mut Vec<u8>) -> Result<(), SceneError> {
        bytes.push(u8::from(self.enabled));
        write_name(bytes, &self.name)?;
        bytes.extend_from_slice(&self.component_mask().to_le_bytes());
        write_len(bytes, self.components().len())?;

        for component in self.components() {
            write_component(bytes, component)?;
        }

        Ok(())
    }

    /// Reads one object record, replacing this object's name, flag and every component.
    /// Nothing is modified if the record is malformed.
    pub fn read_from(&mut self, decoder: &mut Decoder) -> Result<(), SceneError> {
        let enabled = decoder.read_bool()?;
        let name = decoder.read_name()?;
        let stored_mask = decoder.read_i32()?;
        let component_count = decoder.read_count(MIN_COMPONENT_SIZE)?;

        let mut components = Vec::with_capacity(component_count);
        for _ in 0..component_count {
            if let Some(component) = read_component(decoder)? {
                components.push(component);
            }
        }

        self.replace_components(components)
            .map_err(|error| SceneError::Malformed(format!("'{name}': {error}")))?;
        self.enabled = enabled;
        self.name = name;

        if stored_mask != self.component_mask() {
            log::debug!(
                "'{}' stored mask {stored_mask:#x} differs from decoded {:#x}",
                self.name,
                self.component_mask()
            );
        }

        Ok(())
    }
}

fn write_len(bytes: &mut Vec<u8>, len: usize) -> Result<(), SceneError> {
    let len = u32::try_from(len)
        .map_err(|_| SceneError::Malformed(format!("length {len} does not fit in 32 bits")))?;
    bytes.extend_from_slice(&len.to_le_bytes());

    Ok(())
}

fn write_name(bytes: &mut Vec<u8>, name: &str) -> Result<(), SceneError> {
    if name.len() > MAX_NAME_LEN {
        return Err(SceneError::Malformed(format!(
            "name of {} bytes exceeds {MAX_NAME_LEN}",
            name.len()
        )));
    }

    write_len(bytes, name.len())?;
    bytes.extend_from_slice(name.as_bytes());

    Ok(())
}

fn write_component(bytes: &mut Vec<u8>, component: &Component) -> Result<(), SceneError> {
    let payload = match component {
        Component::Transform(transform) => bincode::serialize(transform)?,
        Component::Light(light) => bincode::serialize(light)?,
        Component::Renderer(renderer) => bincode::serialize(renderer)?,
        Component::Rigidbody(rigidbody) => bincode::serialize(rigidbody)?,
    };
    debug_assert_eq!(payload.len(), component.kind().payload_size());

    bytes.extend_from_slice(&component.tag().to_le_bytes());
    bytes.push(u8::from(component.enabled()));
    write_len(bytes, payload.len())?;
    bytes.extend_from_slice(&payload);

    Ok(())
}

/// Returns `None` for components of unknown kinds, which are skipped.
fn read_component(decoder: &mut Decoder) -> Result<Option<Component>, SceneError> {
    let tag = decoder.read_i32()?;
    let enabled = decoder.read_bool()?;
    let payload_len = decoder.read_u32()? as usize;
    let payload = decoder.read_bytes(payload_len)?;

    let Some(kind) = ComponentKind::from_tag(tag) else {
        log::warn!("skipping component with unknown tag {tag:#x} ({payload_len} bytes)");
        return Ok(None);
    };

    let Some(payload) = payload.get(..kind.payload_size()) else {
        return Err(SceneError::Malformed(format!(
            "{kind} payload of {payload_len} bytes, expected {}",
            kind.payload_size()
        )));
    };

    let mut component = match kind {
        ComponentKind::Transform => Component::Transform(decode_payload(kind, payload)?),
        ComponentKind::Light => Component::Light(decode_payload(kind, payload)?),
        ComponentKind::Renderer => Component::Renderer(decode_payload(kind, payload)?),
        ComponentKind::Rigidbody => Component::Rigidbody(decode_payload(kind, payload)?),
    };

    validate(&component)?;
    component.set_enabled(enabled);

    if let Component::Transform(transform) = &mut component {
        transform.update_transform();
    }

    Ok(Some(component))
}

fn decode_payload<T>(kind: ComponentKind, payload: &[u8]) -> Result<T, SceneError>
where
    T: DeserializeOwned,
{
    bincode::deserialize(payload)
        .map_err(|error| SceneError::Malformed(format!("{kind} payload: {error}")))
}

fn validate(component: &Component) -> Result<(), SceneError> {
    match component {
        Component::Light(light) if !(light.intensity.is_finite() && light.intensity >= 0.0) => {
            Err(SceneError::Malformed(format!(
                "light intensity {}",
                light.intensity
            )))
        }
        Component::Rigidbody(rigidbody)
            if !(rigidbody.mass.is_finite() && rigidbody.mass > 0.0) =>
        {
            Err(SceneError::Malformed(format!(
                "rigidbody mass {}",
                rigidbody.mass
            )))
        }
        _ => Ok(()),
    }
}

/// Bounds-checked little-endian reader over a scene file.
pub struct Decoder<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], SceneError> {
        if len > self.remaining() {
            return Err(SceneError::Malformed(format!(
                "unexpected end of file at byte {} (wanted {len} more)",
                self.position
            )));
        }

        let bytes = &self.bytes[self.position..self.position + len];
        self.position += len;

        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SceneError> {
        let mut array = [0; N];
        array.copy_from_slice(self.read_bytes(N)?);

        Ok(array)
    }

    fn read_u32(&mut self) -> Result<u32, SceneError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_i32(&mut self) -> Result<i32, SceneError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    fn read_bool(&mut self) -> Result<bool, SceneError> {
        match self.read_array::<1>()? {
            [0] => Ok(false),
            [1] => Ok(true),
            [value] => Err(SceneError::Malformed(format!(
                "invalid boolean {value} at byte {}",
                self.position - 1
            ))),
        }
    }

    /// Reads an element count, rejecting counts the remaining bytes cannot hold.
    fn read_count(&mut self, min_element_size: usize) -> Result<usize, SceneError> {
        let count = self.read_u32()? as usize;

        if count.saturating_mul(min_element_size) > self.remaining() {
            return Err(SceneError::Malformed(format!(
                "count {count} exceeds remaining {} bytes",
                self.remaining()
            )));
        }

        Ok(count)
    }

    fn read_name(&mut self) -> Result<String, SceneError> {
        let len = self.read_u32()? as usize;

        if len > MAX_NAME_LEN {
            return Err(SceneError::Malformed(format!(
                "name of {len} bytes exceeds {MAX_NAME_LEN}"
            )));
        }

        let bytes = self.read_bytes(len)?;

        String::from_utf8(bytes.to_vec())
            .map_err(|error| SceneError::Malformed(format!("name is not UTF-8: {error}")))
    }
}
