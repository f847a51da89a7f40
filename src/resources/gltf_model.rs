use std::{fs, path::Path};

use ::gltf::{accessor::DataType, buffer::Source, Accessor, Gltf, Semantic};
use glam::Vec3;

use super::MeshData;
use crate::error::ResourceError;

/// Reads the first primitive of the first mesh as interleaved position + normal data.
pub fn load(path: &Path) -> Result<MeshData, ResourceError> {
    let gltf = Gltf::open(path)?;
    let buffers = read_buffers(path, &gltf)?;

    let primitive = gltf
        .meshes()
        .flat_map(|mesh| mesh.primitives())
        .next()
        .ok_or_else(|| ResourceError::Unsupported("file contains no mesh".to_owned()))?;

    let positions = primitive
        .get(&Semantic::Positions)
        .ok_or(ResourceError::MissingAttribute("position"))?;
    let positions = read_accessor::<Vec3>(&buffers, &positions)?;

    let normals = primitive
        .get(&Semantic::Normals)
        .ok_or(ResourceError::MissingAttribute("normal"))?;
    let normals = read_accessor::<Vec3>(&buffers, &normals)?;

    if positions.len() != normals.len() {
        return Err(ResourceError::Unsupported(format!(
            "{} positions but {} normals",
            positions.len(),
            normals.len()
        )));
    }

    let indices = match primitive.indices() {
        Some(accessor) => match accessor.data_type() {
            DataType::U16 => read_accessor::<u16>(&buffers, &accessor)?
                .into_iter()
                .map(u32::from)
                .collect(),
            DataType::U32 => read_accessor::<u32>(&buffers, &accessor)?,
            data_type => {
                return Err(ResourceError::Unsupported(format!(
                    "{data_type:?} indices"
                )))
            }
        },
        None => vec![],
    };

    let vertices = positions
        .iter()
        .zip(&normals)
        .flat_map(|(position, normal)| position.to_array().into_iter().chain(normal.to_array()))
        .collect();

    Ok(MeshData { vertices, indices })
}

fn read_buffers(path: &Path, gltf: &Gltf) -> Result<Vec<Vec<u8>>, ResourceError> {
    let directory = path.parent().unwrap_or_else(|| Path::new("."));

    gltf.buffers()
        .map(|buffer| match buffer.source() {
            Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| ResourceError::Unsupported("missing binary chunk".to_owned())),
            Source::Uri(uri) if uri.starts_with("data:") => Err(ResourceError::Unsupported(
                "embedded data uris".to_owned(),
            )),
            Source::Uri(uri) => Ok(fs::read(directory.join(uri))?),
        })
        .collect()
}

fn read_accessor<T>(buffers: &[Vec<u8>], accessor: &Accessor) -> Result<Vec<T>, ResourceError>
where
    T: bytemuck::Pod,
{
    let view = accessor
        .view()
        .ok_or_else(|| ResourceError::Unsupported("sparse accessor".to_owned()))?;
    let buffer = &buffers[view.buffer().index()];

    let element_size = accessor.size();
    if element_size != std::mem::size_of::<T>() {
        return Err(ResourceError::Unsupported(format!(
            "accessor element of {element_size} bytes"
        )));
    }

    let stride = view.stride().unwrap_or(element_size);
    let start = view.offset() + accessor.offset();

    (0..accessor.count())
        .map(|index| {
            let from = start + index * stride;
            buffer
                .get(from..from + element_size)
                .map(bytemuck::pod_read_unaligned::<T>)
                .ok_or_else(|| ResourceError::Unsupported("accessor out of bounds".to_owned()))
        })
        .collect()
}
