use std::{collections::BTreeMap, path::Path};

use crate::components::GeometryKind;

mod gltf_model;
pub mod primitives;

/// Interleaved vertex data for one geometry kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Position xyz followed by normal xyz per vertex.
    pub vertices: Vec<f32>,
    /// Empty when the mesh is drawn without an index buffer.
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / crate::rendering::VERTEX_STRIDE_FLOATS
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Supplies the base geometry of each kind to [`crate::scene::Scene::initialize_base_geometries`].
pub trait GeometrySource {
    fn mesh(&self, kind: GeometryKind) -> Option<&MeshData>;
}

#[derive(Debug, Default)]
pub struct Resources {
    meshes: BTreeMap<GeometryKind, MeshData>,
}

impl Resources {
    /// Procedural primitives for every geometry kind.
    pub fn builtin() -> Self {
        let meshes = GeometryKind::ALL
            .into_iter()
            .map(|kind| {
                let mesh = match kind {
                    GeometryKind::Cube => primitives::cube(),
                    GeometryKind::Sphere => primitives::sphere(32, 16),
                    GeometryKind::Plane => primitives::plane(),
                };

                (kind, mesh)
            })
            .collect();

        Self { meshes }
    }

    /// Reads `<kind>.gltf` for every geometry kind from `models_dir`. A kind whose file is
    /// missing or unreadable stays unavailable.
    pub fn load<P>(models_dir: &P) -> Self
    where
        P: AsRef<Path>,
    {
        let mut meshes = BTreeMap::new();

        for kind in GeometryKind::ALL {
            let path = models_dir
                .as_ref()
                .join(format!("{}.gltf", kind.name().to_lowercase()));

            match gltf_model::load(&path) {
                Ok(mesh) => {
                    log::info!(
                        "loaded {kind} model from {} ({} vertices)",
                        path.display(),
                        mesh.vertex_count()
                    );
                    meshes.insert(kind, mesh);
                }
                Err(error) => {
                    log::warn!("no {kind} model at {}: {error}", path.display());
                }
            }
        }

        Self { meshes }
    }

    pub fn insert(&mut self, kind: GeometryKind, mesh: MeshData) {
        self.meshes.insert(kind, mesh);
    }
}

impl GeometrySource for Resources {
    fn mesh(&self, kind: GeometryKind) -> Option<&MeshData> {
        self.meshes.get(&kind)
    }
}
