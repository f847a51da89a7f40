//! Procedural unit primitives centred on the origin.

use std::f32::consts::PI;

use glam::Vec3;

use super::MeshData;

fn push_vertex(vertices: &mut Vec<f32>, position: Vec3, normal: Vec3) {
    vertices.extend_from_slice(&position.to_array());
    vertices.extend_from_slice(&normal.to_array());
}

/// Unit cube with flat-shaded faces: 24 vertices, 36 indices.
pub fn cube() -> MeshData {
    let faces = [
        (Vec3::X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::Z),
        (Vec3::Z, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y),
    ];

    let mut mesh = MeshData::default();

    for (normal, up) in faces {
        let right = up.cross(normal);
        let base = mesh.vertex_count() as u32;

        for (u, v) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let position = normal * 0.5 + right * u + up * v;
            push_vertex(&mut mesh.vertices, position, normal);
        }

        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    mesh
}

/// UV sphere of radius 0.5.
pub fn sphere(sectors: u32, stacks: u32) -> MeshData {
    let mut mesh = MeshData::default();

    for stack in 0..=stacks {
        let phi = PI / 2.0 - PI * stack as f32 / stacks as f32;

        for sector in 0..=sectors {
            let theta = 2.0 * PI * sector as f32 / sectors as f32;
            let normal = Vec3::new(phi.cos() * theta.cos(), phi.sin(), -phi.cos() * theta.sin());

            push_vertex(&mut mesh.vertices, normal * 0.5, normal);
        }
    }

    for stack in 0..stacks {
        for sector in 0..sectors {
            let top = stack * (sectors + 1) + sector;
            let bottom = top + sectors + 1;

            if stack != 0 {
                mesh.indices.extend_from_slice(&[top, bottom, top + 1]);
            }

            if stack != stacks - 1 {
                mesh.indices.extend_from_slice(&[top + 1, bottom, bottom + 1]);
            }
        }
    }

    mesh
}

/// Unit plane on XZ facing +Y.
pub fn plane() -> MeshData {
    let mut mesh = MeshData::default();

    for (x, z) in [(-0.5, 0.5), (0.5, 0.5), (0.5, -0.5), (-0.5, -0.5)] {
        push_vertex(&mut mesh.vertices, Vec3::new(x, 0.0, z), Vec3::Y);
    }
    mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);

    mesh
}
