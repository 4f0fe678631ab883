//! Mesh generation for rings (tori) and sparks (icosahedra).
//!
//! Both shapes are generated as indexed meshes first, then expanded into
//! flat-shaded triangle soups where every triangle carries its own face
//! normal.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::TAU;

/// Vertex data for scene meshes (position + face normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Triangle mesh in object space
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Torus lying in the XY plane, centered on the origin
///
/// `radial_segments` subdivide the tube cross-section, `tubular_segments`
/// subdivide the ring itself.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);

    let mut positions = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let ring = radius + tube * v.cos();
            positions.push(Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin()));
        }
    }

    let row = tubular + 1;
    let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    // Outward means away from the tube's center line
    flat_shaded(&positions, &indices, |p| {
        let center = Vec3::new(p.x, p.y, 0.0).normalize_or_zero() * radius;
        p - center
    })
}

/// Regular icosahedron with the given circumradius, centered on the origin
pub fn icosahedron(radius: f32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let corners = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];

    #[rustfmt::skip]
    let indices: [u32; 60] = [
        0, 11, 5,   0, 5, 1,    0, 1, 7,    0, 7, 10,   0, 10, 11,
        1, 5, 9,    5, 11, 4,   11, 10, 2,  10, 7, 6,   7, 1, 8,
        3, 9, 4,    3, 4, 2,    3, 2, 6,    3, 6, 8,    3, 8, 9,
        4, 9, 5,    2, 4, 11,   6, 2, 10,   8, 6, 7,    9, 8, 1,
    ];

    let positions: Vec<Vec3> = corners
        .iter()
        .map(|c| Vec3::from_array(*c).normalize() * radius)
        .collect();

    flat_shaded(&positions, &indices, |p| p)
}

/// Expand an indexed mesh into one vertex per triangle corner with face normals
///
/// `outward` maps a triangle centroid to a direction the normal should agree
/// with; triangles whose winding disagrees are flipped.
fn flat_shaded<F>(positions: &[Vec3], indices: &[u32], outward: F) -> MeshData
where
    F: Fn(Vec3) -> Vec3,
{
    let mut mesh = MeshData {
        vertices: Vec::with_capacity(indices.len()),
        indices: Vec::with_capacity(indices.len()),
    };

    for tri in indices.chunks_exact(3) {
        let mut a = positions[tri[0] as usize];
        let b = positions[tri[1] as usize];
        let mut c = positions[tri[2] as usize];

        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        let centroid = (a + b + c) / 3.0;
        if normal.dot(outward(centroid)) < 0.0 {
            std::mem::swap(&mut a, &mut c);
            normal = -normal;
        }

        for corner in [a, b, c] {
            mesh.indices.push(mesh.vertices.len() as u32);
            mesh.vertices.push(Vertex {
                position: corner.to_array(),
                normal: normal.to_array(),
            });
        }
    }

    mesh
}
