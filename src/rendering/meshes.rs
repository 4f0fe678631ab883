//! GPU-side data layout: packed scene geometry, instances and uniforms.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::ops::Range;

use crate::params::SceneParams;
use crate::scene::{icosahedron, torus, Instance, Scene, Vertex};

/// Number of point lights the shader evaluates
pub const MAX_LIGHTS: usize = 3;

/// Point light as laid out in the uniform buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 4],
    /// Color premultiplied by intensity
    pub color: [f32; 4],
}

/// Uniform buffer for the scene shader (camera + lighting)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// Ambient color in xyz, active light count in w
    pub ambient: [f32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl Uniforms {
    pub fn new(view_proj: Mat4, camera_position: Vec3, scene: &Scene) -> Self {
        let mut lights = [LightUniform::zeroed(); MAX_LIGHTS];
        let count = scene.lights.len().min(MAX_LIGHTS);
        for (slot, light) in lights.iter_mut().zip(&scene.lights) {
            let color = light.color.scaled(light.intensity);
            *slot = LightUniform {
                position: light.position.extend(1.0).to_array(),
                color: [color.r, color.g, color.b, 1.0],
            };
        }

        let ambient = scene.ambient;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_position: camera_position.extend(1.0).to_array(),
            ambient: [ambient.r, ambient.g, ambient.b, count as f32],
            lights,
        }
    }
}

/// Per-instance data (world matrix + color, shininess in color.w)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl From<&Instance> for InstanceRaw {
    fn from(instance: &Instance) -> Self {
        let c = instance.color;
        Self {
            model: instance.world.to_cols_array_2d(),
            color: [c.r, c.g, c.b, instance.shininess],
        }
    }
}

impl InstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

pub fn vertex_desc() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// One draw call: a slice of the shared index buffer for one instance
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRange {
    pub indices: Range<u32>,
    pub base_vertex: i32,
    pub instance: u32,
}

/// All scene geometry packed into one vertex and one index buffer
///
/// Draw ranges follow the order of `Scene::instances`: rings, then sparks.
/// Sparks share a single icosahedron.
pub struct SceneMeshes {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub draws: Vec<DrawRange>,
}

impl SceneMeshes {
    pub fn build(scene: &Scene, params: &SceneParams) -> Self {
        let mut meshes = Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            draws: Vec::new(),
        };
        let mut instance = 0;

        for ring in &scene.rings.children {
            let mesh = torus(
                ring.radius,
                ring.tube,
                params.ring_radial_segments,
                params.ring_tubular_segments,
            );
            let (indices, base_vertex) = meshes.append(&mesh.vertices, &mesh.indices);
            meshes.draws.push(DrawRange {
                indices,
                base_vertex,
                instance,
            });
            instance += 1;
        }

        let spark = icosahedron(params.spark_radius);
        let (indices, base_vertex) = meshes.append(&spark.vertices, &spark.indices);
        for _ in &scene.sparks.children {
            meshes.draws.push(DrawRange {
                indices: indices.clone(),
                base_vertex,
                instance,
            });
            instance += 1;
        }

        meshes
    }

    pub fn instance_count(&self) -> usize {
        self.draws.len()
    }

    fn append(&mut self, vertices: &[Vertex], indices: &[u32]) -> (Range<u32>, i32) {
        let base_vertex = self.vertices.len() as i32;
        let start = self.indices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(indices);
        (start..self.indices.len() as u32, base_vertex)
    }
}
