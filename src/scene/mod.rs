//! Scene graph for the visual: a ring group, a spark group and lights.
//!
//! Construction is pure setup; the frame updater mutates transforms in place
//! and the renderer reads world matrices back out every frame.

mod geometry;

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::{SceneParams, SPARK_COLORS};

// Re-export public types
pub use geometry::{icosahedron, torus, MeshData, Vertex};

/// Linear RGB color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Build from a 24-bit sRGB hex value
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Position, Euler rotation (XYZ order, radians) and scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// Background torus that breathes along Z
#[derive(Clone, Debug)]
pub struct Ring {
    pub radius: f32,
    pub tube: f32,
    pub color: Color,
    pub transform: Transform,
    /// Z position the ring was built at
    pub base_z: f32,
}

/// Icosahedron whose scale follows the music
#[derive(Clone, Debug)]
pub struct Spark {
    pub color: Color,
    pub transform: Transform,
}

/// Children sharing a parent transform
#[derive(Clone, Debug)]
pub struct Group<T> {
    pub transform: Transform,
    pub children: Vec<T>,
}

impl<T> Group<T> {
    fn new(children: Vec<T>) -> Self {
        Self {
            transform: Transform::default(),
            children,
        }
    }
}

/// Point light without distance falloff
#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

/// Per-object render data derived from the scene each frame
#[derive(Clone, Copy, Debug)]
pub struct Instance {
    pub world: Mat4,
    pub color: Color,
    pub shininess: f32,
}

/// Complete scene: rings, sparks and lights
#[derive(Clone, Debug)]
pub struct Scene {
    pub rings: Group<Ring>,
    pub sparks: Group<Spark>,
    pub ambient: Color,
    pub lights: Vec<PointLight>,
    ring_shininess: f32,
    spark_shininess: f32,
}

impl Scene {
    /// Build the scene from parameters
    ///
    /// Ring colors are random; pass `color_seed` in the params for a
    /// reproducible palette.
    pub fn build(params: &SceneParams) -> Self {
        let mut rng = match params.color_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let step = params.ring_step as f32;
        let rings = params
            .ring_radii()
            .map(|radius| Ring {
                radius: radius as f32,
                tube: step,
                color: Color::from_hex(rng.random_range(0..0xFFFFFF)),
                transform: Transform::at(Vec3::new(0.0, 0.0, params.ring_z_offset)),
                base_z: params.ring_z_offset,
            })
            .collect();

        let pos = params.spark_offset();
        let neg = -pos;
        let spark_positions = [
            Vec3::ZERO,
            Vec3::new(pos, 0.0, 0.0),
            Vec3::new(0.0, pos, 0.0),
            Vec3::new(0.0, 0.0, pos),
            Vec3::new(neg, 0.0, 0.0),
            Vec3::new(0.0, neg, 0.0),
            Vec3::new(0.0, 0.0, neg),
        ];
        let sparks = SPARK_COLORS
            .iter()
            .zip(spark_positions)
            .map(|(&hex, position)| Spark {
                color: Color::from_hex(hex),
                transform: Transform::at(position),
            })
            .collect();

        let rig = &params.lights;
        let lights = rig
            .positions
            .iter()
            .map(|p| PointLight {
                position: Vec3::from_array(*p),
                color: Color::from_hex(rig.point_color),
                intensity: rig.intensity,
            })
            .collect();

        Self {
            rings: Group::new(rings),
            sparks: Group::new(sparks),
            ambient: Color::from_hex(rig.ambient),
            lights,
            ring_shininess: params.ring_shininess,
            spark_shininess: params.spark_shininess,
        }
    }

    /// World-space instances, rings first then sparks, in child order
    pub fn instances(&self) -> Vec<Instance> {
        let ring_parent = self.rings.transform.matrix();
        let spark_parent = self.sparks.transform.matrix();

        let rings = self.rings.children.iter().map(|ring| Instance {
            world: ring_parent * ring.transform.matrix(),
            color: ring.color,
            shininess: self.ring_shininess,
        });
        let sparks = self.sparks.children.iter().map(|spark| Instance {
            world: spark_parent * spark.transform.matrix(),
            color: spark.color,
            shininess: self.spark_shininess,
        });

        rings.chain(sparks).collect()
    }

    /// Current uniform scale of every spark, in index order
    pub fn spark_scales(&self) -> Vec<f32> {
        self.sparks
            .children
            .iter()
            .map(|spark| spark.transform.scale.x)
            .collect()
    }
}
