//! Scene construction parameters.

/// Spark colors in index order: center, +X, +Y, +Z, -X, -Y, -Z
pub const SPARK_COLORS: [u32; 7] = [
    0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0x00FFFF, 0xFF00FF,
];

/// Scene geometry parameters
#[derive(Debug, Clone)]
pub struct SceneParams {
    /// Number of concentric rings
    pub tori_count: usize,

    /// Radius step between neighbouring rings, also the ring tube thickness
    pub ring_step: usize,

    /// Ring plane offset along Z (scene units, negative = behind origin)
    pub ring_z_offset: f32,

    /// Torus segments around the tube
    pub ring_radial_segments: u32,

    /// Torus segments around the ring
    pub ring_tubular_segments: u32,

    /// Spark spread; outer sparks sit at ±3x this on each axis
    pub spark_distance: f32,

    /// Spark (icosahedron) circumradius
    pub spark_radius: f32,

    /// Phong shininess of sparks
    pub spark_shininess: f32,

    /// Phong shininess of rings
    pub ring_shininess: f32,

    /// Seed for ring colors; `None` draws from the OS entropy source
    pub color_seed: Option<u64>,

    pub lights: LightRig,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            tori_count: 30,
            ring_step: 100,
            ring_z_offset: -500.0,
            ring_radial_segments: 32,
            ring_tubular_segments: 8,
            spark_distance: 100.0,
            spark_radius: 50.0,
            spark_shininess: 200.0,
            ring_shininess: 30.0,
            color_seed: None,
            lights: LightRig::default(),
        }
    }
}

impl SceneParams {
    /// Ring radii, staggered by the ring step from 1 up to `100 * tori_count`
    pub fn ring_radii(&self) -> impl Iterator<Item = usize> {
        (1..self.tori_count.saturating_mul(100)).step_by(self.ring_step.max(1))
    }

    /// Offset of the outer sparks from the center
    pub fn spark_offset(&self) -> f32 {
        3.0 * self.spark_distance
    }
}

/// Lighting rig: an ambient term plus white point lights
#[derive(Debug, Clone)]
pub struct LightRig {
    /// Ambient light color (hex RGB)
    pub ambient: u32,

    /// Point light color (hex RGB)
    pub point_color: u32,

    /// Point light intensity (multiplier on color)
    pub intensity: f32,

    /// Point light positions (scene units)
    pub positions: [[f32; 3]; 3],
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: 0x000000,
            point_color: 0xFFFFFF,
            intensity: 0.5,
            positions: [
                [-600.0, -400.0, 500.0],
                [0.0, 400.0, 500.0],
                [600.0, -400.0, 500.0],
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ring_radii() {
        let params = SceneParams::default();
        let radii: Vec<usize> = params.ring_radii().collect();

        assert_eq!(radii.len(), 30);
        assert_eq!(radii[0], 1);
        assert_eq!(radii[1], 101);
        assert_eq!(*radii.last().unwrap(), 2901);
    }

    #[test]
    fn test_ring_radii_follow_step() {
        let params = SceneParams {
            tori_count: 2,
            ring_step: 50,
            ..Default::default()
        };
        let radii: Vec<usize> = params.ring_radii().collect();

        assert_eq!(radii, vec![1, 51, 101, 151]);
    }

    #[test]
    fn test_huge_ring_count_does_not_overflow() {
        let params = SceneParams {
            tori_count: usize::MAX,
            ..Default::default()
        };
        let radii: Vec<usize> = params.ring_radii().take(3).collect();

        assert_eq!(radii, vec![1, 101, 201]);
    }
}
