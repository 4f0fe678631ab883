//! Perspective camera looking down the -Z axis.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Perspective camera with a fixed position and view direction
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    /// Create a camera for a viewport of the given size
    pub fn new(config: &RenderConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            fov_degrees: config.fov_degrees,
            aspect: config.aspect_ratio(),
            near: config.near_plane,
            far: config.far_plane,
            position: Vec3::new(0.0, 0.0, config.camera_distance),
            projection: Mat4::IDENTITY,
        };
        camera.resize(width, height);
        camera.update_projection();
        camera
    }

    /// Match the viewport size, recomputing aspect and projection
    ///
    /// Zero-sized viewports (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.update_projection();
    }

    pub fn update_projection(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        // Always keep Y as up vector (camera never rolls)
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_sets_exact_aspect() {
        let config = RenderConfig::default();
        let mut camera = PerspectiveCamera::new(&config, 1280, 720);

        camera.resize(1000, 300);
        assert_eq!(camera.aspect, 1000.0 / 300.0);

        camera.resize(333, 777);
        assert_eq!(camera.aspect, 333.0 / 777.0);
    }

    #[test]
    fn test_resize_updates_projection() {
        let config = RenderConfig::default();
        let mut camera = PerspectiveCamera::new(&config, 800, 800);
        let square = camera.projection();

        camera.resize(1600, 800);
        let wide = camera.projection();

        assert_ne!(square, wide);
        // Horizontal scale halves when the viewport doubles in width
        assert!((wide.x_axis.x - square.x_axis.x / 2.0).abs() < 1e-6);
        assert_eq!(wide.y_axis.y, square.y_axis.y);
    }

    #[test]
    fn test_zero_size_is_ignored() {
        let config = RenderConfig::default();
        let mut camera = PerspectiveCamera::new(&config, 1280, 720);

        camera.resize(0, 720);
        camera.resize(1280, 0);

        assert_eq!(camera.aspect, 1280.0 / 720.0);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let config = RenderConfig::default();
        let camera = PerspectiveCamera::new(&config, 1280, 720);

        let clip = camera.view_proj() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
