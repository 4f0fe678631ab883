//! Rendering and camera configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (pixels)
    pub window_width: u32,

    /// Initial window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (scene units)
    pub near_plane: f32,

    /// Far clipping plane (scene units)
    /// Rings sit at z = -500 with radii up to ~3000, camera at +1000
    pub far_plane: f32,

    /// Camera distance from the origin along +Z (scene units)
    pub camera_distance: f32,

    /// Clear color (linear RGB)
    pub clear_color: [f64; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 75.0,
            near_plane: 1.0,
            far_plane: 10000.0,
            camera_distance: 1000.0,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }
}
