//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers of the visual are extracted here with:
//! - Units (scene units, seconds, radians per second, decibels)
//! - Documented ranges and meanings
//! - `Default` values matching the classic look of the visual

mod audio;
mod motion;
mod render;
mod scene;

// Re-export all types
pub use audio::{AnalyserConfig, ConfigError};
pub use motion::{DriftMode, MotionParams, RingBreathing};
pub use render::RenderConfig;
pub use scene::{LightRig, SceneParams, SPARK_COLORS};
