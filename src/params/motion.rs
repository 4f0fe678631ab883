//! Per-frame motion parameters.

/// How ring breathing is applied to the ring z positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriftMode {
    /// Add the breathing wave to z every frame (rings wander over time)
    #[default]
    Cumulative,

    /// Set z to the ring's base offset plus the breathing wave
    Absolute,
}

/// When rings breathe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RingBreathing {
    /// Every frame, with or without audio
    #[default]
    Always,

    /// Only on frames where the sparks react to playing audio
    WithAudio,
}

/// Motion applied by the frame updater
#[derive(Debug, Clone)]
pub struct MotionParams {
    /// Spark group spin around X and Y (radians per second)
    pub spark_rotation: f32,

    /// Breathing wave time scale (radians per millisecond)
    pub breathing_rate: f64,

    /// Phase offset between neighbouring rings is `1 / ring_phase_divisor`
    pub ring_phase_divisor: f64,

    /// Divisor mapping summed byte amplitudes to a spark scale
    /// Two bins at 64 each give scale 1.0
    pub amplitude_divisor: f32,

    pub drift: DriftMode,
    pub breathing: RingBreathing,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            spark_rotation: 0.05,
            breathing_rate: 0.001,
            ring_phase_divisor: 16.0,
            amplitude_divisor: 128.0,
            drift: DriftMode::default(),
            breathing: RingBreathing::default(),
        }
    }
}
