//! Frequency analyser configuration.

/// Invalid analyser configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("FFT size must be a power of 2 between 32 and 32768, got {0}")]
    FftSize(usize),

    #[error("smoothing time constant must be within [0, 1], got {0}")]
    Smoothing(f32),

    #[error("min decibels ({min}) must be below max decibels ({max})")]
    DecibelRange { min: f32, max: f32 },
}

/// Analyser configuration, mirroring the knobs of a WebAudio `AnalyserNode`
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// FFT window size in samples (power of 2)
    /// 32 gives 16 frequency bins, enough for seven sparks
    pub fft_size: usize,

    /// Temporal smoothing between consecutive frames, 0 = none, 1 = frozen
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte value 0 (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to byte value 255 (dBFS)
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 32,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins produced per analysis (half the FFT size)
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(ConfigError::FftSize(self.fft_size));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(ConfigError::Smoothing(self.smoothing_time_constant));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(ConfigError::DecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }
}
