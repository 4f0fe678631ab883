//! Byte frequency analyser.
//!
//! Produces the same per-bin byte magnitudes a WebAudio `AnalyserNode`
//! reports from `getByteFrequencyData`: Blackman window, FFT, temporal
//! smoothing, then a linear map from a decibel range onto `0..=255`.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::TAU;
use std::sync::Arc;

use crate::params::{AnalyserConfig, ConfigError};

/// Result of one analysis pass
#[derive(Debug, Clone, Copy)]
pub struct Spectrum<'a> {
    /// Per-bin magnitudes, `fft_size / 2` entries
    pub bytes: &'a [u8],

    /// Mean of `bytes`
    pub average: f32,
}

/// Frequency analyser over the most recent window of samples
pub struct Analyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl Analyser {
    /// Create an analyser, validating the configuration first
    pub fn new(config: AnalyserConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let size = config.fft_size;
        let fft = FftPlanner::new().plan_fft_forward(size);
        let window = (0..size).map(|i| blackman_window(i, size)).collect();
        let bins = config.frequency_bin_count();

        Ok(Self {
            config,
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); size],
            smoothed: vec![0.0; bins],
            bytes: vec![0; bins],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Analyse a window of time-domain samples
    ///
    /// `samples` shorter than the FFT size are treated as zero-padded at the
    /// start; longer input uses only the most recent `fft_size` samples.
    pub fn process(&mut self, samples: &[f32]) -> Spectrum<'_> {
        let size = self.config.fft_size;
        let recent = &samples[samples.len().saturating_sub(size)..];
        let pad = size - recent.len();

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let value = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(value * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let tau = self.config.smoothing_time_constant;
        let min_db = self.config.min_decibels;
        let range_db = self.config.max_decibels - min_db;

        for (bin, (smoothed, byte)) in self
            .smoothed
            .iter_mut()
            .zip(self.bytes.iter_mut())
            .enumerate()
        {
            let magnitude = self.scratch[bin].norm() / size as f32;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;

            let db = 20.0 * smoothed.log10();
            let scaled = 255.0 / range_db * (db - min_db);
            // log10(0) is -inf, which clamps to 0
            *byte = if scaled.is_nan() {
                0
            } else {
                scaled.clamp(0.0, 255.0) as u8
            };
        }

        Spectrum {
            bytes: &self.bytes,
            average: average(&self.bytes),
        }
    }

    /// Byte magnitudes from the last call to `process`
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Arithmetic mean of byte magnitudes
pub fn average(bytes: &[u8]) -> f32 {
    if bytes.is_empty() {
        return 0.0;
    }
    bytes.iter().map(|&b| b as f32).sum::<f32>() / bytes.len() as f32
}

/// Blackman window (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (TAU * x).cos() + 0.08 * (2.0 * TAU * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(bin: usize, size: usize, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| amplitude * (TAU * bin as f32 * n as f32 / size as f32).sin())
            .collect()
    }

    #[test]
    fn test_blackman_window() {
        let size = 32;

        // Zero at the start, one at the center
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_silence_is_zero() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        let spectrum = analyser.process(&[0.0; 32]);

        assert_eq!(spectrum.bytes.len(), 16);
        assert!(spectrum.bytes.iter().all(|&b| b == 0));
        assert_eq!(spectrum.average, 0.0);
    }

    #[test]
    fn test_empty_input_is_zero() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        let spectrum = analyser.process(&[]);

        assert_eq!(spectrum.average, 0.0);
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        let spectrum = analyser.process(&tone(4, 32, 1.0, 64));

        let peak = spectrum
            .bytes
            .iter()
            .enumerate()
            .max_by_key(|&(_, b)| *b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(spectrum.bytes[4], spectrum.bytes[peak]);
        assert!(spectrum.bytes[4] > 200);
        assert!(spectrum.bytes[12] < spectrum.bytes[4]);
        assert!(spectrum.average > 0.0);
    }

    #[test]
    fn test_smoothing_rises_over_frames() {
        let config = AnalyserConfig {
            max_decibels: 0.0,
            ..Default::default()
        };
        let mut analyser = Analyser::new(config).unwrap();
        let signal = tone(4, 32, 0.5, 32);

        let first = analyser.process(&signal).bytes[4];
        let second = analyser.process(&signal).bytes[4];
        let third = analyser.process(&signal).bytes[4];

        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_no_smoothing_is_stateless() {
        let config = AnalyserConfig {
            smoothing_time_constant: 0.0,
            ..Default::default()
        };
        let mut analyser = Analyser::new(config).unwrap();
        let signal = tone(3, 32, 0.25, 32);

        let first = analyser.process(&signal).bytes.to_vec();
        let second = analyser.process(&signal).bytes.to_vec();

        assert_eq!(first, second);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[0, 10, 20]), 10.0);
    }
}
