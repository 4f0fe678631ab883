//! Audio loading, playback and frequency analysis.
//!
//! Files are decoded off the render thread, resampled to the device rate,
//! played back through cpal with looping, and analysed with an FFT to produce
//! the per-bin byte magnitudes that drive the visuals.

mod analyser;
mod decoder;
mod loader;
mod output;
mod playback;
mod resample;
mod session;

// Re-export public types
pub use analyser::{Analyser, Spectrum};
pub use decoder::{decode, DecodeError, DecodedAudio};
pub use loader::{AudioLoader, LoadError, LoadOutcome, LoadState};
pub use output::{default_output_rate, AudioError};
pub use playback::Playback;
pub use resample::{resample, ResampleError};
pub use session::AudioSession;

#[cfg(test)]
pub(crate) use decoder::tests::sine_wav;
#[cfg(test)]
pub(crate) use session::tests::tone_session;
