//! One loaded audio clip: playback, output and analysis.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::analyser::{Analyser, Spectrum};
use super::decoder::DecodedAudio;
use super::output::{AudioError, OutputStream};
use super::playback::Playback;
use crate::params::{AnalyserConfig, ConfigError};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Loaded clip with its playback cursor, output stream and analyser
pub struct AudioSession {
    id: u64,
    source: String,
    playback: Arc<Mutex<Playback>>,
    analyser: Analyser,
    /// Device output; `None` runs the cursor off the frame clock instead
    output: Option<OutputStream>,
}

impl AudioSession {
    /// Create a session with looping enabled, paused, and no output yet
    pub fn new(
        source: impl Into<String>,
        clip: DecodedAudio,
        analyser: AnalyserConfig,
    ) -> Result<Self, ConfigError> {
        let analyser = Analyser::new(analyser)?;
        let playback = Playback::new(Arc::new(clip), true);

        Ok(Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            source: source.into(),
            playback: Arc::new(Mutex::new(playback)),
            analyser,
            output: None,
        })
    }

    /// Use a clip already resampled for the output device
    pub fn set_device_clip(&mut self, clip: DecodedAudio) {
        self.lock().set_output_clip(Arc::new(clip));
    }

    /// Attach the default audio device
    pub fn connect_output(&mut self) -> Result<(), AudioError> {
        let stream = OutputStream::open(Arc::clone(&self.playback))?;
        self.output = Some(stream);
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether audio reaches a device (otherwise the session is silent)
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().is_playing()
    }

    pub fn play(&mut self) {
        self.lock().play();
    }

    pub fn pause(&mut self) {
        self.lock().pause();
    }

    /// Flip play/pause, returning the new playing state
    pub fn toggle(&mut self) -> bool {
        let mut playback = self.lock();
        if playback.is_playing() {
            playback.pause();
        } else {
            playback.play();
        }
        playback.is_playing()
    }

    /// Advance a silent session by frame time; no-op when a device drives it
    pub fn tick(&mut self, delta_s: f32) {
        if self.output.is_none() {
            self.lock().advance(delta_s as f64);
        }
    }

    /// Analyse the audio just before the playback cursor
    ///
    /// A paused session feeds silence, so the smoothed spectrum decays
    /// toward zero instead of freezing on the last playing frame.
    pub fn analyse(&mut self) -> Spectrum<'_> {
        let size = self.analyser.fft_size();
        let window = {
            let playback = self.lock();
            if playback.is_playing() {
                playback.recent_mono(size)
            } else {
                vec![0.0; size]
            }
        };
        self.analyser.process(&window)
    }

    fn lock(&self) -> MutexGuard<'_, Playback> {
        // The output callback never panics while holding the lock
        self.playback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
