//! Visualizer state: the scene, the current audio session and its loader.
//!
//! Window-independent so the whole load/toggle/update cycle runs in tests.

use std::path::Path;

use crate::audio::{
    default_output_rate, AudioLoader, AudioSession, DecodedAudio, LoadOutcome, LoadState,
};
use crate::frame::{FrameOutcome, FrameUpdater};
use crate::params::{AnalyserConfig, ConfigError, MotionParams, SceneParams};
use crate::scene::Scene;

/// Owns everything the frame loop mutates
pub struct Visualizer {
    scene: Scene,
    session: Option<AudioSession>,
    loader: AudioLoader,
    updater: FrameUpdater,
    analyser: AnalyserConfig,
    autoplay: bool,
    /// Open a device stream for new sessions (off in tests and `--silent`)
    audio_output: bool,
    /// Default device rate, looked up on the first load
    device_rate: Option<Option<u32>>,
}

impl Visualizer {
    pub fn new(
        scene: &SceneParams,
        motion: MotionParams,
        analyser: AnalyserConfig,
    ) -> Result<Self, ConfigError> {
        analyser.validate()?;

        Ok(Self {
            scene: Scene::build(scene),
            session: None,
            loader: AudioLoader::new(),
            updater: FrameUpdater::new(motion),
            analyser,
            autoplay: false,
            audio_output: true,
            device_rate: None,
        })
    }

    /// Start playback as soon as a file finishes loading
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// Whether new sessions try to open the default output device
    pub fn with_audio_output(mut self, enabled: bool) -> Self {
        self.audio_output = enabled;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn session(&self) -> Option<&AudioSession> {
        self.session.as_ref()
    }

    pub fn load_state(&self) -> &LoadState {
        self.loader.state()
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(AudioSession::is_playing)
    }

    /// Whether the play/pause control is enabled
    pub fn can_toggle(&self) -> bool {
        self.session.is_some()
    }

    pub fn open_file(&mut self, path: impl AsRef<Path>) {
        let rate = self.device_rate();
        self.loader.set_output_rate(rate);
        self.loader.load_file(path);
    }

    pub fn open_bytes(&mut self, source: impl Into<String>, bytes: Vec<u8>) {
        let rate = self.device_rate();
        self.loader.set_output_rate(rate);
        self.loader.load_bytes(source, bytes);
    }

    /// Rate loads are resampled to, or `None` when no device will be opened
    fn device_rate(&mut self) -> Option<u32> {
        if !self.audio_output {
            return None;
        }
        *self.device_rate.get_or_insert_with(default_output_rate)
    }

    /// Install a finished load, if any. Returns true when the session changed.
    pub fn poll_loader(&mut self) -> bool {
        let Some(LoadOutcome::Ready {
            source,
            clip,
            device_clip,
        }) = self.loader.poll()
        else {
            return false;
        };

        match self.install(source, clip, device_clip) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Cannot analyse audio: {}", e);
                false
            }
        }
    }

    /// Replace the current session with one playing `clip`
    ///
    /// The previous session is dropped first, which closes its output stream.
    pub fn install_session(
        &mut self,
        source: impl Into<String>,
        clip: DecodedAudio,
    ) -> Result<(), ConfigError> {
        self.install(source, clip, None)
    }

    fn install(
        &mut self,
        source: impl Into<String>,
        clip: DecodedAudio,
        device_clip: Option<DecodedAudio>,
    ) -> Result<(), ConfigError> {
        if let Some(old) = self.session.take() {
            log::debug!("Dropping session {} ({})", old.id(), old.source());
        }

        let mut session = AudioSession::new(source, clip, self.analyser.clone())?;
        if let Some(device_clip) = device_clip {
            session.set_device_clip(device_clip);
        }
        if self.audio_output {
            if let Err(e) = session.connect_output() {
                log::warn!("No audio output ({}), visuals will follow a silent clock", e);
            }
        }
        if self.autoplay {
            session.play();
        }

        log::info!(
            "Session {} ready: {}{}",
            session.id(),
            session.source(),
            if session.is_playing() { " (playing)" } else { "" }
        );
        self.session = Some(session);
        Ok(())
    }

    /// Flip play/pause on the current session
    ///
    /// Returns the new playing state, or `None` while nothing is loaded.
    pub fn toggle_playback(&mut self) -> Option<bool> {
        let session = self.session.as_mut()?;
        let playing = session.toggle();
        log::info!("{}", if playing { "Playing" } else { "Paused" });
        Some(playing)
    }

    /// Advance audio and apply one frame of motion
    pub fn tick(&mut self, delta_s: f32, now_ms: f64) -> FrameOutcome {
        if let Some(session) = self.session.as_mut() {
            session.tick(delta_s);
        }
        self.updater
            .update(&mut self.scene, self.session.as_mut(), delta_s, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sine_wav;
    use std::f32::consts::TAU;
    use std::time::{Duration, Instant};

    const NOW_MS: f64 = 1_700_000_000_000.0;

    fn visualizer() -> Visualizer {
        let scene = SceneParams {
            color_seed: Some(11),
            ..Default::default()
        };
        Visualizer::new(&scene, MotionParams::default(), AnalyserConfig::default())
            .unwrap()
            .with_audio_output(false)
    }

    fn tone(bin: usize) -> DecodedAudio {
        let samples = (0..32_000)
            .map(|n| (TAU * bin as f32 * n as f32 / 32.0).sin())
            .collect();
        DecodedAudio {
            samples,
            channels: 1,
            sample_rate: 32_000,
        }
    }

    fn wait_for_session(visualizer: &mut Visualizer) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if visualizer.poll_loader() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_invalid_analyser_config_rejected() {
        let config = AnalyserConfig {
            fft_size: 48,
            ..Default::default()
        };
        let result = Visualizer::new(&SceneParams::default(), MotionParams::default(), config);
        assert!(matches!(result, Err(ConfigError::FftSize(48))));
    }

    #[test]
    fn test_toggle_before_load_is_ignored() {
        let mut visualizer = visualizer();

        assert!(!visualizer.can_toggle());
        assert_eq!(visualizer.toggle_playback(), None);
        assert!(!visualizer.is_playing());
    }

    #[test]
    fn test_ticks_before_load_leave_sparks_alone() {
        let mut visualizer = visualizer();

        for frame in 0..20 {
            let outcome = visualizer.tick(0.016, NOW_MS + frame as f64 * 16.0);
            assert!(!outcome.sparks_scaled);
        }
        assert!(visualizer.scene().spark_scales().iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_installed_session_starts_paused() {
        let mut visualizer = visualizer();
        visualizer.install_session("tone", tone(4)).unwrap();

        assert!(visualizer.can_toggle());
        assert!(!visualizer.is_playing());
        assert_eq!(visualizer.toggle_playback(), Some(true));
        assert!(visualizer.is_playing());
    }

    #[test]
    fn test_autoplay() {
        let mut visualizer = visualizer().with_autoplay(true);
        visualizer.install_session("tone", tone(4)).unwrap();

        assert!(visualizer.is_playing());
    }

    #[test]
    fn test_second_file_replaces_session() {
        let mut visualizer = visualizer();

        visualizer.install_session("first", tone(4)).unwrap();
        visualizer.toggle_playback();
        let first_id = visualizer.session().unwrap().id();

        visualizer.install_session("second", tone(2)).unwrap();
        let second = visualizer.session().unwrap();
        assert_ne!(second.id(), first_id);
        assert_eq!(second.source(), "second");
        // The new session starts paused regardless of the old one
        assert!(!visualizer.is_playing());

        assert_eq!(visualizer.toggle_playback(), Some(true));
        assert_eq!(visualizer.session().unwrap().source(), "second");
    }

    #[test]
    fn test_playing_session_drives_sparks() {
        let mut visualizer = visualizer();
        visualizer.install_session("tone", tone(4)).unwrap();
        visualizer.toggle_playback();

        let mut scaled = false;
        for frame in 0..10 {
            scaled |= visualizer
                .tick(0.016, NOW_MS + frame as f64 * 16.0)
                .sparks_scaled;
        }

        assert!(scaled);
        assert!(visualizer.scene().spark_scales()[2] > 1.0);
    }

    #[test]
    fn test_loaded_bytes_become_session() {
        let mut visualizer = visualizer();
        visualizer.open_bytes("drop.wav", sine_wav(440.0, 8000, 1, 800));

        assert!(wait_for_session(&mut visualizer));
        assert_eq!(visualizer.session().unwrap().source(), "drop.wav");
        assert_eq!(
            visualizer.load_state(),
            &LoadState::Ready {
                source: "drop.wav".to_string()
            }
        );
    }

    #[test]
    fn test_failed_load_keeps_previous_session() {
        let mut visualizer = visualizer();
        visualizer.install_session("tone", tone(4)).unwrap();
        visualizer.open_bytes("junk.bin", vec![0x42; 256]);

        let deadline = Instant::now() + Duration::from_secs(5);
        while matches!(visualizer.load_state(), LoadState::Loading { .. })
            && Instant::now() < deadline
        {
            visualizer.poll_loader();
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(matches!(
            visualizer.load_state(),
            LoadState::DecodeFailed { .. }
        ));
        assert_eq!(visualizer.session().unwrap().source(), "tone");
    }
}
