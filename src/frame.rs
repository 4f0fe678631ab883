//! Per-frame mapping from audio analysis onto scene transforms.

use glam::Vec3;

use crate::audio::AudioSession;
use crate::params::{DriftMode, MotionParams, RingBreathing};
use crate::scene::Scene;

/// What one frame update did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOutcome {
    /// Sparks were rescaled from audio this frame
    pub sparks_scaled: bool,

    /// Rings moved this frame
    pub rings_breathed: bool,

    /// Average byte amplitude seen (0 without playing audio)
    pub average: f32,
}

/// Applies motion to the scene once per animation frame
pub struct FrameUpdater {
    params: MotionParams,
}

impl FrameUpdater {
    pub fn new(params: MotionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Update the scene for one frame
    ///
    /// # Arguments
    /// * `scene` - Scene to mutate
    /// * `session` - Current audio, if any has loaded
    /// * `delta_s` - Seconds since the previous frame
    /// * `now_ms` - Wall-clock milliseconds since the Unix epoch
    pub fn update(
        &self,
        scene: &mut Scene,
        session: Option<&mut AudioSession>,
        delta_s: f32,
        now_ms: f64,
    ) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();

        // Spin the spark group as one
        let spin = delta_s * self.params.spark_rotation;
        scene.sparks.transform.rotation.x += spin;
        scene.sparks.transform.rotation.y += spin;

        // Analysis runs while paused too, so smoothing decays on silence
        if let Some(session) = session {
            let playing = session.is_playing();
            let spectrum = session.analyse();

            if playing && spectrum.average > 0.0 {
                outcome.average = spectrum.average;
                self.scale_sparks(scene, spectrum.bytes);
                outcome.sparks_scaled = true;
            }
        }

        if self.params.breathing == RingBreathing::Always || outcome.sparks_scaled {
            self.breathe_rings(scene, now_ms);
            outcome.rings_breathed = true;
        }

        outcome
    }

    fn scale_sparks(&self, scene: &mut Scene, bytes: &[u8]) {
        for (index, spark) in scene.sparks.children.iter_mut().enumerate() {
            if let Some(scale) = spark_scale(bytes, index, self.params.amplitude_divisor) {
                spark.transform.scale = Vec3::splat(scale);
            }
        }
    }

    fn breathe_rings(&self, scene: &mut Scene, now_ms: f64) {
        for (index, ring) in scene.rings.children.iter_mut().enumerate() {
            let wave = ring_wave(
                now_ms,
                index,
                self.params.breathing_rate,
                self.params.ring_phase_divisor,
            );
            match self.params.drift {
                DriftMode::Cumulative => ring.transform.position.z += wave,
                DriftMode::Absolute => ring.transform.position.z = ring.base_z + wave,
            }
        }
    }
}

/// Scale for the spark at `index` from two adjacent frequency bins
///
/// `max(1, (bytes[2i] + bytes[2i - 1]) / divisor)`. The center spark
/// (index 0) and sparks without matching bins get `None`.
pub fn spark_scale(bytes: &[u8], index: usize, divisor: f32) -> Option<f32> {
    if index == 0 {
        return None;
    }
    let upper = *bytes.get(index * 2)? as f32;
    let lower = *bytes.get(index * 2 - 1)? as f32;
    Some(((upper + lower) / divisor).max(1.0))
}

/// Breathing offset for the ring at `index` at wall-clock time `now_ms`
pub fn ring_wave(now_ms: f64, index: usize, rate: f64, phase_divisor: f64) -> f32 {
    (now_ms * rate - index as f64 / phase_divisor).sin() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::tone_session;
    use crate::params::SceneParams;

    const NOW_MS: f64 = 1_700_000_000_123.0;

    fn scene() -> Scene {
        Scene::build(&SceneParams {
            color_seed: Some(1),
            ..Default::default()
        })
    }

    fn ring_z(scene: &Scene) -> Vec<f32> {
        scene
            .rings
            .children
            .iter()
            .map(|r| r.transform.position.z)
            .collect()
    }

    #[test]
    fn test_spark_scale_formula() {
        let mut bytes = [0u8; 16];
        bytes[1] = 100;
        bytes[2] = 100;
        bytes[3] = 10;
        bytes[4] = 20;

        assert_eq!(spark_scale(&bytes, 0, 128.0), None);
        assert_eq!(spark_scale(&bytes, 1, 128.0), Some(200.0 / 128.0));
        // Quiet bins never shrink a spark below 1
        assert_eq!(spark_scale(&bytes, 2, 128.0), Some(1.0));
        assert_eq!(spark_scale(&[255; 16], 6, 128.0), Some(510.0 / 128.0));
    }

    #[test]
    fn test_spark_scale_out_of_range() {
        assert_eq!(spark_scale(&[200; 4], 2, 128.0), None);
        assert_eq!(spark_scale(&[], 1, 128.0), None);
    }

    #[test]
    fn test_no_session_leaves_sparks_alone() {
        let mut scene = scene();
        let updater = FrameUpdater::new(MotionParams::default());

        for frame in 0..10 {
            let outcome = updater.update(&mut scene, None, 0.016, NOW_MS + frame as f64 * 16.0);
            assert!(!outcome.sparks_scaled);
        }
        assert!(scene.spark_scales().iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_spark_group_spins_without_audio() {
        let mut scene = scene();
        let updater = FrameUpdater::new(MotionParams::default());

        updater.update(&mut scene, None, 2.0, NOW_MS);

        assert!((scene.sparks.transform.rotation.x - 0.1).abs() < 1e-6);
        assert!((scene.sparks.transform.rotation.y - 0.1).abs() < 1e-6);
        assert_eq!(scene.sparks.transform.rotation.z, 0.0);
    }

    #[test]
    fn test_rings_breathe_without_audio() {
        let mut scene = scene();
        let updater = FrameUpdater::new(MotionParams::default());

        let outcome = updater.update(&mut scene, None, 0.016, NOW_MS);

        assert!(outcome.rings_breathed);
        for (index, z) in ring_z(&scene).into_iter().enumerate() {
            let expected = -500.0 + ring_wave(NOW_MS, index, 0.001, 16.0);
            assert!((z - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_breathing_gated_on_audio() {
        let mut scene = scene();
        let updater = FrameUpdater::new(MotionParams {
            breathing: RingBreathing::WithAudio,
            ..Default::default()
        });

        let outcome = updater.update(&mut scene, None, 0.016, NOW_MS);

        assert!(!outcome.rings_breathed);
        assert!(ring_z(&scene).iter().all(|&z| z == -500.0));
    }

    #[test]
    fn test_paused_session_leaves_sparks_alone() {
        let mut scene = scene();
        let updater = FrameUpdater::new(MotionParams::default());
        let mut session = tone_session(4, 1.0);

        for _ in 0..5 {
            session.tick(0.016);
            let outcome = updater.update(&mut scene, Some(&mut session), 0.016, NOW_MS);
            assert!(!outcome.sparks_scaled);
        }
        assert!(scene.spark_scales().iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_scales_freeze_when_paused() {
        let mut scene = scene();
        let updater = FrameUpdater::new(MotionParams::default());
        let mut session = tone_session(4, 1.0);

        session.play();
        session.tick(0.1);
        let outcome = updater.update(&mut scene, Some(&mut session), 0.016, NOW_MS);
        assert!(outcome.sparks_scaled);
        let before = scene.spark_scales();

        session.pause();
        for _ in 0..5 {
            updater.update(&mut scene, Some(&mut session), 0.016, NOW_MS);
        }
        assert_eq!(scene.spark_scales(), before);
    }

    #[test]
    fn test_paused_frames_let_spectrum_decay() {
        let mut scene = scene();
        let updater = FrameUpdater::new(MotionParams::default());
        let mut session = tone_session(4, 1.0);

        session.play();
        session.tick(0.1);
        updater.update(&mut scene, Some(&mut session), 0.016, NOW_MS);

        session.pause();
        for _ in 0..60 {
            let outcome = updater.update(&mut scene, Some(&mut session), 0.016, NOW_MS);
            assert!(!outcome.sparks_scaled);
            assert_eq!(outcome.average, 0.0);
        }
        assert_eq!(session.analyse().average, 0.0);
    }

    #[test]
    fn test_playing_tone_scales_matching_spark() {
        let mut scene = scene();
        let updater = FrameUpdater::new(MotionParams::default());
        let mut session = tone_session(4, 1.0);

        session.play();
        session.tick(0.1);
        let outcome = updater.update(&mut scene, Some(&mut session), 0.016, NOW_MS);

        assert!(outcome.average > 0.0);
        let scales = scene.spark_scales();
        // Bins 3 and 4 feed spark 2
        assert!(scales[2] > 1.0);
        assert_eq!(scales[0], 1.0);

        let spark = &scene.sparks.children[2];
        assert_eq!(spark.transform.scale, Vec3::splat(scales[2]));
    }

    #[test]
    fn test_silent_audio_skips_scaling() {
        let mut scene = scene();
        let updater = FrameUpdater::new(MotionParams::default());
        let mut session = tone_session(4, 0.0);

        session.play();
        session.tick(0.1);
        let outcome = updater.update(&mut scene, Some(&mut session), 0.016, NOW_MS);

        assert_eq!(outcome.average, 0.0);
        assert!(!outcome.sparks_scaled);
        assert!(scene.spark_scales().iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_ring_drift_is_reproducible() {
        let updater = FrameUpdater::new(MotionParams::default());
        let mut a = scene();
        let mut b = scene();

        updater.update(&mut a, None, 0.016, NOW_MS);
        updater.update(&mut b, None, 0.016, NOW_MS);

        assert_eq!(ring_z(&a), ring_z(&b));
        assert_eq!(
            ring_wave(NOW_MS, 3, 0.001, 16.0),
            ring_wave(NOW_MS, 3, 0.001, 16.0)
        );
    }

    #[test]
    fn test_cumulative_drift_accumulates() {
        let updater = FrameUpdater::new(MotionParams::default());
        let mut scene = scene();

        updater.update(&mut scene, None, 0.016, NOW_MS);
        updater.update(&mut scene, None, 0.016, NOW_MS);

        let wave = ring_wave(NOW_MS, 0, 0.001, 16.0);
        let z = scene.rings.children[0].transform.position.z;
        assert!((z - (-500.0 + 2.0 * wave)).abs() < 1e-3);
    }

    #[test]
    fn test_absolute_drift_does_not_accumulate() {
        let updater = FrameUpdater::new(MotionParams {
            drift: DriftMode::Absolute,
            ..Default::default()
        });
        let mut scene = scene();

        updater.update(&mut scene, None, 0.016, NOW_MS);
        updater.update(&mut scene, None, 0.016, NOW_MS);

        let wave = ring_wave(NOW_MS, 0, 0.001, 16.0);
        let z = scene.rings.children[0].transform.position.z;
        assert!((z - (-500.0 + wave)).abs() < 1e-3);
    }
}
