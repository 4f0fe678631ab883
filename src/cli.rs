//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::params::{
    AnalyserConfig, DriftMode, LightRig, MotionParams, RenderConfig, RingBreathing, SceneParams,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ringpulse")]
#[command(about = "Audio-reactive rings and sparks", long_about = None)]
pub struct Args {
    /// Audio file to load at startup (more can be dropped onto the window)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Number of concentric rings (1 to 1000)
    #[arg(
        long,
        value_name = "N",
        default_value = "30",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=1000)
    )]
    pub tori_count: usize,

    /// Spark spread (outer sparks sit at 3x this distance)
    #[arg(long, value_name = "UNITS", default_value = "100")]
    pub spark_distance: f32,

    /// Spark group spin (radians per second)
    #[arg(long, value_name = "RAD_PER_S", default_value = "0.05")]
    pub spark_rotation: f32,

    /// Point light intensity
    #[arg(long, value_name = "INTENSITY", default_value = "0.5")]
    pub light_intensity: f32,

    /// Seed for ring colors (random each run when omitted)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Start playing as soon as a file has loaded
    #[arg(long)]
    pub autoplay: bool,

    /// Keep rings oscillating around their base position instead of drifting
    #[arg(long)]
    pub absolute_drift: bool,

    /// Only move rings on frames where sparks react to audio
    #[arg(long)]
    pub breathe_with_audio: bool,

    /// Do not open an audio device; the visuals follow the frame clock
    #[arg(long)]
    pub silent: bool,

    /// Window width (logical pixels)
    #[arg(long, value_name = "PIXELS", default_value = "1280")]
    pub width: u32,

    /// Window height (logical pixels)
    #[arg(long, value_name = "PIXELS", default_value = "720")]
    pub height: u32,
}

impl Args {
    pub fn scene_params(&self) -> SceneParams {
        SceneParams {
            tori_count: self.tori_count,
            spark_distance: self.spark_distance,
            color_seed: self.seed,
            lights: LightRig {
                intensity: self.light_intensity,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn motion_params(&self) -> MotionParams {
        MotionParams {
            spark_rotation: self.spark_rotation,
            drift: if self.absolute_drift {
                DriftMode::Absolute
            } else {
                DriftMode::Cumulative
            },
            breathing: if self.breathe_with_audio {
                RingBreathing::WithAudio
            } else {
                RingBreathing::Always
            },
            ..Default::default()
        }
    }

    pub fn analyser_config(&self) -> AnalyserConfig {
        AnalyserConfig::default()
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_params() {
        let args = Args::parse_from(["ringpulse"]);

        assert!(args.file.is_none());
        let scene = args.scene_params();
        let defaults = SceneParams::default();
        assert_eq!(scene.tori_count, defaults.tori_count);
        assert_eq!(scene.spark_distance, defaults.spark_distance);
        assert_eq!(scene.lights.intensity, defaults.lights.intensity);
        assert_eq!(scene.color_seed, None);

        let motion = args.motion_params();
        assert_eq!(motion.spark_rotation, 0.05);
        assert_eq!(motion.drift, DriftMode::Cumulative);
        assert_eq!(motion.breathing, RingBreathing::Always);

        let render = args.render_config();
        assert_eq!((render.window_width, render.window_height), (1280, 720));
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "ringpulse",
            "song.mp3",
            "--tori-count",
            "12",
            "--spark-distance",
            "40",
            "--light-intensity",
            "0.8",
            "--seed",
            "7",
            "--absolute-drift",
            "--breathe-with-audio",
            "--autoplay",
        ]);

        assert_eq!(args.file, Some(PathBuf::from("song.mp3")));
        assert!(args.autoplay);

        let scene = args.scene_params();
        assert_eq!(scene.tori_count, 12);
        assert_eq!(scene.spark_distance, 40.0);
        assert_eq!(scene.lights.intensity, 0.8);
        assert_eq!(scene.color_seed, Some(7));

        let motion = args.motion_params();
        assert_eq!(motion.drift, DriftMode::Absolute);
        assert_eq!(motion.breathing, RingBreathing::WithAudio);
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(Args::try_parse_from(["ringpulse", "--tori-count", "many"]).is_err());
    }

    #[test]
    fn test_tori_count_bounded() {
        assert!(Args::try_parse_from(["ringpulse", "--tori-count", "0"]).is_err());
        assert!(Args::try_parse_from(["ringpulse", "--tori-count", "100000"]).is_err());

        let args = Args::try_parse_from(["ringpulse", "--tori-count", "1000"]).unwrap();
        assert_eq!(args.scene_params().tori_count, 1000);
    }
}
