//! Audio output stream feeding the device from a shared playback cursor.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use std::sync::{Arc, Mutex};

use super::playback::Playback;
use super::resample::{resample, ResampleError};

/// Failure to open the audio output
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("failed to get audio config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported output sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),

    #[error("failed to match the device sample rate: {0}")]
    Resample(#[from] ResampleError),

    #[error("failed to build audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// Sample rate of the default output device, if there is one
pub fn default_output_rate() -> Option<u32> {
    let device = cpal::default_host().default_output_device()?;
    let config = device.default_output_config().ok()?;
    Some(config.sample_rate().0)
}

/// Running output stream (stops when dropped)
pub struct OutputStream {
    _stream: cpal::Stream,
    pub sample_rate: u32,
    pub channels: usize,
}

impl OutputStream {
    /// Open the default output device and start pulling from `playback`
    ///
    /// If the playback clip is not yet at the device rate it is resampled
    /// here before the stream starts.
    pub fn open(playback: Arc<Mutex<Playback>>) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        log::info!(
            "Audio: {} @ {}Hz, {} channels, {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels,
            config.sample_format()
        );

        {
            let mut playback = playback.lock().unwrap_or_else(|p| p.into_inner());
            if playback.output_rate() != sample_rate {
                log::info!(
                    "Resampling clip from {} Hz to {} Hz",
                    playback.clip().sample_rate,
                    sample_rate
                );
                let device_clip = resample(playback.clip(), sample_rate)?;
                playback.set_output_clip(Arc::new(device_clip));
            }
        }

        let stream_config = config.config();
        let stream = match config.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, playback, channels)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, playback, channels)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, playback, channels)?,
            other => return Err(AudioError::UnsupportedFormat(other)),
        };

        stream.play()?;

        Ok(Self {
            _stream: stream,
            sample_rate,
            channels,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    playback: Arc<Mutex<Playback>>,
    channels: usize,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut scratch = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            fill_output(data, &mut scratch, &playback, channels)
        },
        |err| log::error!("Audio stream error: {}", err),
        None,
    )
}

/// Render into a device buffer of any sample type
///
/// Playback renders `f32` into `scratch`, then each sample is converted.
/// A poisoned lock yields silence.
fn fill_output<T>(data: &mut [T], scratch: &mut Vec<f32>, playback: &Mutex<Playback>, channels: usize)
where
    T: Sample + FromSample<f32>,
{
    scratch.clear();
    scratch.resize(data.len(), 0.0);
    if let Ok(mut playback) = playback.lock() {
        playback.render(scratch, channels);
    }

    for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
        *out = T::from_sample(sample);
    }
}
