//! Sample-rate conversion of decoded clips to the output device rate.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::decoder::DecodedAudio;

/// Input frames fed to the resampler per call
const CHUNK_FRAMES: usize = 1024;

/// Failure to convert a clip's sample rate
#[derive(Debug, thiserror::Error)]
pub enum ResampleError {
    #[error("failed to create resampler: {0}")]
    Setup(#[from] rubato::ResamplerConstructionError),

    #[error("resampling failed: {0}")]
    Process(#[from] rubato::ResampleError),
}

/// Convert a whole clip to `rate`
///
/// The filter delay is trimmed, so frame `n` of the result lines up with time
/// `n / rate` of the source. Clips already at `rate` are copied unchanged.
pub fn resample(clip: &DecodedAudio, rate: u32) -> Result<DecodedAudio, ResampleError> {
    if clip.sample_rate == rate || clip.frames() == 0 {
        return Ok(DecodedAudio {
            samples: clip.samples.clone(),
            channels: clip.channels,
            sample_rate: rate,
        });
    }

    let channels = clip.channels;
    let frames = clip.frames();
    let ratio = rate as f64 / clip.sample_rate as f64;

    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_FRAMES, channels)?;

    let planar: Vec<Vec<f32>> = (0..channels)
        .map(|channel| (0..frames).map(|f| clip.sample(f, channel)).collect())
        .collect();

    let expected = (frames as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); channels];

    let mut pos = 0;
    while frames - pos >= resampler.input_frames_next() {
        let end = pos + resampler.input_frames_next();
        let chunk: Vec<&[f32]> = planar.iter().map(|c| &c[pos..end]).collect();
        append(&mut output, resampler.process(chunk.as_slice(), None)?);
        pos = end;
    }

    if pos < frames {
        let chunk: Vec<&[f32]> = planar.iter().map(|c| &c[pos..]).collect();
        append(
            &mut output,
            resampler.process_partial(Some(chunk.as_slice()), None)?,
        );
    }

    // Flush the filter tail
    while output[0].len() < expected + delay {
        let tail = resampler.process_partial(None::<&[&[f32]]>, None)?;
        if tail[0].is_empty() {
            break;
        }
        append(&mut output, tail);
    }

    let end = (delay + expected).min(output[0].len());
    let mut samples = Vec::with_capacity(expected * channels);
    for frame in delay..end {
        for channel in &output {
            samples.push(channel[frame]);
        }
    }

    log::debug!(
        "Resampled {} -> {} Hz ({} -> {} frames)",
        clip.sample_rate,
        rate,
        frames,
        end.saturating_sub(delay)
    );

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate: rate,
    })
}

fn append(output: &mut [Vec<f32>], block: Vec<Vec<f32>>) {
    for (channel, samples) in output.iter_mut().zip(block) {
        channel.extend_from_slice(&samples);
    }
}
