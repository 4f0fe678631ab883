//! Decoding of in-memory audio files into interleaved `f32` samples.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Failure to turn a byte buffer into playable audio
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unrecognized audio format: {0}")]
    UnknownFormat(#[source] SymphoniaError),

    #[error("no audio track found")]
    NoAudioTrack,

    #[error("unsupported codec: {0}")]
    UnsupportedCodec(#[source] SymphoniaError),

    #[error("audio stream error: {0}")]
    Stream(#[source] SymphoniaError),

    #[error("audio contains no samples")]
    Empty,
}

/// Fully decoded audio clip
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples, `channels` per frame
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Number of sample frames
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Sample of one channel in one frame
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        self.samples[frame * self.channels + channel % self.channels]
    }

    /// Average of all channels in one frame
    pub fn mono(&self, frame: usize) -> f32 {
        let start = frame * self.channels;
        let sum: f32 = self.samples[start..start + self.channels].iter().sum();
        sum / self.channels as f32
    }
}

/// Decode a complete audio file held in memory
///
/// `extension` is an optional format hint such as `"mp3"`; the container is
/// probed from its contents either way.
pub fn decode(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedAudio, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(DecodeError::UnknownFormat)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(DecodeError::UnsupportedCodec)?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Stream(e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            Err(e) => match on_decode_error(e) {
                PacketStep::Skip(reason) => {
                    log::debug!("Skipping undecodable packet: {}", reason);
                }
                PacketStep::Finish => break,
                PacketStep::Fail(e) => return Err(DecodeError::Stream(e)),
            },
        }
    }

    if samples.is_empty() || channels == 0 {
        return Err(DecodeError::Empty);
    }

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate,
    })
}

/// What the packet loop does after a packet fails to decode
#[derive(Debug)]
enum PacketStep {
    /// Corrupt packet, drop it and keep going
    Skip(&'static str),
    /// Truncated stream, keep what was decoded so far
    Finish,
    Fail(SymphoniaError),
}

fn on_decode_error(err: SymphoniaError) -> PacketStep {
    match err {
        SymphoniaError::DecodeError(reason) => PacketStep::Skip(reason),
        SymphoniaError::IoError(_) => PacketStep::Finish,
        other => PacketStep::Fail(other),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::f32::consts::TAU;

    /// Encode a sine tone as an in-memory 16-bit WAV file
    pub(crate) fn sine_wav(freq_hz: f32, sample_rate: u32, channels: u16, frames: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for n in 0..frames {
                let value = (TAU * freq_hz * n as f32 / sample_rate as f32).sin();
                let sample = (value * i16::MAX as f32 * 0.9) as i16;
                for _ in 0..channels {
                    writer.write_sample(sample).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_stereo_wav() {
        let bytes = sine_wav(440.0, 22050, 2, 2205);
        let audio = decode(bytes, Some("wav")).unwrap();

        assert_eq!(audio.channels, 2);
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.frames(), 2205);
        assert!((audio.duration_secs() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_decoded_samples_follow_source() {
        let bytes = sine_wav(1000.0, 8000, 1, 800);
        let audio = decode(bytes, None).unwrap();

        // 1 kHz at 8 kHz: quarter period is two samples
        assert!(audio.sample(0, 0).abs() < 1e-3);
        assert!((audio.sample(2, 0) - 0.9).abs() < 1e-2);
        assert!((audio.mono(2) - 0.9).abs() < 1e-2);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let bytes = b"definitely not an audio file".repeat(64);
        assert!(decode(bytes, None).is_err());
    }

    #[test]
    fn test_decode_rejects_empty_buffer() {
        assert!(decode(Vec::new(), Some("mp3")).is_err());
    }

    #[test]
    fn test_decode_rejects_wav_without_samples() {
        let bytes = sine_wav(440.0, 44100, 1, 0);
        assert!(decode(bytes, Some("wav")).is_err());
    }

    #[test]
    fn test_corrupt_packet_is_skipped() {
        let step = on_decode_error(SymphoniaError::DecodeError("invalid frame header"));
        assert!(matches!(step, PacketStep::Skip("invalid frame header")));
    }

    #[test]
    fn test_io_error_ends_stream() {
        let err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "cut short");
        assert!(matches!(
            on_decode_error(SymphoniaError::IoError(err)),
            PacketStep::Finish
        ));
    }

    #[test]
    fn test_unsupported_feature_fails() {
        let step = on_decode_error(SymphoniaError::Unsupported("bit depth"));
        assert!(matches!(step, PacketStep::Fail(SymphoniaError::Unsupported(_))));
    }

    #[test]
    fn test_truncated_wav_keeps_decoded_prefix() {
        let mut bytes = sine_wav(440.0, 8000, 1, 8000);
        // Header still promises 8000 frames; cut mid-sample
        bytes.truncate(44 + 4001 * 2 + 1);

        let audio = decode(bytes, Some("wav")).unwrap();

        assert_eq!(audio.sample_rate, 8000);
        assert!(audio.frames() > 0);
        assert!(audio.frames() < 8000);
    }
}
