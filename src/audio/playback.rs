//! Playback cursor over a decoded clip.
//!
//! Shared between the output callback (which pulls samples) and the render
//! thread (which toggles play/pause and reads the most recent window for
//! analysis).

use std::sync::Arc;

use super::decoder::DecodedAudio;

/// Playback state of one clip
#[derive(Debug)]
pub struct Playback {
    /// Clip at its native rate; the cursor and analysis run on this one
    clip: Arc<DecodedAudio>,
    /// The same clip at the device rate; shares `clip` until resampled
    output: Arc<DecodedAudio>,
    /// Read position in native frames
    position: f64,
    playing: bool,
    looping: bool,
}

impl Playback {
    /// New paused playback at the start of the clip
    pub fn new(clip: Arc<DecodedAudio>, looping: bool) -> Self {
        Self {
            output: Arc::clone(&clip),
            clip,
            position: 0.0,
            playing: false,
            looping,
        }
    }

    pub fn clip(&self) -> &DecodedAudio {
        &self.clip
    }

    /// Sample rate `render` produces
    pub fn output_rate(&self) -> u32 {
        self.output.sample_rate
    }

    /// Play from a copy of the clip resampled to the device rate
    pub fn set_output_clip(&mut self, output: Arc<DecodedAudio>) {
        self.output = output;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn position_secs(&self) -> f64 {
        self.position / self.clip.sample_rate as f64
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Fill an interleaved output buffer at `output_rate()`, advancing the cursor
    ///
    /// Writes silence while paused. Output channels beyond the clip's channel
    /// count repeat the clip's channels (mono goes to every speaker).
    pub fn render(&mut self, out: &mut [f32], out_channels: usize) {
        let out_channels = out_channels.max(1);
        let ratio = self.output.sample_rate as f64 / self.clip.sample_rate as f64;
        let output_frames = self.output.frames();

        for frame in out.chunks_mut(out_channels) {
            if !self.playing || output_frames == 0 {
                frame.fill(0.0);
                continue;
            }

            // Exact frame index at the device rate; rounding absorbs float drift
            let index = (self.position * ratio).round() as usize % output_frames;
            for (channel, slot) in frame.iter_mut().enumerate() {
                *slot = self.output.sample(index, channel);
            }
            self.step(1.0 / ratio);
        }
    }

    /// Advance the cursor by wall-clock time without producing output
    pub fn advance(&mut self, seconds: f64) {
        if self.playing && seconds > 0.0 {
            self.step(seconds * self.clip.sample_rate as f64);
        }
    }

    /// Mono mixdown of the `count` frames just before the cursor
    ///
    /// Missing history (start of a non-looping clip) is zero-filled; looping
    /// clips wrap around to the end.
    pub fn recent_mono(&self, count: usize) -> Vec<f32> {
        let frames = self.clip.frames();
        let end = self.position as usize;

        (0..count)
            .map(|i| {
                let back = count - i;
                if back <= end {
                    self.clip.mono(end - back)
                } else if self.looping && frames > 0 {
                    let wrapped = (frames - (back - end) % frames) % frames;
                    self.clip.mono(wrapped)
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn step(&mut self, frames: f64) {
        let total = self.clip.frames() as f64;
        self.position += frames;

        if self.position >= total {
            if self.looping && total > 0.0 {
                self.position %= total;
            } else {
                self.position = 0.0;
                self.playing = false;
            }
        }
    }
}
