//! Background loading: read a file, decode it, hand back the clip.
//!
//! Every request runs on its own worker thread and reports over a channel.
//! Requests are numbered; when a newer request has been made, results of
//! older ones are dropped on arrival, so only the latest file can win.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use super::decoder::{decode, DecodeError, DecodedAudio};
use super::resample::resample;

/// Failure to load an audio file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Where the most recent load request stands
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Nothing requested yet
    Idle,
    Loading { source: String },
    Ready { source: String },
    DecodeFailed { source: String, error: String },
}

/// Result of a finished load request
#[derive(Debug)]
pub enum LoadOutcome {
    Ready {
        source: String,
        clip: DecodedAudio,
        /// `clip` resampled to the output rate, when one was set and differs
        device_clip: Option<DecodedAudio>,
    },
    Failed { source: String, error: LoadError },
}

struct Completed {
    generation: u64,
    source: String,
    result: Result<(DecodedAudio, Option<DecodedAudio>), LoadError>,
}

/// Asynchronous audio loader
pub struct AudioLoader {
    tx: Sender<Completed>,
    rx: Receiver<Completed>,
    generation: u64,
    state: LoadState,
    /// Device sample rate finished clips are resampled to
    output_rate: Option<u32>,
}

impl Default for AudioLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            generation: 0,
            state: LoadState::Idle,
            output_rate: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Also resample future loads to `rate` (the output device rate)
    pub fn set_output_rate(&mut self, rate: Option<u32>) {
        self.output_rate = rate;
    }

    /// Read and decode a file in the background
    pub fn load_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let source = display_name(&path);
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        self.spawn(source, move || {
            let bytes = std::fs::read(&path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;
            log::debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(decode(bytes, extension.as_deref())?)
        });
    }

    /// Decode an in-memory file in the background
    pub fn load_bytes(&mut self, source: impl Into<String>, bytes: Vec<u8>) {
        self.spawn(source.into(), move || Ok(decode(bytes, None)?));
    }

    /// Collect the outcome of the latest request, if it has finished
    ///
    /// Never blocks. Outcomes of superseded requests are discarded.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        loop {
            let completed = match self.rx.try_recv() {
                Ok(completed) => completed,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            };

            if completed.generation != self.generation {
                log::debug!("Discarding stale load of {}", completed.source);
                continue;
            }

            let source = completed.source;
            return Some(match completed.result {
                Ok((clip, device_clip)) => {
                    log::info!(
                        "Loaded {} ({:.1}s, {} ch @ {}Hz)",
                        source,
                        clip.duration_secs(),
                        clip.channels,
                        clip.sample_rate
                    );
                    self.state = LoadState::Ready {
                        source: source.clone(),
                    };
                    LoadOutcome::Ready {
                        source,
                        clip,
                        device_clip,
                    }
                }
                Err(error) => {
                    log::error!("Failed to load {}: {}", source, error);
                    self.state = LoadState::DecodeFailed {
                        source: source.clone(),
                        error: error.to_string(),
                    };
                    LoadOutcome::Failed { source, error }
                }
            });
        }
    }

    fn spawn<F>(&mut self, source: String, job: F)
    where
        F: FnOnce() -> Result<DecodedAudio, LoadError> + Send + 'static,
    {
        self.generation += 1;
        let generation = self.generation;
        log::info!("Loading {}", source);
        self.state = LoadState::Loading {
            source: source.clone(),
        };

        let tx = self.tx.clone();
        let output_rate = self.output_rate;
        thread::spawn(move || {
            let result = job().map(|clip| {
                let device_clip = output_rate.and_then(|rate| prepare_for_device(&clip, rate));
                (clip, device_clip)
            });
            // The loader may be gone by now; nothing left to notify
            let _ = tx.send(Completed {
                generation,
                source,
                result,
            });
        });
    }
}

/// Resampled copy of `clip` at `rate`, or `None` when no conversion is needed
///
/// A failure is logged and left for the output stream to retry.
fn prepare_for_device(clip: &DecodedAudio, rate: u32) -> Option<DecodedAudio> {
    if clip.sample_rate == rate {
        return None;
    }
    match resample(clip, rate) {
        Ok(device_clip) => Some(device_clip),
        Err(e) => {
            log::warn!("Could not resample to {} Hz: {}", rate, e);
            None
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
