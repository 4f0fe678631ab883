//! Frame timing.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Measures the time between frames
///
/// The first delta is zero; later deltas are seconds since the previous call.
#[derive(Debug, Default)]
pub struct FrameClock {
    previous: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous call
    pub fn delta(&mut self) -> f32 {
        self.delta_at(Instant::now())
    }

    pub fn delta_at(&mut self, now: Instant) -> f32 {
        let delta = match self.previous {
            Some(previous) => now.saturating_duration_since(previous).as_secs_f32(),
            None => 0.0,
        };
        self.previous = Some(now);
        delta
    }
}

/// Wall-clock milliseconds since the Unix epoch
pub fn epoch_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
