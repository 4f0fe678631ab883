//! Render loop lifecycle.

/// Where the render loop is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Window not created yet
    #[default]
    Idle,
    Running,
    /// Shutdown requested; no further frames
    Stopped,
}

/// Tracks whether frames should still be scheduled
#[derive(Debug, Default)]
pub struct RenderLoop {
    state: LoopState,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Idle -> Running. A stopped loop stays stopped.
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    /// Account for a frame about to be drawn; false when the loop is not running
    pub fn begin_frame(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.frames += 1;
        true
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
