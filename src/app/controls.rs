//! Keyboard controls and the window title status line.

use winit::keyboard::KeyCode;

use crate::audio::LoadState;

/// Title used before anything is loaded
pub const APP_TITLE: &str = "ringpulse";

/// Action bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlayback,
    Quit,
}

pub fn command_for(key: KeyCode) -> Option<Command> {
    match key {
        KeyCode::Space | KeyCode::KeyP => Some(Command::TogglePlayback),
        KeyCode::Escape => Some(Command::Quit),
        _ => None,
    }
}

/// Window title reflecting load and playback state
pub fn window_title(state: &LoadState, playing: bool) -> String {
    match state {
        LoadState::Idle => format!("{APP_TITLE} - drop an audio file"),
        LoadState::Loading { source } => format!("{APP_TITLE} - loading {source}"),
        LoadState::Ready { source } => {
            let status = if playing { "playing" } else { "paused (space to play)" };
            format!("{APP_TITLE} - {source} [{status}]")
        }
        LoadState::DecodeFailed { source, error } => {
            format!("{APP_TITLE} - cannot play {source}: {error}")
        }
    }
}
