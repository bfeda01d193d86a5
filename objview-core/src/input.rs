//! Per-frame input handling.
//!
//! The loop keeps an [`InputState`] and threads it through
//! [`process_input`] once per frame together with a [`KeySnapshot`] sampled
//! from the window.

use crate::projection::ProjectionMode;

/// Key state sampled from the window for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    pub escape: bool,
    pub toggle: bool,
}

/// State carried between frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub mode: ProjectionMode,
    /// Toggle key was down on the previous frame
    toggle_held: bool,
}

/// What the loop should do as a result of this frame's input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputActions {
    pub close_requested: bool,
    pub mode_changed: bool,
}

impl InputState {
    pub fn new(mode: ProjectionMode) -> Self {
        Self {
            mode,
            toggle_held: false,
        }
    }
}

/// Advance the input state by one frame.
///
/// The camera mode flips only on the frame the toggle key goes down; it
/// must be released before it can flip again.
pub fn process_input(state: InputState, keys: KeySnapshot) -> (InputState, InputActions) {
    let pressed_now = keys.toggle && !state.toggle_held;
    let mode = if pressed_now {
        state.mode.toggled()
    } else {
        state.mode
    };

    if pressed_now {
        log::info!("camera mode switched to {}", mode.name());
    }

    (
        InputState {
            mode,
            toggle_held: keys.toggle,
        },
        InputActions {
            close_requested: keys.escape,
            mode_changed: pressed_now,
        },
    )
}
