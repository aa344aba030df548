//! Input state and helpers for keyboard control.
//!
//! This captures the small key set used by the character controller
//! (WASD + Shift) plus the attack key. Platform code updates this state on
//! events, and game code reads it each frame.

#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub run: bool, // Shift
    /// Attack key held this frame; the controller edge-detects it.
    pub attack: bool,
}

impl InputState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
