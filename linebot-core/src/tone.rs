//! Audible feedback requests
//!
//! Every mode change asks for a short beep whose pitch identifies the
//! new mode. Whether anything is actually played is up to the board.

use crate::state::Mode;

/// Base pitch for mode `Stopped`
pub const TONE_BASE_HZ: u16 = 100;
/// Pitch step per mode index
pub const TONE_STEP_HZ: u16 = 10;
/// Length of a mode-change beep
pub const TONE_DURATION_MS: u16 = 250;

/// A beep to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToneRequest {
    pub frequency_hz: u16,
    pub duration_ms: u16,
}

impl ToneRequest {
    /// Beep announcing entry into `mode`
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            frequency_hz: TONE_BASE_HZ + TONE_STEP_HZ * mode.index() as u16,
            duration_ms: TONE_DURATION_MS,
        }
    }
}
