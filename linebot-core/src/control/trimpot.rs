//! Manual drive from the trim-pot
//!
//! The pot's travel is split at its midpoint: the lower half drives
//! forward, the upper half backward, with duty growing linearly with the
//! distance from the midpoint. Both wheels get the same duty.

use crate::motor::{Direction, MAX_DUTY};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trim-pot input configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrimpotConfig {
    /// Converter channel the wiper is connected to
    pub channel: u8,
}

impl Default for TrimpotConfig {
    fn default() -> Self {
        Self { channel: 0 }
    }
}

/// Direction and duty for an 8-bit pot reading
///
/// The midpoint is 127.5, so 127 and 128 are the slowest settings in each
/// direction and 0/255 are full speed.
pub fn trimpot_drive(sample: u8) -> (Direction, u16) {
    let sample = sample as u32;
    let full = MAX_DUTY as u32;

    if sample <= 127 {
        let duty = (255 - 2 * sample) * full / 255;
        (Direction::Forward, duty as u16)
    } else {
        let duty = (2 * sample - 255) * full / 255;
        (Direction::Backward, duty as u16)
    }
}
