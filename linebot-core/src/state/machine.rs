//! Mode state machine
//!
//! The robot has one active behavior mode at a time. A debounced button
//! press advances it cyclically through the enabled modes, and each mode
//! has a single entry action that runs at the transition point only.

use heapless::Vec;

use crate::config::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Top-level robot behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Motors off
    Stopped,
    /// Closed-loop line following from the sensor array
    LineFollow,
    /// Open-loop timed choreography
    Dance,
    /// Speed and direction from the trim-pot
    TrimpotManual,
}

/// Side effects performed once on entry into a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryAction {
    /// Zero both duty values
    StopMotors,
    /// Restart sampling in round-robin four-channel mode, drive forward
    StartLineSensing,
    /// Restart sampling in free-running single-channel mode
    StartTrimpotSampling,
    /// Reset the dance counter, drive forward
    StartDance,
}

impl Mode {
    /// All modes in index order
    pub const ALL: [Mode; 4] = [
        Mode::Stopped,
        Mode::LineFollow,
        Mode::Dance,
        Mode::TrimpotManual,
    ];

    /// Position in [`Mode::ALL`], used for the mode-change tone pitch
    pub fn index(self) -> u8 {
        match self {
            Mode::Stopped => 0,
            Mode::LineFollow => 1,
            Mode::Dance => 2,
            Mode::TrimpotManual => 3,
        }
    }

    /// Parse a mode name as written in the config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stopped" => Some(Mode::Stopped),
            "line_follow" => Some(Mode::LineFollow),
            "dance" => Some(Mode::Dance),
            "trimpot" => Some(Mode::TrimpotManual),
            _ => None,
        }
    }

    /// Entry hook for this mode
    pub fn entry_action(self) -> EntryAction {
        match self {
            Mode::Stopped => EntryAction::StopMotors,
            Mode::LineFollow => EntryAction::StartLineSensing,
            Mode::Dance => EntryAction::StartDance,
            Mode::TrimpotManual => EntryAction::StartTrimpotSampling,
        }
    }

    /// Whether the scheduler tick drives this mode
    pub fn is_tick_driven(self) -> bool {
        matches!(self, Mode::Dance)
    }
}

/// Which optional modes are part of the button cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModeSelection {
    pub line_follow: bool,
    pub dance: bool,
    pub trimpot: bool,
}

impl Default for ModeSelection {
    fn default() -> Self {
        // Trim-pot mode is skipped on the line-sensor board
        Self {
            line_follow: true,
            dance: true,
            trimpot: false,
        }
    }
}

/// Ordered set of modes visited by the mode button
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModeCycle {
    modes: Vec<Mode, 4>,
}

impl ModeCycle {
    /// Build the cycle from a selection, in mode index order
    pub fn new(selection: ModeSelection) -> Self {
        let mut modes = Vec::new();
        for mode in Mode::ALL {
            let enabled = match mode {
                Mode::Stopped => true,
                Mode::LineFollow => selection.line_follow,
                Mode::Dance => selection.dance,
                Mode::TrimpotManual => selection.trimpot,
            };
            if enabled {
                // Capacity equals Mode::ALL, cannot overflow
                let _ = modes.push(mode);
            }
        }
        Self { modes }
    }

    /// Build a cycle in an explicit order
    ///
    /// The cycle must start with [`Mode::Stopped`] and name each mode at most once.
    pub fn from_modes(order: &[Mode]) -> Result<Self, ConfigError> {
        if order.first() != Some(&Mode::Stopped) {
            return Err(ConfigError::InvalidModeCycle);
        }
        let mut modes = Vec::new();
        for &mode in order {
            if modes.contains(&mode) {
                return Err(ConfigError::InvalidModeCycle);
            }
            modes.push(mode).map_err(|_| ConfigError::InvalidModeCycle)?;
        }
        Ok(Self { modes })
    }

    /// Number of modes in the cycle
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// A cycle always holds at least `Stopped`
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Check if a mode is reachable
    pub fn contains(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    /// Modes in visiting order
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// Mode that follows `current`
    ///
    /// A mode outside the cycle falls back to `Stopped`.
    pub fn next(&self, current: Mode) -> Mode {
        match self.modes.iter().position(|&m| m == current) {
            Some(pos) => self.modes[(pos + 1) % self.modes.len()],
            None => Mode::Stopped,
        }
    }
}

impl Default for ModeCycle {
    fn default() -> Self {
        Self::new(ModeSelection::default())
    }
}

/// Current mode plus the cycle it moves through
#[derive(Debug, Clone)]
pub struct ModeMachine {
    cycle: ModeCycle,
    current: Mode,
}

impl ModeMachine {
    /// Start in `Stopped`
    pub fn new(cycle: ModeCycle) -> Self {
        Self {
            cycle,
            current: Mode::Stopped,
        }
    }

    /// Active mode
    pub fn current(&self) -> Mode {
        self.current
    }

    /// Cycle in use
    pub fn cycle(&self) -> &ModeCycle {
        &self.cycle
    }

    /// Move to the next mode and return it
    pub fn advance(&mut self) -> Mode {
        self.current = self.cycle.next(self.current);
        self.current
    }
}
