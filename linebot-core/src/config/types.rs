//! Robot configuration types

use crate::control::{DanceSequence, LineConfig, TrimpotConfig};
use crate::motor::SpeedTable;
use crate::sampling::LINE_CHANNELS;
use crate::state::{ModeCycle, ModeSelection};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Scheduler period of zero
    InvalidTick,
    /// Heartbeat divider of zero
    InvalidHeartbeat,
    /// Speed levels out of order or above the PWM range
    InvalidSpeedTable,
    /// Line margin leaves no detection range
    InvalidMargin,
    /// Converter channel outside the sensor array
    InvalidChannel,
    /// Mode order does not start with `stopped` or repeats a mode
    InvalidModeCycle,
    /// Dance thresholds not strictly increasing, or stop before the last waypoint
    DanceOrder,
    /// More dance waypoints than fit in the sequence
    DanceTooLong,
}

/// Mode button wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ButtonConfig {
    /// Input reads low while pressed (pulled-up switch to ground)
    pub active_low: bool,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self { active_low: true }
    }
}

/// Piezo output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeeperConfig {
    /// Play mode-change tones
    pub enabled: bool,
}

/// Complete robot configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RobotConfig {
    /// Scheduler period in milliseconds
    pub tick_ms: u32,
    /// Scheduler ticks per status LED toggle
    pub heartbeat_ticks: u16,
    pub button: ButtonConfig,
    /// Optional modes in the button cycle
    pub modes: ModeSelection,
    /// Explicit cycle order, overrides `modes` when set
    pub mode_order: Option<ModeCycle>,
    pub speed: SpeedTable,
    pub line: LineConfig,
    pub trimpot: TrimpotConfig,
    pub beeper: BeeperConfig,
    pub dance: DanceSequence,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            heartbeat_ticks: 10,
            button: ButtonConfig::default(),
            modes: ModeSelection::default(),
            mode_order: None,
            speed: SpeedTable::default(),
            line: LineConfig::default(),
            trimpot: TrimpotConfig::default(),
            beeper: BeeperConfig::default(),
            dance: DanceSequence::default(),
        }
    }
}

impl RobotConfig {
    /// Cycle visited by the mode button
    pub fn mode_cycle(&self) -> ModeCycle {
        match &self.mode_order {
            Some(order) => order.clone(),
            None => ModeCycle::new(self.modes),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::InvalidTick);
        }
        if self.heartbeat_ticks == 0 {
            return Err(ConfigError::InvalidHeartbeat);
        }
        if !self.speed.is_valid() {
            return Err(ConfigError::InvalidSpeedTable);
        }
        if self.line.margin == u8::MAX {
            return Err(ConfigError::InvalidMargin);
        }
        if self.trimpot.channel >= LINE_CHANNELS {
            return Err(ConfigError::InvalidChannel);
        }
        if let Some(order) = &self.mode_order {
            ModeCycle::from_modes(order.modes())?;
        }
        DanceSequence::new(self.dance.waypoints(), self.dance.stop_tick())?;
        Ok(())
    }
}
