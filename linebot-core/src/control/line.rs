//! Line-following controller
//!
//! Four reflectance sensors are thresholded into "line detected" flags.
//! The flags, plus the side that last saw the line, select a pair of
//! wheel speeds from a fixed rule list. This is a rule table, not a
//! proportional controller.
//!
//! Sensor channels, as seen from behind the robot:
//!
//! ```text
//!   3           2           1           0
//! outer-left  inner-left  inner-right  outer-right
//! ```

use crate::motor::SpeedLevel;
use crate::sampling::Sample;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Full-scale 8-bit sensor reading
pub const SENSOR_MAX: u8 = 255;

/// How the two rule chains combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RulePrecedence {
    /// Outer-left wins outright; otherwise the remaining rules run in order,
    /// with the inner-left rule overwriting the both-inner rule
    #[default]
    Priority,
    /// The outer-left/both-inner chain is evaluated first and the second
    /// chain always overwrites it, as the first board revision did
    TwoPass,
}

/// Line detector configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineConfig {
    /// Distance below full scale that still counts as "on the line"
    pub margin: u8,
    /// Rule combination
    pub precedence: RulePrecedence,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            margin: 20,
            precedence: RulePrecedence::Priority,
        }
    }
}

impl LineConfig {
    /// A sample strictly above this value is a detection
    pub fn threshold(&self) -> u8 {
        SENSOR_MAX.saturating_sub(self.margin)
    }
}

/// Side of the robot that most recently detected the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LastSide {
    /// No sensor has seen the line yet
    #[default]
    Unknown,
    Left,
    Right,
}

/// Per-channel detection flags plus the sticky side memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineSensors {
    pub outer_left: bool,
    pub inner_left: bool,
    pub inner_right: bool,
    pub outer_right: bool,
    pub last_side: LastSide,
}

impl LineSensors {
    /// Record a detection result for one channel
    ///
    /// Unknown channels are ignored.
    pub fn record(&mut self, channel: u8, detected: bool) {
        let (flag, side) = match channel {
            3 => (&mut self.outer_left, LastSide::Left),
            2 => (&mut self.inner_left, LastSide::Left),
            1 => (&mut self.inner_right, LastSide::Right),
            0 => (&mut self.outer_right, LastSide::Right),
            _ => return,
        };
        *flag = detected;
        if detected {
            self.last_side = side;
        }
    }

    /// Wheel speeds for the current flags, as `(left, right)`
    pub fn resolve(&self, precedence: RulePrecedence) -> (SpeedLevel, SpeedLevel) {
        use SpeedLevel::*;

        let mut wheels = Wheels::new();

        if self.outer_left {
            wheels.set(Slow, Med);
            if precedence == RulePrecedence::Priority {
                return wheels.pair();
            }
        } else if self.inner_left && self.inner_right {
            wheels.set(Med, Med);
        }

        // Second chain, always evaluated: overwrites the both-inner rule
        if self.inner_left {
            wheels.set(SlowMed, Med);
        } else if self.inner_right {
            wheels.set(Med, SlowMed);
        } else if self.outer_right {
            wheels.set(Med, Slow);
        } else if self.last_side == LastSide::Left {
            wheels.set(Stop, Med);
        } else if self.last_side == LastSide::Right {
            wheels.set(Med, Stop);
        } else {
            wheels.set(Med, Med);
        }

        wheels.pair()
    }
}

/// Last written speed pair, in rule order
struct Wheels {
    left: SpeedLevel,
    right: SpeedLevel,
}

impl Wheels {
    fn new() -> Self {
        Self {
            left: SpeedLevel::Stop,
            right: SpeedLevel::Stop,
        }
    }

    fn set(&mut self, left: SpeedLevel, right: SpeedLevel) {
        self.left = left;
        self.right = right;
    }

    fn pair(&self) -> (SpeedLevel, SpeedLevel) {
        (self.left, self.right)
    }
}

/// Threshold detector plus rule evaluation
#[derive(Debug, Clone, Default)]
pub struct LineFollower {
    config: LineConfig,
    sensors: LineSensors,
}

impl LineFollower {
    pub fn new(config: LineConfig) -> Self {
        Self {
            config,
            sensors: LineSensors::default(),
        }
    }

    /// Current detection state
    pub fn sensors(&self) -> &LineSensors {
        &self.sensors
    }

    /// Fold one sample into the flags and return the resulting wheel speeds
    pub fn update(&mut self, sample: Sample) -> (SpeedLevel, SpeedLevel) {
        let detected = sample.value > self.config.threshold();
        self.sensors.record(sample.channel, detected);
        self.sensors.resolve(self.config.precedence)
    }
}
