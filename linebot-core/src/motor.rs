//! Motor actuation
//!
//! Translates logical (motor, speed) commands into 10-bit PWM duty values
//! and a shared rotation-direction output. The actuation state is a
//! write-only shadow of the hardware compare registers: the control
//! algorithms write into it and never read it back for decisions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Top of the 10-bit PWM range
pub const MAX_DUTY: u16 = 1023;

/// Which wheel a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorSide {
    Left,
    Right,
}

/// Rotation direction shared by both motors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Both bridge inputs low (power-on state)
    #[default]
    Coast,
    /// Wheels drive the robot forward
    Forward,
    /// Wheels drive the robot backward
    Backward,
}

/// Ordinal speed scale used by the line follower and dance sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpeedLevel {
    Stop,
    Slow,
    SlowMed,
    Med,
    Fast,
}

impl SpeedLevel {
    /// Parse a level name as written in the config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stop" => Some(SpeedLevel::Stop),
            "slow" => Some(SpeedLevel::Slow),
            "slow_med" => Some(SpeedLevel::SlowMed),
            "med" => Some(SpeedLevel::Med),
            "fast" => Some(SpeedLevel::Fast),
            _ => None,
        }
    }
}

/// Duty-cycle magnitudes for each speed level
///
/// `Stop` is always 0 and is not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeedTable {
    pub slow: u16,
    pub slow_med: u16,
    pub med: u16,
    pub fast: u16,
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            slow: 750,
            slow_med: 800,
            med: 850,
            fast: 1000,
        }
    }
}

impl SpeedTable {
    /// Duty value for a speed level
    pub fn duty(&self, level: SpeedLevel) -> u16 {
        match level {
            SpeedLevel::Stop => 0,
            SpeedLevel::Slow => self.slow,
            SpeedLevel::SlowMed => self.slow_med,
            SpeedLevel::Med => self.med,
            SpeedLevel::Fast => self.fast,
        }
    }

    /// Check that every level fits the PWM range and the scale is ordered
    pub fn is_valid(&self) -> bool {
        self.fast <= MAX_DUTY
            && self.slow <= self.slow_med
            && self.slow_med <= self.med
            && self.med <= self.fast
    }
}

/// Snapshot of everything the drive hardware should output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveTarget {
    /// Left motor compare value (0-1023)
    pub left_duty: u16,
    /// Right motor compare value (0-1023)
    pub right_duty: u16,
    /// Direction applied to both motors
    pub direction: Direction,
}

impl DriveTarget {
    /// Both motors off, bridge coasting
    pub const fn stopped() -> Self {
        Self {
            left_duty: 0,
            right_duty: 0,
            direction: Direction::Coast,
        }
    }
}

/// Actuation shadow for both motors
#[derive(Debug, Clone)]
pub struct MotorActuation {
    speeds: SpeedTable,
    target: DriveTarget,
    changed: bool,
}

impl MotorActuation {
    pub fn new(speeds: SpeedTable) -> Self {
        Self {
            speeds,
            target: DriveTarget::stopped(),
            changed: false,
        }
    }

    /// Command a motor to a logical speed level
    pub fn set_motor_speed(&mut self, side: MotorSide, level: SpeedLevel) {
        let duty = self.speeds.duty(level);
        self.set_duty(side, duty);
    }

    /// Command a motor to a raw duty value, clamped to [`MAX_DUTY`]
    pub fn set_duty(&mut self, side: MotorSide, duty: u16) {
        let duty = duty.min(MAX_DUTY);
        let slot = match side {
            MotorSide::Left => &mut self.target.left_duty,
            MotorSide::Right => &mut self.target.right_duty,
        };
        if *slot != duty {
            *slot = duty;
            self.changed = true;
        }
    }

    /// Set both motors to the same pair of levels
    pub fn set_speeds(&mut self, left: SpeedLevel, right: SpeedLevel) {
        self.set_motor_speed(MotorSide::Left, left);
        self.set_motor_speed(MotorSide::Right, right);
    }

    /// Set the shared rotation direction
    pub fn set_direction(&mut self, direction: Direction) {
        if self.target.direction != direction {
            self.target.direction = direction;
            self.changed = true;
        }
    }

    /// Current output target
    pub fn target(&self) -> DriveTarget {
        self.target
    }

    /// Return the target if it changed since the last call
    pub fn take_changed(&mut self) -> Option<DriveTarget> {
        if self.changed {
            self.changed = false;
            Some(self.target)
        } else {
            None
        }
    }
}
