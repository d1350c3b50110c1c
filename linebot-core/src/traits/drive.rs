//! Drive output trait
//!
//! Implemented by the motor bridge driver. The controller produces a
//! [`DriveTarget`] and the implementation is responsible for writing the
//! PWM compare values and direction pins.

use crate::motor::DriveTarget;

/// Errors reported by a drive implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveError {
    /// PWM channel rejected the duty value
    Pwm,
    /// Direction pin could not be driven
    Pin,
}

/// Anything that can put a [`DriveTarget`] on the wheels
pub trait DriveOutput {
    /// Write both duty values and the direction outputs
    ///
    /// Writes take effect at the next PWM period boundary; implementations
    /// must not buffer them further.
    fn apply(&mut self, target: DriveTarget) -> Result<(), DriveError>;

    /// Stop both motors and release the bridge
    fn stop(&mut self) -> Result<(), DriveError> {
        self.apply(DriveTarget::stopped())
    }
}
