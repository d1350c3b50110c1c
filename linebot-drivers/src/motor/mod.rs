//! Motor driver implementations
//!
//! - Differential drive: two PWM channels plus H-bridge direction pins

pub mod differential;

pub use differential::{BridgePins, DifferentialDrive};
