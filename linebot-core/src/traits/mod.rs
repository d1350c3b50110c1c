//! Hardware abstraction traits
//!
//! These traits define the interface between the behavior logic
//! and board-specific actuator implementations.

pub mod drive;

pub use drive::{DriveError, DriveOutput};
