//! Driving algorithms
//!
//! One module per mode that moves the robot: line following from the
//! sensor array, the scripted dance, and manual trim-pot drive.

pub mod dance;
pub mod line;
pub mod trimpot;

pub use dance::{DanceSequence, DanceSequencer, Waypoint, MAX_WAYPOINTS};
pub use line::{LastSide, LineConfig, LineFollower, LineSensors, RulePrecedence};
pub use trimpot::{trimpot_drive, TrimpotConfig};
