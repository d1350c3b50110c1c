//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals and the
//! shared controller.

pub mod beeper;
pub mod motor;
pub mod sampling;
pub mod tick;

pub use beeper::beeper_task;
pub use motor::{motor_task, BoardDrive};
pub use sampling::sampling_task;
pub use tick::tick_task;
