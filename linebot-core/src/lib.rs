//! Board-agnostic behavior logic for the line-following robot
//!
//! This crate contains everything that does not depend on a specific
//! board:
//!
//! - Mode state machine and button debouncing
//! - Analog sampling pipeline state
//! - Line follower, dance sequencer and trim-pot drive
//! - Motor actuation shadow and the drive output trait
//! - Controller aggregate fed by the tick and sample events
//! - Configuration types and the `robot.toml` parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
pub mod control;
pub mod controller;
pub mod heartbeat;
pub mod motor;
pub mod sampling;
pub mod state;
pub mod tone;
pub mod traits;

pub use controller::{Controller, SampleOutput, TickOutput};
