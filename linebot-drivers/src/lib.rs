//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in linebot-core,
//! written against the `embedded-hal` 1.0 traits:
//!
//! - Differential H-bridge drive for the two wheels
//! - Piezo tone PWM settings

#![no_std]
#![deny(unsafe_code)]

pub mod motor;
pub mod tone;
