//! Configuration types
//!
//! Board-agnostic configuration loaded from the embedded `robot.toml`.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
