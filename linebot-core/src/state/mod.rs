//! Mode state machine and the button that drives it

pub mod button;
pub mod machine;

pub use button::Debouncer;
pub use machine::{EntryAction, Mode, ModeCycle, ModeMachine, ModeSelection};
