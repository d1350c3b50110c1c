//! Inter-task communication
//!
//! The controller is shared by the tick and sampling tasks behind a
//! blocking critical-section mutex, so each event handler runs to
//! completion without being interleaved with the other. Results that
//! need hardware access are handed to the owning task through signals.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use linebot_core::motor::DriveTarget;
use linebot_core::tone::ToneRequest;
use linebot_core::Controller;

/// Controller state shared between the tick and sampling tasks
pub type SharedController = Mutex<CriticalSectionRawMutex, RefCell<Controller>>;

/// Latest motor output (only the newest value matters)
pub static DRIVE_CMD: Signal<CriticalSectionRawMutex, DriveTarget> = Signal::new();

/// Mode-change beep
pub static TONE_CMD: Signal<CriticalSectionRawMutex, ToneRequest> = Signal::new();

/// Sampling configuration changed, wake the sampling task if idle
pub static SAMPLING_WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
