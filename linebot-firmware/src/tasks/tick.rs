//! Scheduler tick task
//!
//! Runs the controller's periodic body at the configured period:
//! button debouncing and mode changes, dance sequencing and the
//! heartbeat LED.

use defmt::*;
use embassy_rp::gpio::{Input, Level, Output};
use embassy_time::{Duration, Ticker};

use crate::channels::{SharedController, DRIVE_CMD, SAMPLING_WAKE, TONE_CMD};

/// Tick task - one controller tick per period
#[embassy_executor::task]
pub async fn tick_task(
    button: Input<'static>,
    mut led: Output<'static>,
    controller: &'static SharedController,
    tick_ms: u32,
) {
    info!("Tick task started ({} ms period)", tick_ms);

    let mut ticker = Ticker::every(Duration::from_millis(tick_ms as u64));

    loop {
        ticker.next().await;

        let level_high = button.is_high();
        let out = controller.lock(|cell| {
            let mut ctrl = cell.borrow_mut();
            let pressed = ctrl.button_level_pressed(level_high);
            ctrl.on_tick(pressed)
        });

        if let Some(mode) = out.mode {
            info!("Mode changed to {}", mode);
        }
        if let Some(sampling) = out.sampling {
            debug!("Sampling now {}", sampling);
            SAMPLING_WAKE.signal(());
        }
        if let Some(target) = out.drive {
            DRIVE_CMD.signal(target);
        }
        if let Some(tone) = out.tone {
            TONE_CMD.signal(tone);
        }
        if let Some(level) = out.heartbeat {
            led.set_level(Level::from(level));
        }
    }
}
