//! Analog sampling task
//!
//! Converts whichever channel the controller asks for, one conversion
//! at a time, and feeds each result back through `on_sample`. While
//! sampling is idle the task sleeps until a mode change wakes it.

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::Timer;

use linebot_core::sampling::{to_8bit, LINE_CHANNELS};

use crate::channels::{SharedController, DRIVE_CMD, SAMPLING_WAKE};

/// RP2040 ADC resolution
const ADC_BITS: u8 = 12;

/// Back-off after a failed conversion
const RETRY_DELAY_MS: u64 = 1;

/// Sampling task
///
/// `channels[n]` must be wired to sensor channel `n`.
#[embassy_executor::task]
pub async fn sampling_task(
    mut adc: Adc<'static, Async>,
    mut channels: [Channel<'static>; LINE_CHANNELS as usize],
    controller: &'static SharedController,
) {
    info!("Sampling task started");

    loop {
        let request = controller.lock(|cell| cell.borrow().request());
        let Some(request) = request else {
            SAMPLING_WAKE.wait().await;
            continue;
        };

        let Some(channel) = channels.get_mut(request.channel as usize) else {
            warn!("Conversion requested on unknown channel {}", request.channel);
            SAMPLING_WAKE.wait().await;
            continue;
        };

        let raw = match adc.read(channel).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("ADC read failed on channel {}: {:?}", request.channel, Debug2Format(&e));
                Timer::after_millis(RETRY_DELAY_MS).await;
                continue;
            }
        };

        let value = to_8bit(raw, ADC_BITS);
        trace!("ch{} = {}", request.channel, value);

        let out = controller.lock(|cell| cell.borrow_mut().on_sample(request, value));
        if let Some(target) = out.drive {
            DRIVE_CMD.signal(target);
        }

        // Conversions complete quickly; let the tick task in between them
        yield_now().await;
    }
}
