//! Piezo beeper task
//!
//! Plays mode-change tones on one PWM output. With the beeper disabled
//! in the configuration requests are only logged.

use defmt::*;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Timer;

use linebot_drivers::tone::tone_pwm;

use crate::channels::TONE_CMD;

/// Beeper task
#[embassy_executor::task]
pub async fn beeper_task(mut pwm: Pwm<'static>, enabled: bool) {
    info!("Beeper task started (enabled={})", enabled);

    let mut config = PwmConfig::default();
    config.compare_a = 0;
    pwm.set_config(&config);

    loop {
        let tone = TONE_CMD.wait().await;

        if !enabled {
            debug!("Tone {} Hz for {} ms (beeper disabled)", tone.frequency_hz, tone.duration_ms);
            continue;
        }

        let Some(settings) = tone_pwm(clk_sys_freq(), tone.frequency_hz) else {
            warn!("Tone {} Hz out of range", tone.frequency_hz);
            continue;
        };

        config.divider = settings.divider.into();
        config.top = settings.top;
        config.compare_a = settings.compare;
        pwm.set_config(&config);

        Timer::after_millis(tone.duration_ms as u64).await;

        config.compare_a = 0;
        pwm.set_config(&config);
    }
}
