//! Motor output task
//!
//! Owns the H-bridge drive and applies every new target the controller
//! publishes.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::pwm::PwmOutput;

use linebot_core::traits::DriveOutput;
use linebot_drivers::motor::DifferentialDrive;

use crate::channels::DRIVE_CMD;

/// Drive wiring used by this board
pub type BoardDrive = DifferentialDrive<PwmOutput<'static>, PwmOutput<'static>, Output<'static>>;

/// Motor task - waits for drive targets and writes them out
#[embassy_executor::task]
pub async fn motor_task(mut drive: BoardDrive) {
    info!("Motor task started");

    if let Err(e) = drive.stop() {
        warn!("Failed to stop motors at startup: {}", e);
    }

    loop {
        let target = DRIVE_CMD.wait().await;
        trace!(
            "Drive L={} R={} {}",
            target.left_duty,
            target.right_duty,
            target.direction
        );

        if let Err(e) = drive.apply(target) {
            warn!("Drive output failed: {}", e);
        }
    }
}
