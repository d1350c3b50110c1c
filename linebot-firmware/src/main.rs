//! Line-following robot firmware
//!
//! Main firmware binary for an RP2040 robot with four reflectance
//! sensors, two H-bridge driven wheels, a mode button and a piezo.
//!
//! Pin assignments:
//!
//! | Function            | GPIO         |
//! |---------------------|--------------|
//! | Sensors ch0-ch3     | 26, 27, 28, 29 (ADC0-3) |
//! | Left/right PWM      | 16, 17 (slice 0 A/B) |
//! | Left bridge in_a/b  | 18, 19       |
//! | Right bridge in_a/b | 20, 21       |
//! | Mode button         | 15           |
//! | Beeper              | 14 (slice 7 A) |
//! | Status LED          | 25           |

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_sync::blocking_mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use linebot_core::config::{parse_config, RobotConfig};
use linebot_core::motor::MAX_DUTY;
use linebot_core::Controller;
use linebot_drivers::motor::{BridgePins, DifferentialDrive};

use crate::channels::SharedController;

/// Embedded configuration (compiled into firmware)
/// Edit robot.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../robot.toml");

/// Motor PWM clock divider: 125 MHz / 16 / 1024 is about 7.6 kHz
const MOTOR_PWM_DIVIDER: u8 = 16;

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

static CONTROLLER: StaticCell<SharedController> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Linebot firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    info!(
        "Config: tick={}ms threshold={} beeper={}",
        config.tick_ms,
        config.line.threshold(),
        config.beeper.enabled
    );

    // Line sensors on ADC0-ADC3, channel n = sensor n
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let sensors = [
        Channel::new_pin(p.PIN_26, Pull::None),
        Channel::new_pin(p.PIN_27, Pull::None),
        Channel::new_pin(p.PIN_28, Pull::None),
        Channel::new_pin(p.PIN_29, Pull::None),
    ];
    info!("ADC initialized");

    // Both wheels share one PWM slice so their periods stay aligned
    let mut motor_pwm_config = PwmConfig::default();
    motor_pwm_config.top = MAX_DUTY;
    motor_pwm_config.divider = MOTOR_PWM_DIVIDER.into();
    motor_pwm_config.compare_a = 0;
    motor_pwm_config.compare_b = 0;
    let motor_pwm = Pwm::new_output_ab(p.PWM_SLICE0, p.PIN_16, p.PIN_17, motor_pwm_config);
    let (Some(left_pwm), Some(right_pwm)) = motor_pwm.split() else {
        error!("Motor PWM outputs unavailable");
        return;
    };

    let left_pins = BridgePins::new(
        Output::new(p.PIN_18, Level::Low),
        Output::new(p.PIN_19, Level::Low),
    );
    let right_pins = BridgePins::new(
        Output::new(p.PIN_20, Level::Low),
        Output::new(p.PIN_21, Level::Low),
    );
    let drive = DifferentialDrive::new(left_pwm, right_pwm, left_pins, right_pins);
    info!("Motor drive initialized");

    let pull = if config.button.active_low {
        Pull::Up
    } else {
        Pull::Down
    };
    let button = Input::new(p.PIN_15, pull);
    let led = Output::new(p.PIN_25, Level::Low);

    let beeper = Pwm::new_output_a(p.PWM_SLICE7, p.PIN_14, PwmConfig::default());

    let controller: &'static SharedController =
        CONTROLLER.init(Mutex::new(RefCell::new(Controller::new(&config))));

    spawner.spawn(tasks::motor_task(drive)).unwrap();
    spawner.spawn(tasks::beeper_task(beeper, config.beeper.enabled)).unwrap();
    spawner.spawn(tasks::sampling_task(adc, sensors, controller)).unwrap();
    spawner.spawn(tasks::tick_task(button, led, controller, config.tick_ms)).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Parse the embedded robot.toml
///
/// build.rs runs the same parser over robot.toml, so a failure here means
/// the embedded file and the core parser are out of step. Falls back to
/// the built-in defaults.
fn load_config() -> RobotConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            error!("Using built-in defaults");
            RobotConfig::default()
        }
    }
}
