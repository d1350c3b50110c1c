//! Two-motor H-bridge drive
//!
//! Each wheel has one PWM channel for speed and two bridge inputs for
//! direction:
//!
//! | Direction | in_a | in_b |
//! |-----------|------|------|
//! | Forward   | high | low  |
//! | Backward  | low  | high |
//! | Coast     | low  | low  |
//!
//! Duty values arrive on the 0-1023 scale of [`DriveTarget`] and are
//! rescaled to whatever resolution the PWM channel was configured with.
//!
//! ```ignore
//! let mut drive = DifferentialDrive::new(pwm_left, pwm_right, left_pins, right_pins);
//! drive.apply(target)?;
//! ```

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;
use linebot_core::motor::{Direction, DriveTarget, MAX_DUTY};
use linebot_core::traits::{DriveError, DriveOutput};

/// Direction inputs of one bridge half
pub struct BridgePins<O> {
    pub in_a: O,
    pub in_b: O,
}

impl<O: OutputPin> BridgePins<O> {
    pub fn new(in_a: O, in_b: O) -> Self {
        Self { in_a, in_b }
    }

    fn set(&mut self, direction: Direction) -> Result<(), DriveError> {
        let (a, b) = match direction {
            Direction::Forward => (PinState::High, PinState::Low),
            Direction::Backward => (PinState::Low, PinState::High),
            Direction::Coast => (PinState::Low, PinState::Low),
        };
        self.in_a.set_state(a).map_err(|_| DriveError::Pin)?;
        self.in_b.set_state(b).map_err(|_| DriveError::Pin)
    }
}

/// Left and right motors with a shared direction command
pub struct DifferentialDrive<PL, PR, O> {
    left_pwm: PL,
    right_pwm: PR,
    left_pins: BridgePins<O>,
    right_pins: BridgePins<O>,
    last: Option<DriveTarget>,
}

impl<PL, PR, O> DifferentialDrive<PL, PR, O>
where
    PL: SetDutyCycle,
    PR: SetDutyCycle,
    O: OutputPin,
{
    pub fn new(
        left_pwm: PL,
        right_pwm: PR,
        left_pins: BridgePins<O>,
        right_pins: BridgePins<O>,
    ) -> Self {
        Self {
            left_pwm,
            right_pwm,
            left_pins,
            right_pins,
            last: None,
        }
    }

    /// Last target written successfully
    pub fn last_applied(&self) -> Option<DriveTarget> {
        self.last
    }
}

impl<PL, PR, O> DriveOutput for DifferentialDrive<PL, PR, O>
where
    PL: SetDutyCycle,
    PR: SetDutyCycle,
    O: OutputPin,
{
    fn apply(&mut self, target: DriveTarget) -> Result<(), DriveError> {
        self.left_pins.set(target.direction)?;
        self.right_pins.set(target.direction)?;

        self.left_pwm
            .set_duty_cycle_fraction(target.left_duty.min(MAX_DUTY), MAX_DUTY)
            .map_err(|_| DriveError::Pwm)?;
        self.right_pwm
            .set_duty_cycle_fraction(target.right_duty.min(MAX_DUTY), MAX_DUTY)
            .map_err(|_| DriveError::Pwm)?;

        self.last = Some(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{self, ErrorKind as PinErrorKind};
    use embedded_hal::pwm::{self, ErrorKind as PwmErrorKind};

    struct FakePwm {
        max: u16,
        duty: u16,
        fail: bool,
    }

    impl FakePwm {
        fn new(max: u16) -> Self {
            Self {
                max,
                duty: 0,
                fail: false,
            }
        }
    }

    #[derive(Debug)]
    struct FakePwmError;

    impl pwm::Error for FakePwmError {
        fn kind(&self) -> PwmErrorKind {
            PwmErrorKind::Other
        }
    }

    impl pwm::ErrorType for FakePwm {
        type Error = FakePwmError;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            if self.fail {
                return Err(FakePwmError);
            }
            self.duty = duty;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct BrokenPinError;

    impl digital::Error for BrokenPinError {
        fn kind(&self) -> PinErrorKind {
            PinErrorKind::Other
        }
    }

    struct BrokenPin;

    impl digital::ErrorType for BrokenPin {
        type Error = BrokenPinError;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(BrokenPinError)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(BrokenPinError)
        }
    }

    fn drive(max: u16) -> DifferentialDrive<FakePwm, FakePwm, FakePin> {
        DifferentialDrive::new(
            FakePwm::new(max),
            FakePwm::new(max),
            BridgePins::new(FakePin::default(), FakePin::default()),
            BridgePins::new(FakePin::default(), FakePin::default()),
        )
    }

    fn pins(pins: &BridgePins<FakePin>) -> (bool, bool) {
        (pins.in_a.high, pins.in_b.high)
    }

    #[test]
    fn test_direction_truth_table() {
        let mut d = drive(MAX_DUTY);

        let cases = [
            (Direction::Forward, (true, false)),
            (Direction::Backward, (false, true)),
            (Direction::Coast, (false, false)),
        ];
        for (direction, expected) in cases {
            d.apply(DriveTarget {
                left_duty: 100,
                right_duty: 100,
                direction,
            })
            .unwrap();
            assert_eq!(pins(&d.left_pins), expected);
            assert_eq!(pins(&d.right_pins), expected);
        }
    }

    #[test]
    fn test_duty_passthrough_at_native_resolution() {
        let mut d = drive(MAX_DUTY);
        d.apply(DriveTarget {
            left_duty: 750,
            right_duty: 850,
            direction: Direction::Forward,
        })
        .unwrap();
        assert_eq!(d.left_pwm.duty, 750);
        assert_eq!(d.right_pwm.duty, 850);
    }

    #[test]
    fn test_duty_rescaled_to_channel() {
        let mut d = drive(2047);
        d.apply(DriveTarget {
            left_duty: MAX_DUTY,
            right_duty: 0,
            direction: Direction::Forward,
        })
        .unwrap();
        assert_eq!(d.left_pwm.duty, 2047);
        assert_eq!(d.right_pwm.duty, 0);
    }

    #[test]
    fn test_out_of_range_duty_is_clamped() {
        let mut d = drive(MAX_DUTY);
        d.apply(DriveTarget {
            left_duty: 5000,
            right_duty: 1,
            direction: Direction::Backward,
        })
        .unwrap();
        assert_eq!(d.left_pwm.duty, MAX_DUTY);
    }

    #[test]
    fn test_stop_zeroes_and_coasts() {
        let mut d = drive(MAX_DUTY);
        d.apply(DriveTarget {
            left_duty: 900,
            right_duty: 900,
            direction: Direction::Forward,
        })
        .unwrap();

        d.stop().unwrap();
        assert_eq!(d.left_pwm.duty, 0);
        assert_eq!(d.right_pwm.duty, 0);
        assert_eq!(pins(&d.left_pins), (false, false));
        assert_eq!(d.last_applied(), Some(DriveTarget::stopped()));
    }

    #[test]
    fn test_pwm_error_maps_to_drive_error() {
        let mut d = drive(MAX_DUTY);
        d.right_pwm.fail = true;
        let result = d.apply(DriveTarget::stopped());
        assert_eq!(result, Err(DriveError::Pwm));
        assert_eq!(d.last_applied(), None);
    }

    #[test]
    fn test_pin_error_maps_to_drive_error() {
        let mut d = DifferentialDrive::new(
            FakePwm::new(MAX_DUTY),
            FakePwm::new(MAX_DUTY),
            BridgePins::new(BrokenPin, BrokenPin),
            BridgePins::new(BrokenPin, BrokenPin),
        );
        assert_eq!(d.apply(DriveTarget::stopped()), Err(DriveError::Pin));
    }
}
