//! Robot controller
//!
//! Aggregates all mutable behavior state and exposes the two events the
//! board feeds it: the periodic scheduler tick and a completed analog
//! conversion. Both handlers are synchronous and bounded; the firmware
//! runs each one inside a single critical section.

use crate::config::RobotConfig;
use crate::control::{trimpot_drive, DanceSequencer, LineFollower, LineSensors};
use crate::heartbeat::Heartbeat;
use crate::motor::{Direction, DriveTarget, MotorActuation, MotorSide, SpeedLevel};
use crate::sampling::{ConversionRequest, Sampler, SamplingMode};
use crate::state::{Debouncer, EntryAction, Mode, ModeMachine};
use crate::tone::ToneRequest;

/// Side effects of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutput {
    /// Mode entered on this tick
    pub mode: Option<Mode>,
    /// New motor output, if it changed
    pub drive: Option<DriveTarget>,
    /// Beep to play
    pub tone: Option<ToneRequest>,
    /// New status LED level, if it toggled
    pub heartbeat: Option<bool>,
    /// Sampling configuration after a mode change
    pub sampling: Option<SamplingMode>,
}

/// Side effects of one completed conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleOutput {
    /// New motor output, if it changed
    pub drive: Option<DriveTarget>,
    /// Conversion to start next
    pub next: Option<ConversionRequest>,
}

/// Complete behavior state of the robot
#[derive(Debug, Clone)]
pub struct Controller {
    active_low: bool,
    trimpot_channel: u8,
    modes: ModeMachine,
    debouncer: Debouncer,
    sampler: Sampler,
    line: LineFollower,
    dance: DanceSequencer,
    actuation: MotorActuation,
    heartbeat: Heartbeat,
}

impl Controller {
    /// Power-on state: `Stopped`, sampling idle, motors off
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            active_low: config.button.active_low,
            trimpot_channel: config.trimpot.channel,
            modes: ModeMachine::new(config.mode_cycle()),
            debouncer: Debouncer::new(),
            sampler: Sampler::new(),
            line: LineFollower::new(config.line),
            dance: DanceSequencer::new(config.dance.clone()),
            actuation: MotorActuation::new(config.speed),
            heartbeat: Heartbeat::new(config.heartbeat_ticks),
        }
    }

    /// Active mode
    pub fn mode(&self) -> Mode {
        self.modes.current()
    }

    /// Current motor output
    pub fn drive(&self) -> DriveTarget {
        self.actuation.target()
    }

    /// Current sampling configuration
    pub fn sampling_mode(&self) -> SamplingMode {
        self.sampler.mode()
    }

    /// Conversion the board should start next, if any
    pub fn request(&self) -> Option<ConversionRequest> {
        self.sampler.request()
    }

    /// Line detection state
    pub fn line_sensors(&self) -> &LineSensors {
        self.line.sensors()
    }

    /// Ticks since the dance was entered
    pub fn dance_counter(&self) -> u32 {
        self.dance.counter()
    }

    /// Whether a raw button input level means "pressed"
    pub fn button_level_pressed(&self, level_high: bool) -> bool {
        crate::state::button::is_pressed(level_high, self.active_low)
    }

    /// Move to the next mode in the cycle and run its entry action
    ///
    /// Returns the tone announcing the new mode.
    pub fn advance_mode(&mut self) -> ToneRequest {
        let mode = self.modes.advance();
        self.enter(mode.entry_action());
        ToneRequest::for_mode(mode)
    }

    fn enter(&mut self, action: EntryAction) {
        match action {
            EntryAction::StopMotors => {
                self.actuation.set_speeds(SpeedLevel::Stop, SpeedLevel::Stop);
            }
            EntryAction::StartLineSensing => {
                self.sampler.configure(SamplingMode::RoundRobin);
                self.actuation.set_direction(Direction::Forward);
            }
            EntryAction::StartTrimpotSampling => {
                self.sampler.configure(SamplingMode::FreeRunning {
                    channel: self.trimpot_channel,
                });
            }
            EntryAction::StartDance => {
                self.dance.reset();
                self.actuation.set_direction(Direction::Forward);
            }
        }
    }

    /// Scheduler tick
    ///
    /// Debounces the button (possibly changing mode), runs the per-tick
    /// body of the active mode, then the heartbeat.
    pub fn on_tick(&mut self, button_pressed: bool) -> TickOutput {
        let mut out = TickOutput::default();

        if self.debouncer.sample(button_pressed) {
            out.tone = Some(self.advance_mode());
            out.mode = Some(self.mode());
            out.sampling = Some(self.sampler.mode());
        }

        if self.mode().is_tick_driven() {
            self.dance.tick(&mut self.actuation);
        }

        out.heartbeat = self.heartbeat.tick();
        out.drive = self.actuation.take_changed();
        out
    }

    /// Completed conversion for `request`
    ///
    /// Stale completions are dropped; accepted samples are routed to the
    /// active mode.
    pub fn on_sample(&mut self, request: ConversionRequest, value: u8) -> SampleOutput {
        if let Some(sample) = self.sampler.complete(request, value) {
            match self.mode() {
                Mode::Stopped => {
                    self.actuation.set_speeds(SpeedLevel::Stop, SpeedLevel::Stop);
                }
                Mode::LineFollow => {
                    let (left, right) = self.line.update(sample);
                    self.actuation.set_direction(Direction::Forward);
                    self.actuation.set_speeds(left, right);
                }
                Mode::TrimpotManual => {
                    if sample.channel == self.trimpot_channel {
                        let (direction, duty) = trimpot_drive(sample.value);
                        self.actuation.set_direction(direction);
                        self.actuation.set_duty(MotorSide::Left, duty);
                        self.actuation.set_duty(MotorSide::Right, duty);
                    }
                }
                Mode::Dance => {}
            }
        }

        SampleOutput {
            drive: self.actuation.take_changed(),
            next: self.sampler.request(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ModeCycle, ModeSelection};
    use proptest::prelude::*;

    fn press(ctrl: &mut Controller) -> TickOutput {
        ctrl.on_tick(true);
        ctrl.on_tick(false)
    }

    fn trimpot_config() -> RobotConfig {
        let mut config = RobotConfig::default();
        config.mode_order = Some(
            ModeCycle::from_modes(&[Mode::Stopped, Mode::TrimpotManual, Mode::Dance]).unwrap(),
        );
        config
    }

    #[test]
    fn test_power_on_state() {
        let ctrl = Controller::new(&RobotConfig::default());
        assert_eq!(ctrl.mode(), Mode::Stopped);
        assert_eq!(ctrl.drive(), DriveTarget::stopped());
        assert_eq!(ctrl.sampling_mode(), SamplingMode::Idle);
        assert_eq!(ctrl.request(), None);
    }

    #[test]
    fn test_press_and_release_enters_line_follow() {
        let mut ctrl = Controller::new(&RobotConfig::default());

        let held = ctrl.on_tick(true);
        assert_eq!(held.mode, None);
        assert_eq!(ctrl.mode(), Mode::Stopped);

        let out = ctrl.on_tick(false);
        assert_eq!(out.mode, Some(Mode::LineFollow));
        assert_eq!(
            out.tone,
            Some(ToneRequest {
                frequency_hz: 110,
                duration_ms: 250
            })
        );
        assert_eq!(out.sampling, Some(SamplingMode::RoundRobin));
        assert_eq!(
            out.drive,
            Some(DriveTarget {
                left_duty: 0,
                right_duty: 0,
                direction: Direction::Forward
            })
        );
        assert_eq!(ctrl.request().map(|r| r.channel), Some(0));
    }

    #[test]
    fn test_outer_left_sweep_end_to_end() {
        let mut ctrl = Controller::new(&RobotConfig::default());
        press(&mut ctrl);
        assert_eq!(ctrl.mode(), Mode::LineFollow);

        for expected_channel in 0..4u8 {
            let req = ctrl.request().unwrap();
            assert_eq!(req.channel, expected_channel);
            let value = if req.channel == 3 { 250 } else { 10 };
            ctrl.on_sample(req, value);
        }

        assert_eq!(
            ctrl.drive(),
            DriveTarget {
                left_duty: 750,
                right_duty: 850,
                direction: Direction::Forward
            }
        );
        assert!(ctrl.line_sensors().outer_left);
    }

    #[test]
    fn test_holding_button_does_not_advance() {
        let mut ctrl = Controller::new(&RobotConfig::default());
        for _ in 0..50 {
            assert_eq!(ctrl.on_tick(true).mode, None);
        }
        assert_eq!(ctrl.mode(), Mode::Stopped);
        assert_eq!(ctrl.on_tick(false).mode, Some(Mode::LineFollow));
    }

    #[test]
    fn test_full_cycle_returns_to_stopped_with_motors_off() {
        let mut ctrl = Controller::new(&RobotConfig::default());
        press(&mut ctrl);
        let req = ctrl.request().unwrap();
        ctrl.on_sample(req, 0);
        assert_ne!(ctrl.drive().left_duty, 0);

        assert_eq!(press(&mut ctrl).mode, Some(Mode::Dance));
        assert_eq!(press(&mut ctrl).mode, Some(Mode::Stopped));
        assert_eq!(ctrl.drive().left_duty, 0);
        assert_eq!(ctrl.drive().right_duty, 0);
    }

    #[test]
    fn test_dance_runs_on_ticks_and_ignores_samples() {
        let mut ctrl = Controller::new(&RobotConfig::default());
        press(&mut ctrl);
        let out = press(&mut ctrl);
        assert_eq!(out.mode, Some(Mode::Dance));
        // Waypoint 0 applies on the entry tick
        assert_eq!(ctrl.drive().left_duty, 850);
        assert_eq!(ctrl.dance_counter(), 1);

        let before = ctrl.drive();
        let req = ctrl.request().unwrap();
        let out = ctrl.on_sample(req, 255);
        assert_eq!(out.drive, None);
        assert_eq!(ctrl.drive(), before);

        for _ in 1..=100 {
            ctrl.on_tick(false);
        }
        assert_eq!(ctrl.drive().left_duty, 0);
        assert_eq!(ctrl.drive().right_duty, 850);
    }

    #[test]
    fn test_dance_restarts_on_reentry() {
        let mut ctrl = Controller::new(&RobotConfig::default());
        press(&mut ctrl);
        press(&mut ctrl);
        for _ in 0..700 {
            ctrl.on_tick(false);
        }
        assert_eq!(ctrl.drive().left_duty, 0);

        press(&mut ctrl);
        press(&mut ctrl);
        let out = press(&mut ctrl);
        assert_eq!(out.mode, Some(Mode::Dance));
        assert_eq!(ctrl.dance_counter(), 1);
        assert_eq!(ctrl.drive().left_duty, 850);
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut ctrl = Controller::new(&RobotConfig::default());
        press(&mut ctrl);
        let stale = ctrl.request().unwrap();

        // Leave and re-enter line following; the old request is obsolete
        press(&mut ctrl);
        press(&mut ctrl);
        press(&mut ctrl);
        assert_eq!(ctrl.mode(), Mode::LineFollow);

        let out = ctrl.on_sample(stale, 250);
        assert_eq!(out.drive, None);
        assert_eq!(ctrl.request().map(|r| r.channel), Some(0));
    }

    #[test]
    fn test_line_flags_persist_across_modes() {
        let mut ctrl = Controller::new(&RobotConfig::default());
        press(&mut ctrl);
        let req = ctrl.request().unwrap();
        ctrl.on_sample(req, 250);
        assert!(ctrl.line_sensors().outer_right);

        press(&mut ctrl);
        press(&mut ctrl);
        press(&mut ctrl);
        assert!(ctrl.line_sensors().outer_right);
    }

    #[test]
    fn test_trimpot_drive() {
        let mut ctrl = Controller::new(&trimpot_config());
        let out = press(&mut ctrl);
        assert_eq!(out.mode, Some(Mode::TrimpotManual));
        assert_eq!(out.sampling, Some(SamplingMode::FreeRunning { channel: 0 }));

        let req = ctrl.request().unwrap();
        let out = ctrl.on_sample(req, 0);
        assert_eq!(
            out.drive,
            Some(DriveTarget {
                left_duty: 1023,
                right_duty: 1023,
                direction: Direction::Forward
            })
        );
        assert_eq!(out.next, Some(req));

        let out = ctrl.on_sample(req, 255);
        assert_eq!(out.drive.map(|d| d.direction), Some(Direction::Backward));
    }

    #[test]
    fn test_stopped_samples_zero_motors() {
        let mut ctrl = Controller::new(&trimpot_config());
        press(&mut ctrl);
        let req = ctrl.request().unwrap();
        ctrl.on_sample(req, 0);

        press(&mut ctrl);
        press(&mut ctrl);
        assert_eq!(ctrl.mode(), Mode::Stopped);

        // Sampling keeps running in Stopped; every completion holds the motors at zero
        let req = ctrl.request().unwrap();
        ctrl.on_sample(req, 0);
        assert_eq!(ctrl.drive().left_duty, 0);
        assert_eq!(ctrl.drive().right_duty, 0);
    }

    #[test]
    fn test_heartbeat_in_tick_output() {
        let mut ctrl = Controller::new(&RobotConfig::default());
        assert_eq!(ctrl.on_tick(false).heartbeat, Some(true));
        for _ in 1..10 {
            assert_eq!(ctrl.on_tick(false).heartbeat, None);
        }
        assert_eq!(ctrl.on_tick(false).heartbeat, Some(false));
    }

    #[test]
    fn test_button_level_polarity() {
        let ctrl = Controller::new(&RobotConfig::default());
        assert!(ctrl.button_level_pressed(false));
        assert!(!ctrl.button_level_pressed(true));

        let mut config = RobotConfig::default();
        config.button.active_low = false;
        let ctrl = Controller::new(&config);
        assert!(ctrl.button_level_pressed(true));
    }

    proptest! {
        #[test]
        fn prop_mode_always_in_cycle(
            presses in proptest::collection::vec(any::<bool>(), 0..200),
            trimpot in any::<bool>(),
        ) {
            let mut config = RobotConfig::default();
            config.modes = ModeSelection { line_follow: true, dance: true, trimpot };
            let cycle = config.mode_cycle();
            let mut ctrl = Controller::new(&config);

            for pressed in presses {
                ctrl.on_tick(pressed);
                prop_assert!(cycle.contains(ctrl.mode()));
            }
        }
    }
}
