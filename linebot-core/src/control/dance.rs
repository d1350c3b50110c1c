//! Dance choreography sequencer
//!
//! An open-loop script of wheel speeds indexed by scheduler ticks. Each
//! waypoint fires once, when the tick counter reaches its threshold, and
//! its speeds persist until the next waypoint. Past the stop threshold
//! both wheels are held at `Stop` on every tick.

use heapless::Vec;

use crate::config::ConfigError;
use crate::motor::{MotorActuation, SpeedLevel};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum waypoints per sequence
pub const MAX_WAYPOINTS: usize = 16;

/// One scripted speed change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waypoint {
    /// Tick count at which the speeds are applied
    pub tick: u32,
    pub left: SpeedLevel,
    pub right: SpeedLevel,
}

impl Waypoint {
    pub const fn new(tick: u32, left: SpeedLevel, right: SpeedLevel) -> Self {
        Self { tick, left, right }
    }
}

/// Validated choreography
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DanceSequence {
    waypoints: Vec<Waypoint, MAX_WAYPOINTS>,
    stop_tick: u32,
}

impl DanceSequence {
    /// Build a sequence
    ///
    /// Waypoint ticks must be strictly increasing and `stop_tick` must not
    /// come before the last waypoint.
    pub fn new(waypoints: &[Waypoint], stop_tick: u32) -> Result<Self, ConfigError> {
        let mut list = Vec::new();
        let mut previous: Option<u32> = None;

        for wp in waypoints {
            if previous.is_some_and(|prev| wp.tick <= prev) {
                return Err(ConfigError::DanceOrder);
            }
            previous = Some(wp.tick);
            list.push(*wp).map_err(|_| ConfigError::DanceTooLong)?;
        }

        if previous.is_some_and(|last| stop_tick < last) {
            return Err(ConfigError::DanceOrder);
        }

        Ok(Self {
            waypoints: list,
            stop_tick,
        })
    }

    /// Scripted waypoints in tick order
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Tick from which both wheels are held stopped
    pub fn stop_tick(&self) -> u32 {
        self.stop_tick
    }

    /// Waypoint that fires exactly at `tick`
    pub fn waypoint_at(&self, tick: u32) -> Option<&Waypoint> {
        self.waypoints
            .binary_search_by_key(&tick, |wp| wp.tick)
            .ok()
            .map(|idx| &self.waypoints[idx])
    }
}

impl Default for DanceSequence {
    fn default() -> Self {
        use SpeedLevel::*;

        let waypoints = [
            Waypoint::new(0, Med, Med),
            Waypoint::new(100, Stop, Med),
            Waypoint::new(200, Stop, Stop),
            Waypoint::new(250, Fast, Med),
            Waypoint::new(450, Fast, Stop),
        ];

        let mut list = Vec::new();
        for wp in waypoints {
            // Five entries always fit
            let _ = list.push(wp);
        }
        Self {
            waypoints: list,
            stop_tick: 600,
        }
    }
}

/// Tick counter walking a [`DanceSequence`]
#[derive(Debug, Clone)]
pub struct DanceSequencer {
    sequence: DanceSequence,
    counter: u32,
}

impl DanceSequencer {
    pub fn new(sequence: DanceSequence) -> Self {
        Self {
            sequence,
            counter: 0,
        }
    }

    /// Restart the choreography from tick 0
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Ticks elapsed since the last reset
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Whether the stop threshold has been reached
    pub fn is_finished(&self) -> bool {
        self.counter >= self.sequence.stop_tick
    }

    /// Run one scheduler tick
    pub fn tick(&mut self, actuation: &mut MotorActuation) {
        if let Some(wp) = self.sequence.waypoint_at(self.counter) {
            actuation.set_speeds(wp.left, wp.right);
        }

        if self.is_finished() {
            actuation.set_speeds(SpeedLevel::Stop, SpeedLevel::Stop);
        }

        self.counter = self.counter.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::{DriveTarget, SpeedTable};
    use SpeedLevel::*;

    fn duties(target: DriveTarget) -> (u16, u16) {
        (target.left_duty, target.right_duty)
    }

    #[test]
    fn test_default_sequence_is_valid() {
        let seq = DanceSequence::default();
        let rebuilt = DanceSequence::new(seq.waypoints(), seq.stop_tick()).unwrap();
        assert_eq!(rebuilt, seq);
        assert_eq!(seq.waypoints().len(), 5);
        assert_eq!(seq.stop_tick(), 600);
    }

    #[test]
    fn test_rejects_unordered_waypoints() {
        let wps = [Waypoint::new(10, Med, Med), Waypoint::new(10, Stop, Stop)];
        assert_eq!(DanceSequence::new(&wps, 20), Err(ConfigError::DanceOrder));

        let wps = [Waypoint::new(10, Med, Med), Waypoint::new(5, Stop, Stop)];
        assert_eq!(DanceSequence::new(&wps, 20), Err(ConfigError::DanceOrder));
    }

    #[test]
    fn test_rejects_early_stop() {
        let wps = [Waypoint::new(0, Med, Med), Waypoint::new(50, Fast, Fast)];
        assert_eq!(DanceSequence::new(&wps, 40), Err(ConfigError::DanceOrder));
        assert!(DanceSequence::new(&wps, 50).is_ok());
    }

    #[test]
    fn test_rejects_too_many_waypoints() {
        let wps: [Waypoint; MAX_WAYPOINTS + 1] =
            core::array::from_fn(|i| Waypoint::new(i as u32, Med, Med));
        assert_eq!(DanceSequence::new(&wps, 100), Err(ConfigError::DanceTooLong));
    }

    #[test]
    fn test_reference_choreography() {
        let table = SpeedTable::default();
        let mut act = MotorActuation::new(table);
        let mut dance = DanceSequencer::new(DanceSequence::default());

        let expected = |tick: u32| -> (SpeedLevel, SpeedLevel) {
            match tick {
                0..=99 => (Med, Med),
                100..=199 => (Stop, Med),
                200..=249 => (Stop, Stop),
                250..=449 => (Fast, Med),
                450..=599 => (Fast, Stop),
                _ => (Stop, Stop),
            }
        };

        for tick in 0..=605u32 {
            assert_eq!(dance.counter(), tick);
            dance.tick(&mut act);
            let (left, right) = expected(tick);
            assert_eq!(
                duties(act.target()),
                (table.duty(left), table.duty(right)),
                "tick {}",
                tick
            );
        }
        assert!(dance.is_finished());
    }

    #[test]
    fn test_waypoints_fire_once() {
        let mut act = MotorActuation::new(SpeedTable::default());
        let mut dance = DanceSequencer::new(DanceSequence::default());

        dance.tick(&mut act);
        assert!(act.take_changed().is_some());

        // Between waypoints nothing is rewritten, even if someone else moved the motors
        act.set_speeds(Slow, Slow);
        act.take_changed();
        for _ in 1..100 {
            dance.tick(&mut act);
        }
        assert_eq!(act.take_changed(), None);
        assert_eq!(duties(act.target()), (750, 750));
    }

    #[test]
    fn test_stop_is_enforced_every_tick() {
        let mut act = MotorActuation::new(SpeedTable::default());
        let wps = [Waypoint::new(0, Fast, Fast)];
        let mut dance = DanceSequencer::new(DanceSequence::new(&wps, 3).unwrap());

        for _ in 0..3 {
            dance.tick(&mut act);
        }
        assert_eq!(duties(act.target()), (1000, 1000));

        for _ in 0..5 {
            dance.tick(&mut act);
            assert_eq!(duties(act.target()), (0, 0));
            // Something else writes the motors; the next tick stops them again
            act.set_speeds(Med, Med);
        }
    }

    #[test]
    fn test_counter_keeps_running_and_resets() {
        let mut act = MotorActuation::new(SpeedTable::default());
        let mut dance = DanceSequencer::new(DanceSequence::default());
        for _ in 0..700 {
            dance.tick(&mut act);
        }
        assert_eq!(dance.counter(), 700);

        dance.reset();
        assert_eq!(dance.counter(), 0);
        assert!(!dance.is_finished());
    }

    #[test]
    fn test_stop_tick_zero_with_waypoint_zero() {
        // Waypoint applies first, then the stop rule overrides it on the same tick
        let mut act = MotorActuation::new(SpeedTable::default());
        let wps = [Waypoint::new(0, Fast, Fast)];
        let mut dance = DanceSequencer::new(DanceSequence::new(&wps, 0).unwrap());
        dance.tick(&mut act);
        assert_eq!(duties(act.target()), (0, 0));
    }
}
