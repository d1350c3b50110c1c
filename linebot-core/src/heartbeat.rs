//! Status LED heartbeat
//!
//! Divides the scheduler tick down to a slow blink so a running
//! controller is visible at a glance.

/// Tick divider for the status output
#[derive(Debug, Clone)]
pub struct Heartbeat {
    period_ticks: u16,
    count: u16,
    level: bool,
}

impl Heartbeat {
    /// Toggle every `period_ticks` ticks (0 is treated as 1)
    pub fn new(period_ticks: u16) -> Self {
        Self {
            period_ticks: period_ticks.max(1),
            count: 0,
            level: false,
        }
    }

    /// Advance one tick, returning the new level when it toggles
    pub fn tick(&mut self) -> Option<bool> {
        let toggle = self.count == 0;
        self.count = (self.count + 1) % self.period_ticks;

        if toggle {
            self.level = !self.level;
            Some(self.level)
        } else {
            None
        }
    }

    /// Current output level
    pub fn level(&self) -> bool {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles_on_first_tick_then_every_period() {
        let mut hb = Heartbeat::new(10);
        assert_eq!(hb.tick(), Some(true));
        for _ in 1..10 {
            assert_eq!(hb.tick(), None);
        }
        assert_eq!(hb.tick(), Some(false));
        assert!(!hb.level());
    }

    #[test]
    fn test_zero_period_toggles_every_tick() {
        let mut hb = Heartbeat::new(0);
        assert_eq!(hb.tick(), Some(true));
        assert_eq!(hb.tick(), Some(false));
    }
}
