//! World clock for the CoCaRo simulation.
//!
//! The clock is the single source of truth for simulation time. It counts
//! ticks with checked arithmetic, and periodic schedules (such as box
//! spawning) are derived from the counter rather than stored.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Simulation clock.
///
/// Tick 0 is the bootstrapped world before anything has acted. The first
/// call to [`advance`](Self::advance) starts tick 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldClock {
    /// Current tick number.
    tick: u64,
}

impl WorldClock {
    /// A clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    #[cfg(test)]
    const fn from_tick(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether a schedule firing every `interval` ticks fires on the
    /// current tick. An interval of zero never fires, and neither does
    /// tick 0.
    pub const fn is_due(&self, interval: u64) -> bool {
        match self.tick.checked_rem(interval) {
            Some(rem) => self.tick != 0 && rem == 0,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_tick_zero() {
        assert_eq!(WorldClock::new().tick(), 0);
        assert_eq!(WorldClock::default(), WorldClock::new());
    }

    #[test]
    fn clock_advances() {
        let mut clock = WorldClock::new();
        assert_eq!(clock.advance(), Ok(1));
        assert_eq!(clock.advance(), Ok(2));
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn advance_detects_overflow() {
        let mut clock = WorldClock::from_tick(u64::MAX);
        assert_eq!(clock.advance(), Err(ClockError::TickOverflow));
        assert_eq!(clock.tick(), u64::MAX);
    }

    #[test]
    fn schedule_fires_on_multiples() {
        let due: Vec<u64> = (0..=12)
            .filter(|&t| WorldClock::from_tick(t).is_due(4))
            .collect();
        assert_eq!(due, vec![4, 8, 12]);
    }

    #[test]
    fn zero_interval_never_fires() {
        assert!(!WorldClock::from_tick(0).is_due(0));
        assert!(!WorldClock::from_tick(10).is_due(0));
    }
}
