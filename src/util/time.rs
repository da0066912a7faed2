//! Time utilities for the duel simulation

use std::time::Instant;

use crate::config::ClockKind;

/// Source of sim time for an instance.
///
/// Both instances must read the same timeline for arrival checks to be
/// meaningful, so a wall source carries an epoch captured once and copied
/// into each instance.
#[derive(Debug, Clone, Copy)]
pub enum SimClock {
    /// Seconds since a shared monotonic epoch
    Wall { epoch: Instant },
    /// tick * tick_seconds
    Stepped { tick_seconds: f64 },
}

impl SimClock {
    pub fn new(kind: ClockKind, tick_seconds: f64) -> Self {
        match kind {
            ClockKind::Wall => Self::Wall {
                epoch: Instant::now(),
            },
            ClockKind::Stepped => Self::Stepped { tick_seconds },
        }
    }

    /// Sim time in seconds at the given tick
    pub fn now(&self, tick: u64) -> f64 {
        match self {
            Self::Wall { epoch } => epoch.elapsed().as_secs_f64(),
            Self::Stepped { tick_seconds } => tick as f64 * tick_seconds,
        }
    }
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepped_clock_follows_ticks() {
        let clock = SimClock::new(ClockKind::Stepped, 0.5);
        assert_eq!(clock.now(0), 0.0);
        assert_eq!(clock.now(20), 10.0);
    }

    #[test]
    fn test_wall_clock_is_monotonic_and_ignores_tick() {
        let clock = SimClock::new(ClockKind::Wall, 0.5);
        let first = clock.now(1_000);
        let second = clock.now(0);
        assert!(second >= first);
        assert!(first < 1.0);
    }
}
