//! Render frame building

use crate::net::protocol::{Frame, PlayerSlot};

use super::ship::{ControlledShip, ProxyShip, ShipView};

/// Builds frames for the rendering collaborator
#[derive(Debug, Default)]
pub struct FrameBuilder {
    /// Delay of the latest observation applied to the proxy
    last_applied_delay: Option<f64>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_applied(&mut self, delay: f64) {
        self.last_applied_delay = Some(delay);
    }

    /// Build a frame message
    pub fn build(
        &self,
        slot: PlayerSlot,
        tick: u64,
        time: f64,
        controlled: &ControlledShip,
        proxy: &ProxyShip,
        buffered: usize,
    ) -> Frame {
        Frame {
            slot,
            tick,
            time,
            controlled: controlled.pose(),
            proxy: proxy.pose(),
            waypoints: controlled.waypoints.views(),
            trajectory: controlled.trajectory(),
            last_applied_delay: self.last_applied_delay,
            buffered,
        }
    }
}

/// Thins a per-tick frame stream for a writer that only wants every Nth tick.
///
/// Spacing is measured from the last admitted tick, so coalesced ticks never
/// produce two writes closer than N ticks apart.
#[derive(Debug)]
pub struct FrameThrottle {
    every: u64,
    last: Option<u64>,
}

impl FrameThrottle {
    pub fn new(every: u32) -> Self {
        Self {
            every: u64::from(every.max(1)),
            last: None,
        }
    }

    /// True if the frame for `tick` should be written
    pub fn admit(&mut self, tick: u64) -> bool {
        match self.last {
            Some(last) if tick < last.saturating_add(self.every) => false,
            _ => {
                self.last = Some(tick);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShipTuning;
    use crate::game::geometry::Position;
    use crate::game::ship::Ship;

    #[test]
    fn test_throttle_admits_every_interval() {
        let mut throttle = FrameThrottle::new(3);
        let pattern: Vec<bool> = (1..=7).map(|tick| throttle.admit(tick)).collect();
        assert_eq!(pattern, vec![true, false, false, true, false, false, true]);

        // Ticks coalesced away upstream
        assert!(!throttle.admit(9));
        assert!(throttle.admit(12));
    }

    #[test]
    fn test_zero_interval_admits_every_tick() {
        let mut throttle = FrameThrottle::new(0);
        assert!(throttle.admit(1));
        assert!(throttle.admit(2));
    }

    #[test]
    fn test_build_carries_both_poses() {
        let tuning = ShipTuning::default();
        let mut controlled =
            ControlledShip::new(Ship::new(PlayerSlot::Two, Position::new(1.0, 1.0), 90.0, tuning));
        controlled.request_waypoint(Position::new(4.0, 5.0));
        let proxy = ProxyShip::new(Ship::new(PlayerSlot::One, Position::new(-3.0, 0.0), 0.0, tuning));

        let mut builder = FrameBuilder::new();
        builder.record_applied(2.5);
        let frame = builder.build(PlayerSlot::Two, 12, 0.2, &controlled, &proxy, 3);

        assert_eq!(frame.controlled.heading, 90.0);
        assert_eq!(frame.proxy.slot, PlayerSlot::One);
        assert_eq!(frame.proxy.x, -3.0);
        assert_eq!(frame.waypoints.len(), 1);
        assert_eq!(frame.waypoints[0].origin, Position::new(1.0, 1.0));
        assert_eq!(frame.trajectory.len(), 2);
        assert_eq!(frame.last_applied_delay, Some(2.5));
        assert_eq!(frame.buffered, 3);
    }
}
