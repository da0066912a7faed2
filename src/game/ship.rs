//! Ship records and the two roles a ship can play locally

use super::geometry::{normalize_degrees, Position};
use super::waypoint::{Waypoint, WaypointQueue};
use crate::config::ShipTuning;
use crate::net::protocol::{DelayedObservation, PlayerSlot, ShipPose};

/// Plain kinematic record shared by both roles
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub slot: PlayerSlot,

    // Position and movement
    pub x: f64,
    pub y: f64,
    /// Heading in degrees, (-180, 180]
    pub heading: f64,
    pub vel_x: f64,
    pub vel_y: f64,

    pub tuning: ShipTuning,
}

impl Ship {
    pub fn new(slot: PlayerSlot, spawn: Position, heading: f64, tuning: ShipTuning) -> Self {
        Self {
            slot,
            x: spawn.x,
            y: spawn.y,
            heading,
            vel_x: 0.0,
            vel_y: 0.0,
            tuning,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn speed(&self) -> f64 {
        (self.vel_x * self.vel_x + self.vel_y * self.vel_y).sqrt()
    }

    pub fn pose(&self) -> ShipPose {
        ShipPose {
            slot: self.slot,
            x: self.x,
            y: self.y,
            heading: self.heading,
            vel_x: self.vel_x,
            vel_y: self.vel_y,
        }
    }
}

/// Anything the render adapter can draw
pub trait ShipView {
    fn ship(&self) -> &Ship;

    fn pose(&self) -> ShipPose {
        self.ship().pose()
    }
}

/// The local ship, steered by its own waypoint queue
#[derive(Debug, Clone)]
pub struct ControlledShip {
    pub ship: Ship,
    pub waypoints: WaypointQueue,
}

impl ControlledShip {
    pub fn new(ship: Ship) -> Self {
        Self {
            ship,
            waypoints: WaypointQueue::new(),
        }
    }

    /// Queue a target, remembering where the ship was when it was requested.
    /// Any coordinate pair is accepted.
    pub fn request_waypoint(&mut self, target: Position) {
        let origin = self.ship.position();
        self.waypoints.push(Waypoint::new(target, origin));
    }

    /// Polyline from the projected next position through every queued target
    pub fn trajectory(&self) -> Vec<Position> {
        let projected = Position::new(
            self.ship.x + self.ship.vel_x,
            self.ship.y + self.ship.vel_y,
        );
        std::iter::once(projected)
            .chain(self.waypoints.iter().map(Waypoint::target))
            .collect()
    }
}

impl ShipView for ControlledShip {
    fn ship(&self) -> &Ship {
        &self.ship
    }
}

/// Local stand-in for the opponent; only delayed observations move it
#[derive(Debug, Clone)]
pub struct ProxyShip {
    pub ship: Ship,
}

impl ProxyShip {
    pub fn new(ship: Ship) -> Self {
        Self { ship }
    }

    /// Overwrite kinematics wholesale from a released observation
    pub fn apply(&mut self, observation: &DelayedObservation) {
        self.ship.x = observation.x;
        self.ship.y = observation.y;
        self.ship.vel_x = observation.vel_x;
        self.ship.vel_y = observation.vel_y;
        // Heading is not on the wire; face along the reported velocity when moving
        if observation.vel_x != 0.0 || observation.vel_y != 0.0 {
            self.ship.heading =
                normalize_degrees(observation.vel_y.atan2(observation.vel_x).to_degrees());
        }
    }
}

impl ShipView for ProxyShip {
    fn ship(&self) -> &Ship {
        &self.ship
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship_at(x: f64, y: f64) -> Ship {
        Ship::new(PlayerSlot::One, Position::new(x, y), 0.0, ShipTuning::default())
    }

    #[test]
    fn test_waypoint_keeps_origin() {
        let mut controlled = ControlledShip::new(ship_at(5.0, 6.0));
        controlled.request_waypoint(Position::new(-1e6, 3e6));

        let head = controlled.waypoints.head().copied().unwrap();
        assert_eq!(head.target(), Position::new(-1e6, 3e6));
        assert_eq!(head.origin(), Position::new(5.0, 6.0));
    }

    #[test]
    fn test_trajectory_starts_at_projection() {
        let mut controlled = ControlledShip::new(ship_at(0.0, 0.0));
        controlled.ship.vel_x = 2.0;
        controlled.ship.vel_y = -1.0;
        controlled.request_waypoint(Position::new(10.0, 0.0));
        controlled.request_waypoint(Position::new(10.0, 10.0));

        assert_eq!(
            controlled.trajectory(),
            vec![
                Position::new(2.0, -1.0),
                Position::new(10.0, 0.0),
                Position::new(10.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_proxy_apply_overwrites_kinematics() {
        let mut proxy = ProxyShip::new(ship_at(100.0, 100.0));
        proxy.apply(&DelayedObservation {
            x: 1.0,
            y: 2.0,
            vel_x: 0.0,
            vel_y: 3.0,
            distance: 10.0,
            delay: 0.1,
            sent_at: 0.0,
        });

        assert_eq!(proxy.ship.position(), Position::new(1.0, 2.0));
        assert_eq!((proxy.ship.vel_x, proxy.ship.vel_y), (0.0, 3.0));
        assert_eq!(proxy.pose().heading, 90.0);
    }

    #[test]
    fn test_proxy_heading_stays_in_range() {
        let mut proxy = ProxyShip::new(ship_at(0.0, 0.0));
        proxy.apply(&DelayedObservation {
            x: 0.0,
            y: 0.0,
            vel_x: -2.0,
            vel_y: -0.0,
            distance: 10.0,
            delay: 0.1,
            sent_at: 0.0,
        });

        assert_eq!(proxy.pose().heading, 180.0);
    }
}
