//! Message definitions
//! Records passed between instances, operator commands, and render output

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::geometry::Position;

/// Which participant a ship or instance belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    /// The other participant
    pub fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => f.write_str("one"),
            Self::Two => f.write_str("two"),
        }
    }
}

/// A ship's past kinematic state plus its simulated transit time.
///
/// This is the only record exchanged between instances. It travels over an
/// in-process channel, so it is never serialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayedObservation {
    /// Sender position X at send time
    pub x: f64,
    /// Sender position Y at send time
    pub y: f64,
    /// Sender velocity X
    pub vel_x: f64,
    /// Sender velocity Y
    pub vel_y: f64,
    /// Distance between the ships as measured by the sender
    pub distance: f64,
    /// distance / speed_of_light
    pub delay: f64,
    /// Sender's sim time when the observation left
    pub sent_at: f64,
}

impl DelayedObservation {
    /// Sim time at which the receiver may apply this observation
    pub fn arrives_at(&self) -> f64 {
        self.sent_at + self.delay
    }

    pub fn is_due(&self, now: f64) -> bool {
        self.arrives_at() <= now
    }
}

/// Operator commands accepted by an instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    /// Append a navigation target to the controlled ship's queue
    WaypointRequested { x: f64, y: f64 },
    /// Drop every queued waypoint
    ClearWaypoints,
    /// Drop the waypoint at `index` and all after it
    TruncateWaypoints { index: usize },
}

/// Ship pose as seen by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipPose {
    pub slot: PlayerSlot,
    pub x: f64,
    pub y: f64,
    /// Heading in degrees, (-180, 180]
    pub heading: f64,
    pub vel_x: f64,
    pub vel_y: f64,
}

/// Queued waypoint as seen by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointView {
    pub target: Position,
    /// Where the ship was when the waypoint was requested
    pub origin: Position,
}

/// Everything the renderer needs for one instance at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub slot: PlayerSlot,
    /// Instance tick number
    pub tick: u64,
    /// Sim time of the tick
    pub time: f64,
    pub controlled: ShipPose,
    /// Last delayed view of the opponent
    pub proxy: ShipPose,
    pub waypoints: Vec<WaypointView>,
    /// Projected position followed by each waypoint target, in order
    pub trajectory: Vec<Position>,
    /// Delay carried by the most recently applied observation
    pub last_applied_delay: Option<f64>,
    /// Observations waiting in the local buffer
    pub buffered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_due_boundary() {
        let obs = DelayedObservation {
            x: 0.0,
            y: 0.0,
            vel_x: 0.0,
            vel_y: 0.0,
            distance: 1000.0,
            delay: 10.0,
            sent_at: 0.0,
        };
        assert!(!obs.is_due(9.999));
        assert!(obs.is_due(10.0));
        assert!(obs.is_due(10.5));
    }

    #[test]
    fn test_slot_opponent_and_serde() {
        assert_eq!(PlayerSlot::One.opponent(), PlayerSlot::Two);
        assert_eq!(PlayerSlot::Two.opponent(), PlayerSlot::One);
        assert_eq!(serde_json::to_string(&PlayerSlot::Two).unwrap(), "\"two\"");
    }
}
