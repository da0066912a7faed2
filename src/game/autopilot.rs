//! Autopilot navigation - angle-limited turning and acceleration-limited thrust

use super::geometry::{angle_difference, bearing_degrees, distance, normalize_degrees};
use super::ship::ControlledShip;
use super::waypoint::Waypoint;

/// What the autopilot did on one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutopilotStep {
    /// Queue empty; heading untouched
    Idle,
    /// Steering toward the head waypoint, `distance` measured before the move
    Seeking { distance: f64 },
    /// Head waypoint reached and popped; velocity zeroed
    Arrived { waypoint: Waypoint },
}

/// Autopilot system driving a controlled ship through its waypoint queue
pub struct AutopilotSystem;

impl AutopilotSystem {
    /// Advance the controlled ship by one tick
    pub fn step(controlled: &mut ControlledShip) -> AutopilotStep {
        let Some(target) = controlled.waypoints.head().map(Waypoint::target) else {
            Self::idle(controlled);
            return AutopilotStep::Idle;
        };

        let ship = &mut controlled.ship;
        let tuning = ship.tuning;

        // Turn toward the target within the per-tick budget
        let desired = bearing_degrees(ship.position(), target);
        ship.heading = Self::turn_toward(ship.heading, desired, tuning.turn_rate);

        // Distance is measured once, before the move, and used for both decisions
        let dist = distance(ship.position(), target);

        if dist > tuning.arrival_tolerance {
            let rad = ship.heading.to_radians();
            ship.vel_x += rad.cos() * tuning.max_acceleration;
            ship.vel_y += rad.sin() * tuning.max_acceleration;
            Self::clamp_speed(&mut ship.vel_x, &mut ship.vel_y, tuning.max_speed);
        } else {
            let speed = ship.speed();
            if speed > 0.0 {
                let brake = tuning.max_acceleration / 2.0;
                ship.vel_x -= ship.vel_x / speed * brake;
                ship.vel_y -= ship.vel_y / speed * brake;
            }
        }

        ship.x += ship.vel_x;
        ship.y += ship.vel_y;

        if dist < tuning.arrival_tolerance {
            ship.vel_x = 0.0;
            ship.vel_y = 0.0;
            if let Some(waypoint) = controlled.waypoints.pop() {
                return AutopilotStep::Arrived { waypoint };
            }
        }

        AutopilotStep::Seeking { distance: dist }
    }

    /// Rotate `current` toward `desired` by at most `turn_rate` degrees,
    /// snapping exactly when the gap is already inside the budget
    pub fn turn_toward(current: f64, desired: f64, turn_rate: f64) -> f64 {
        let delta = angle_difference(desired, current);
        if delta.abs() < turn_rate {
            normalize_degrees(desired)
        } else if delta > 0.0 {
            normalize_degrees(current + turn_rate)
        } else {
            normalize_degrees(current - turn_rate)
        }
    }

    /// Scale the velocity down uniformly so its magnitude is at most `max_speed`
    pub fn clamp_speed(vel_x: &mut f64, vel_y: &mut f64, max_speed: f64) {
        let speed = (*vel_x * *vel_x + *vel_y * *vel_y).sqrt();
        if speed > max_speed {
            let scale = max_speed / speed;
            *vel_x *= scale;
            *vel_y *= scale;
        }
    }

    fn idle(controlled: &mut ControlledShip) {
        let ship = &mut controlled.ship;

        if ship.tuning.idle_braking {
            let speed = ship.speed();
            if speed > 0.0 {
                let remaining = (speed - ship.tuning.max_acceleration).max(0.0);
                let scale = remaining / speed;
                ship.vel_x *= scale;
                ship.vel_y *= scale;
            }
        }

        ship.x += ship.vel_x;
        ship.y += ship.vel_y;
    }
}
