//! Distance and light-speed delay model

use serde::{Deserialize, Serialize};

/// A point in the duel plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two positions
pub fn distance(a: Position, b: Position) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Sim seconds needed for information to cross `distance`.
///
/// `speed_of_light` must be positive; config validation guarantees it for
/// every running instance.
pub fn propagation_delay(distance: f64, speed_of_light: f64) -> f64 {
    distance / speed_of_light
}

/// Bearing from `from` to `to` in degrees, in (-180, 180]
pub fn bearing_degrees(from: Position, to: Position) -> f64 {
    normalize_degrees((to.y - from.y).atan2(to.x - from.x).to_degrees())
}

/// Wrap an angle in degrees into (-180, 180]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation from `current` to `desired`, in (-180, 180]
pub fn angle_difference(desired: f64, current: f64) -> f64 {
    normalize_degrees(desired - current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(distance(Position::new(0.0, 0.0), Position::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Position::new(7.0, -2.0), Position::new(7.0, -2.0)), 0.0);
    }

    #[test]
    fn test_delay_scales_with_distance() {
        assert_eq!(propagation_delay(1000.0, 100.0), 10.0);
        assert_eq!(propagation_delay(0.0, 100.0), 0.0);

        let near = propagation_delay(250.0, 100.0);
        let far = propagation_delay(251.0, 100.0);
        assert!(near < far);
    }

    #[test]
    fn test_normalize_degrees_range() {
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(270.0), -90.0);
        assert_eq!(normalize_degrees(-450.0), -90.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn test_angle_difference_takes_short_way() {
        assert_eq!(angle_difference(170.0, -170.0), -20.0);
        assert_eq!(angle_difference(-170.0, 170.0), 20.0);
        assert_eq!(angle_difference(90.0, 0.0), 90.0);
    }

    #[test]
    fn test_bearing() {
        let origin = Position::new(0.0, 0.0);
        assert_eq!(bearing_degrees(origin, Position::new(100.0, 0.0)), 0.0);
        assert_eq!(bearing_degrees(origin, Position::new(0.0, 5.0)), 90.0);
        assert_eq!(bearing_degrees(origin, Position::new(-1.0, 0.0)), 180.0);
        // atan2(-0.0, -x) is -180 before wrapping
        assert_eq!(bearing_degrees(Position::new(0.0, 0.0), Position::new(-1.0, -0.0)), 180.0);
    }
}
