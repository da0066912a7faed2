//! Waypoint queue consumed by the autopilot

use std::collections::VecDeque;

use super::geometry::Position;
use crate::net::protocol::WaypointView;

/// A navigation target. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    target: Position,
    /// Ship position when the waypoint was requested (drawing only)
    origin: Position,
}

impl Waypoint {
    pub fn new(target: Position, origin: Position) -> Self {
        Self { target, origin }
    }

    pub fn target(&self) -> Position {
        self.target
    }

    pub fn origin(&self) -> Position {
        self.origin
    }
}

/// FIFO of waypoints. Only the head ever steers the ship.
#[derive(Debug, Clone, Default)]
pub struct WaypointQueue {
    queue: VecDeque<Waypoint>,
}

impl WaypointQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a waypoint at the back
    pub fn push(&mut self, waypoint: Waypoint) {
        self.queue.push_back(waypoint);
    }

    /// Current navigation target
    pub fn head(&self) -> Option<&Waypoint> {
        self.queue.front()
    }

    /// Remove the head once it has been reached
    pub fn pop(&mut self) -> Option<Waypoint> {
        self.queue.pop_front()
    }

    /// Drop every waypoint
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Drop the waypoint at `index` and everything after it.
    /// Returns how many were removed; out-of-range indexes remove nothing.
    pub fn truncate_from(&mut self, index: usize) -> usize {
        let before = self.queue.len();
        self.queue.truncate(index);
        before - self.queue.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.queue.iter()
    }

    /// Renderer view of the queue, in traversal order
    pub fn views(&self) -> Vec<WaypointView> {
        self.queue
            .iter()
            .map(|w| WaypointView {
                target: w.target,
                origin: w.origin,
            })
            .collect()
    }
}
