//! Delayed observation relay - outbound reports and the in-order arrival buffer

use std::collections::VecDeque;

use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tracing::{debug, info, trace};

use super::geometry::{distance, propagation_delay};
use super::ship::Ship;
use crate::net::protocol::DelayedObservation;
use crate::net::ObservationLink;

/// Relay errors. Every variant ends the instance; a closed peer is not an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelayError {
    /// Outbound channel exhausted; the instance cannot keep its opponent informed
    #[error("Outbound link full ({capacity} observations in flight)")]
    LinkFull { capacity: usize },
}

/// Received observations waiting out their transit time, in arrival order.
///
/// Release is head-only: a later entry never overtakes the head, even when
/// it is already due. One stale, long-delay head therefore holds back every
/// fresher observation queued behind it.
#[derive(Debug, Default)]
pub struct ObservationBuffer {
    queue: VecDeque<DelayedObservation>,
    peak: usize,
}

impl ObservationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observation: DelayedObservation) {
        self.queue.push_back(observation);
        self.peak = self.peak.max(self.queue.len());
    }

    /// Pop the head if its arrival time has passed. At most one per call.
    pub fn release_due(&mut self, now: f64) -> Option<DelayedObservation> {
        if self.queue.front()?.is_due(now) {
            self.queue.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Deepest the buffer has ever been
    pub fn peak(&self) -> usize {
        self.peak
    }
}

/// Relay counters for shutdown reporting
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub sent: u64,
    pub received: u64,
    pub applied: u64,
}

/// Both halves of the relay for one instance
#[derive(Debug)]
pub struct ObservationRelay {
    link: ObservationLink,
    buffer: ObservationBuffer,
    speed_of_light: f64,
    outbound_open: bool,
    inbound_open: bool,
    stats: RelayStats,
}

impl ObservationRelay {
    pub fn new(link: ObservationLink, speed_of_light: f64) -> Self {
        Self {
            link,
            buffer: ObservationBuffer::new(),
            speed_of_light,
            outbound_open: true,
            inbound_open: true,
            stats: RelayStats::default(),
        }
    }

    /// Package `own`'s current state and push it toward the opponent.
    ///
    /// Distance is measured against the local proxy's position. Returns the
    /// observation that left, or `None` once the peer has closed its end. A
    /// closed peer is logged once; only a full link is an error.
    pub fn send(
        &mut self,
        own: &Ship,
        proxy: &Ship,
        now: f64,
    ) -> Result<Option<DelayedObservation>, RelayError> {
        if !self.outbound_open {
            return Ok(None);
        }

        let dist = distance(own.position(), proxy.position());
        let observation = DelayedObservation {
            x: own.x,
            y: own.y,
            vel_x: own.vel_x,
            vel_y: own.vel_y,
            distance: dist,
            delay: propagation_delay(dist, self.speed_of_light),
            sent_at: now,
        };

        match self.link.outbound.try_send(observation) {
            Ok(()) => {
                self.stats.sent += 1;
                trace!(delay = observation.delay, sent_at = now, "Observation sent");
                Ok(Some(observation))
            }
            Err(TrySendError::Full(_)) => Err(RelayError::LinkFull {
                capacity: self.link.capacity(),
            }),
            Err(TrySendError::Closed(_)) => {
                self.outbound_open = false;
                info!("Peer closed the outbound link, no longer reporting");
                Ok(None)
            }
        }
    }

    /// Drain everything pending on the inbound link into the buffer, then
    /// release the head if it is due. Never waits.
    pub fn receive(&mut self, now: f64) -> Option<DelayedObservation> {
        while self.inbound_open {
            match self.link.inbound.try_recv() {
                Ok(observation) => {
                    self.stats.received += 1;
                    self.buffer.push(observation);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.inbound_open = false;
                    info!(
                        buffered = self.buffer.len(),
                        "Inbound link closed, draining remaining observations"
                    );
                }
            }
        }

        let released = self.buffer.release_due(now)?;
        self.stats.applied += 1;
        debug!(
            delay = released.delay,
            sent_at = released.sent_at,
            now,
            buffered = self.buffer.len(),
            "Observation released"
        );
        Some(released)
    }

    pub fn buffer(&self) -> &ObservationBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    pub fn is_peer_connected(&self) -> bool {
        self.outbound_open && self.inbound_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShipTuning;
    use crate::game::geometry::Position;
    use crate::net::link_pair;
    use crate::net::protocol::PlayerSlot;
    use tokio_test::{assert_err, assert_ok};

    fn obs(sent_at: f64, delay: f64, x: f64) -> DelayedObservation {
        DelayedObservation {
            x,
            y: 0.0,
            vel_x: 0.0,
            vel_y: 0.0,
            distance: delay * 100.0,
            delay,
            sent_at,
        }
    }

    fn ship(slot: PlayerSlot, x: f64) -> Ship {
        Ship::new(slot, Position::new(x, 0.0), 0.0, ShipTuning::default())
    }

    #[test]
    fn test_head_released_only_when_due() {
        let mut buffer = ObservationBuffer::new();
        buffer.push(obs(0.0, 10.0, 1.0));

        assert!(buffer.release_due(9.99).is_none());
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.release_due(10.0).map(|o| o.x), Some(1.0));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_due_entry_waits_behind_head() {
        let mut buffer = ObservationBuffer::new();
        buffer.push(obs(0.0, 5.0, 1.0));
        buffer.push(obs(1.0, 1.0, 2.0));

        // Second is due at t=2 but the head is not due until t=5
        assert!(buffer.release_due(3.0).is_none());
        assert_eq!(buffer.len(), 2);

        assert_eq!(buffer.release_due(5.0).map(|o| o.x), Some(1.0));
        assert_eq!(buffer.release_due(5.0).map(|o| o.x), Some(2.0));
        assert!(buffer.release_due(100.0).is_none());
    }

    #[test]
    fn test_one_release_per_call() {
        let mut buffer = ObservationBuffer::new();
        for i in 0..3 {
            buffer.push(obs(i as f64, 0.0, i as f64));
        }

        assert_eq!(buffer.release_due(50.0).map(|o| o.x), Some(0.0));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.peak(), 3);
    }

    #[test]
    fn test_send_computes_delay_from_distance() {
        let (a, mut b) = link_pair(4);
        let mut relay = ObservationRelay::new(a, 100.0);

        let own = ship(PlayerSlot::One, 0.0);
        let proxy = ship(PlayerSlot::Two, 1000.0);
        let sent = assert_ok!(relay.send(&own, &proxy, 2.5)).unwrap();

        assert_eq!(sent.distance, 1000.0);
        assert_eq!(sent.delay, 10.0);
        assert_eq!(sent.sent_at, 2.5);
        assert_eq!(b.inbound.try_recv().unwrap(), sent);
        assert_eq!(relay.stats().sent, 1);
    }

    #[test]
    fn test_full_link_is_fatal() {
        let (a, _b) = link_pair(1);
        let mut relay = ObservationRelay::new(a, 100.0);
        let own = ship(PlayerSlot::One, 0.0);
        let proxy = ship(PlayerSlot::Two, 10.0);

        assert_ok!(relay.send(&own, &proxy, 0.0));
        let err = assert_err!(relay.send(&own, &proxy, 0.1));
        assert_eq!(err, RelayError::LinkFull { capacity: 1 });
    }

    #[test]
    fn test_closed_peer_is_not_an_error() {
        let (a, b) = link_pair(4);
        let mut relay = ObservationRelay::new(a, 100.0);
        drop(b);

        let own = ship(PlayerSlot::One, 0.0);
        let proxy = ship(PlayerSlot::Two, 10.0);
        assert_eq!(assert_ok!(relay.send(&own, &proxy, 0.0)), None);
        assert_eq!(assert_ok!(relay.send(&own, &proxy, 0.1)), None);
        assert!(relay.receive(1.0).is_none());
        assert!(!relay.is_peer_connected());
        assert_eq!(relay.stats().sent, 0);
    }

    #[test]
    fn test_receive_drains_then_releases_head_only() {
        let (a, b) = link_pair(8);
        let mut relay = ObservationRelay::new(b, 100.0);

        a.outbound.try_send(obs(0.0, 5.0, 1.0)).unwrap();
        a.outbound.try_send(obs(1.0, 1.0, 2.0)).unwrap();

        assert!(relay.receive(3.0).is_none());
        assert_eq!(relay.buffer().len(), 2);
        assert_eq!(relay.stats().received, 2);

        assert_eq!(relay.receive(5.0).map(|o| o.x), Some(1.0));
        assert_eq!(relay.receive(5.0).map(|o| o.x), Some(2.0));
        assert_eq!(relay.stats().applied, 2);
    }

    #[test]
    fn test_buffer_still_drains_after_peer_closes() {
        let (a, b) = link_pair(8);
        let mut relay = ObservationRelay::new(b, 100.0);
        a.outbound.try_send(obs(0.0, 2.0, 7.0)).unwrap();
        drop(a);

        assert!(relay.receive(1.0).is_none());
        assert_eq!(relay.receive(2.0).map(|o| o.x), Some(7.0));
    }
}
