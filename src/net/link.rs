//! Inter-instance observation channels

use tokio::sync::mpsc;

use super::protocol::DelayedObservation;

/// One instance's end of the duel link: an outbound sender to the opponent
/// and an inbound receiver from it. Each direction is FIFO and bounded.
#[derive(Debug)]
pub struct ObservationLink {
    pub outbound: mpsc::Sender<DelayedObservation>,
    pub inbound: mpsc::Receiver<DelayedObservation>,
    capacity: usize,
}

impl ObservationLink {
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Build two cross-wired link ends, one per instance
pub fn link_pair(capacity: usize) -> (ObservationLink, ObservationLink) {
    let (a_tx, b_rx) = mpsc::channel(capacity);
    let (b_tx, a_rx) = mpsc::channel(capacity);

    (
        ObservationLink {
            outbound: a_tx,
            inbound: a_rx,
            capacity,
        },
        ObservationLink {
            outbound: b_tx,
            inbound: b_rx,
            capacity,
        },
    )
}
