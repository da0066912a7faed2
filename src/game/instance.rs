//! Simulation instance and its per-tick loop

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Notify};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, trace};
use uuid::Uuid;

use crate::net::protocol::{DelayedObservation, Frame, InputCommand, PlayerSlot};
use crate::net::ObservationLink;
use crate::util::time::{SimClock, Timer};

use super::autopilot::{AutopilotStep, AutopilotSystem};
use super::frame::FrameBuilder;
use super::geometry::Position;
use super::relay::{ObservationRelay, RelayError, RelayStats};
use super::ship::{ControlledShip, ProxyShip};

/// Handle to a running instance
#[derive(Clone)]
pub struct InstanceHandle {
    pub id: Uuid,
    pub slot: PlayerSlot,
    pub command_tx: mpsc::UnboundedSender<InputCommand>,
    pub frame_rx: watch::Receiver<Option<Frame>>,
    shutdown: Arc<Notify>,
}

impl InstanceHandle {
    /// Forward an operator command; false if the instance has stopped
    pub fn send(&self, command: InputCommand) -> bool {
        self.command_tx.send(command).is_ok()
    }

    pub fn request_waypoint(&self, x: f64, y: f64) -> bool {
        self.send(InputCommand::WaypointRequested { x, y })
    }

    /// Ask this instance alone to stop after its current tick
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub autopilot: AutopilotStep,
    /// None once the peer has closed its end
    pub sent: Option<DelayedObservation>,
    pub applied: Option<DelayedObservation>,
}

/// One participant's view of the duel
pub struct SimulationInstance {
    id: Uuid,
    slot: PlayerSlot,
    /// Completed ticks
    tick: u64,
    controlled: ControlledShip,
    proxy: ProxyShip,
    relay: ObservationRelay,
    command_rx: mpsc::UnboundedReceiver<InputCommand>,
    frame_tx: watch::Sender<Option<Frame>>,
    frame_builder: FrameBuilder,
    shutdown: Arc<Notify>,
}

impl SimulationInstance {
    /// Create an instance from its ships and its end of the duel link
    pub fn new(
        slot: PlayerSlot,
        controlled: ControlledShip,
        proxy: ProxyShip,
        link: ObservationLink,
        speed_of_light: f64,
    ) -> (Self, InstanceHandle) {
        let id = Uuid::new_v4();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (frame_tx, frame_rx) = watch::channel(None);
        let shutdown = Arc::new(Notify::new());

        let handle = InstanceHandle {
            id,
            slot,
            command_tx,
            frame_rx,
            shutdown: shutdown.clone(),
        };

        let instance = Self {
            id,
            slot,
            tick: 0,
            controlled,
            proxy,
            relay: ObservationRelay::new(link, speed_of_light),
            command_rx,
            frame_tx,
            frame_builder: FrameBuilder::new(),
            shutdown,
        };

        (instance, handle)
    }

    /// Run the tick loop until shut down or the link is exhausted
    pub async fn run(mut self, clock: SimClock, tick_rate: u32) -> Result<RelayStats, RelayError> {
        info!(instance = %self.slot, instance_id = %self.id, "Instance started");
        let timer = Timer::new();

        let tick_duration = Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let shutdown = self.shutdown.clone();

        let result = loop {
            tokio::select! {
                _ = shutdown.notified() => break Ok(()),
                _ = tick_interval.tick() => {}
            }

            self.process_commands();

            let now = clock.now(self.tick);
            if let Err(e) = self.tick(now) {
                error!(instance = %self.slot, tick = self.tick, error = %e, "Relay failure, stopping instance");
                break Err(e);
            }

            self.frame_tx.send_replace(Some(self.frame(now)));
        };

        let stats = self.relay.stats();
        info!(
            instance = %self.slot,
            instance_id = %self.id,
            ticks = self.tick,
            elapsed_secs = timer.elapsed_secs(),
            sent = stats.sent,
            received = stats.received,
            applied = stats.applied,
            peak_buffered = self.relay.buffer().peak(),
            "Instance stopped"
        );

        result.map(|()| stats)
    }

    /// Apply every pending operator command
    pub fn process_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.apply_command(command);
        }
    }

    /// Apply one operator command to the controlled ship's queue
    pub fn apply_command(&mut self, command: InputCommand) {
        match command {
            InputCommand::WaypointRequested { x, y } => {
                self.controlled.request_waypoint(Position::new(x, y));
                debug!(
                    instance = %self.slot,
                    x,
                    y,
                    queued = self.controlled.waypoints.len(),
                    "Waypoint added"
                );
            }
            InputCommand::ClearWaypoints => {
                self.controlled.waypoints.clear();
                debug!(instance = %self.slot, "Waypoints cleared");
            }
            InputCommand::TruncateWaypoints { index } => {
                let removed = self.controlled.waypoints.truncate_from(index);
                debug!(instance = %self.slot, index, removed, "Waypoints truncated");
            }
        }
    }

    /// Run one simulation tick at sim time `now`.
    ///
    /// Order: autopilot, send, receive-and-apply. Never waits on the link.
    pub fn tick(&mut self, now: f64) -> Result<TickReport, RelayError> {
        let autopilot = AutopilotSystem::step(&mut self.controlled);
        if let AutopilotStep::Arrived { waypoint } = autopilot {
            let target = waypoint.target();
            debug!(instance = %self.slot, x = target.x, y = target.y, "Waypoint reached");
        }

        let sent = self.relay.send(&self.controlled.ship, &self.proxy.ship, now)?;

        let applied = self.relay.receive(now);
        if let Some(observation) = &applied {
            self.proxy.apply(observation);
            self.frame_builder.record_applied(observation.delay);
        }

        trace!(instance = %self.slot, tick = self.tick, now, "Tick complete");
        self.tick += 1;

        Ok(TickReport {
            autopilot,
            sent,
            applied,
        })
    }

    /// Current state for the renderer
    pub fn frame(&self, now: f64) -> Frame {
        self.frame_builder.build(
            self.slot,
            self.tick,
            now,
            &self.controlled,
            &self.proxy,
            self.relay.buffer().len(),
        )
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn controlled(&self) -> &ControlledShip {
        &self.controlled
    }

    pub fn proxy(&self) -> &ProxyShip {
        &self.proxy
    }

    pub fn relay(&self) -> &ObservationRelay {
        &self.relay
    }
}
