//! Duel simulation modules

pub mod autopilot;
pub mod frame;
pub mod geometry;
pub mod instance;
pub mod relay;
pub mod ship;
pub mod waypoint;

pub use instance::{InstanceHandle, SimulationInstance};
pub use relay::RelayError;
