//! Duel link plumbing and wire types

pub mod link;
pub mod protocol;

pub use link::{link_pair, ObservationLink};
