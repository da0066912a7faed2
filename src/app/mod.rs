//! Duel assembly

pub mod state;

pub use state::Duel;
