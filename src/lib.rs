pub mod app;
pub mod config;
pub mod game;
pub mod input;
pub mod net;
pub mod output;
pub mod util;

pub use app::Duel;
pub use config::Config;
