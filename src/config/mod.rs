//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;

/// Kinematic limits shared by every ship in the duel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipTuning {
    /// Maximum speed in distance units per tick
    pub max_speed: f64,
    /// Thrust added per tick while seeking
    pub max_acceleration: f64,
    /// Turn budget in degrees per tick
    pub turn_rate: f64,
    /// Distance below which a waypoint counts as reached
    pub arrival_tolerance: f64,
    /// Bleed speed toward zero while idle instead of coasting
    pub idle_braking: bool,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            max_acceleration: 0.01,
            turn_rate: 100.0,
            arrival_tolerance: 10.0,
            idle_braking: false,
        }
    }
}

/// Constants both instances must agree on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConstants {
    pub ship: ShipTuning,
    /// Distance units covered by information per second of sim time
    pub speed_of_light: f64,
}

impl Default for SimConstants {
    fn default() -> Self {
        Self {
            ship: ShipTuning::default(),
            speed_of_light: 100.0,
        }
    }
}

/// Where an instance takes its notion of "now" from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Monotonic wall clock with an epoch shared by both instances
    Wall,
    /// tick * (1 / tick_rate), independent of scheduling jitter
    Stepped,
}

impl FromStr for ClockKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wall" => Ok(Self::Wall),
            "stepped" => Ok(Self::Stepped),
            other => Err(ConfigError::UnknownClock(other.to_string())),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Simulation ticks per second
    pub tick_rate: u32,
    pub clock: ClockKind,
    pub constants: SimConstants,

    /// Bound on each inter-instance observation channel
    pub link_capacity: usize,

    /// Initial distance between the two ships
    pub separation: f64,
    /// Seed for the spawn bearing
    pub seed: u64,

    /// Write every Nth tick's frame to stdout; frames are still published each tick
    pub frame_every: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tick_rate: 60,
            clock: ClockKind::Wall,
            constants: SimConstants::default(),
            link_capacity: 4096,
            separation: 600.0,
            seed: 0,
            frame_every: 1,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let ship_defaults = defaults.constants.ship;

        let config = Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),

            tick_rate: parse_or(&lookup, "DUEL_TICK_RATE", defaults.tick_rate)?,
            clock: match lookup("DUEL_CLOCK") {
                Some(raw) => raw.parse()?,
                None => defaults.clock,
            },
            constants: SimConstants {
                ship: ShipTuning {
                    max_speed: parse_or(&lookup, "DUEL_MAX_SPEED", ship_defaults.max_speed)?,
                    max_acceleration: parse_or(
                        &lookup,
                        "DUEL_MAX_ACCELERATION",
                        ship_defaults.max_acceleration,
                    )?,
                    turn_rate: parse_or(&lookup, "DUEL_TURN_RATE", ship_defaults.turn_rate)?,
                    arrival_tolerance: parse_or(
                        &lookup,
                        "DUEL_ARRIVAL_TOLERANCE",
                        ship_defaults.arrival_tolerance,
                    )?,
                    idle_braking: parse_or(
                        &lookup,
                        "DUEL_IDLE_BRAKING",
                        ship_defaults.idle_braking,
                    )?,
                },
                speed_of_light: parse_or(
                    &lookup,
                    "DUEL_SPEED_OF_LIGHT",
                    defaults.constants.speed_of_light,
                )?,
            },

            link_capacity: parse_or(&lookup, "DUEL_LINK_CAPACITY", defaults.link_capacity)?,

            separation: parse_or(&lookup, "DUEL_SEPARATION", defaults.separation)?,
            seed: parse_or(&lookup, "DUEL_SEED", defaults.seed)?,

            frame_every: parse_or(&lookup, "DUEL_FRAME_EVERY", defaults.frame_every)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::OutOfRange("DUEL_TICK_RATE"));
        }
        // A zero or negative light speed would make every delay infinite or negative
        if !(self.constants.speed_of_light > 0.0) {
            return Err(ConfigError::OutOfRange("DUEL_SPEED_OF_LIGHT"));
        }
        let ship = &self.constants.ship;
        positive_finite(ship.max_speed, "DUEL_MAX_SPEED")?;
        positive_finite(ship.max_acceleration, "DUEL_MAX_ACCELERATION")?;
        positive_finite(ship.turn_rate, "DUEL_TURN_RATE")?;
        positive_finite(ship.arrival_tolerance, "DUEL_ARRIVAL_TOLERANCE")?;
        if !(self.separation.is_finite() && self.separation >= 0.0) {
            return Err(ConfigError::OutOfRange("DUEL_SEPARATION"));
        }
        if self.link_capacity == 0 {
            return Err(ConfigError::OutOfRange("DUEL_LINK_CAPACITY"));
        }
        if self.frame_every == 0 {
            return Err(ConfigError::OutOfRange("DUEL_FRAME_EVERY"));
        }
        Ok(())
    }

    /// Sim seconds covered by one tick
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.tick_rate as f64
    }
}

fn positive_finite(value: f64, key: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange(key))
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Value out of range for environment variable: {0}")]
    OutOfRange(&'static str),

    #[error("Unknown clock kind: {0} (expected wall or stepped)")]
    UnknownClock(String),
}
