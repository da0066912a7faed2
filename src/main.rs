//! Lightspeed Duel - two ships that only see each other through light delay
//!
//! This is the main entry point. It:
//! - Runs two simulation instances as independent tokio tasks
//! - Connects them with one bounded observation channel per direction
//! - Reads operator waypoint commands from stdin
//! - Writes render frames to stdout as JSON lines

use anyhow::Context;
use tokio::io::BufReader;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lightspeed_duel::input::pump_commands;
use lightspeed_duel::output::write_frames;
use lightspeed_duel::util::time::SimClock;
use lightspeed_duel::{Config, Duel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env().context("loading duel configuration")?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Lightspeed Duel");
    info!(
        tick_rate = config.tick_rate,
        clock = ?config.clock,
        speed_of_light = config.constants.speed_of_light,
        separation = config.separation,
        "Duel configured"
    );

    let duel = Duel::new(&config);
    info!(one = ?duel.spawn.one, two = ?duel.spawn.two, "Ships spawned");

    // One shared clock so both instances measure arrival on the same timeline
    let clock = SimClock::new(config.clock, config.tick_seconds());

    let mut tasks = JoinSet::new();
    for instance in duel.instances {
        let slot = instance.slot();
        let tick_rate = config.tick_rate;
        tasks.spawn(async move { (slot, instance.run(clock, tick_rate).await) });
    }

    let handles = duel.handles;
    let frame_handles = handles.clone();
    let frame_every = config.frame_every;
    tokio::spawn(async move {
        if let Err(e) = write_frames(&frame_handles, tokio::io::stdout(), frame_every).await {
            // Renderer went away; nothing left to draw for
            info!(error = %e, "Frame output closed");
        }
    });

    let input_handles = handles.clone();
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = pump_commands(stdin, &input_handles).await {
            warn!(error = %e, "Input reader failed");
        }
    });

    let shutdown_handles = handles.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        for handle in &shutdown_handles {
            handle.shutdown();
        }
    });

    // Each instance ends on its own; a fatal link failure in one does not stop the other
    let mut fatal = None;
    while let Some(joined) = tasks.join_next().await {
        match joined.context("instance task panicked")? {
            (slot, Ok(stats)) => info!(instance = %slot, ?stats, "Instance finished"),
            (slot, Err(e)) => {
                error!(instance = %slot, error = %e, "Instance failed");
                fatal.get_or_insert((slot, e));
            }
        }
    }

    if let Some((slot, e)) = fatal {
        return Err(e).with_context(|| format!("instance {slot} stopped"));
    }

    info!("Duel shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    // stdout carries frames, so logs go to stderr
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
