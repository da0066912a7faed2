//! Render output - forwards published frames to the renderer as JSON lines
//!
//! Each instance publishes a frame every tick on its watch channel. One
//! forwarder per instance encodes frames and hands them to a single writer,
//! so lines from both instances never interleave. The writer is async; a
//! renderer that stops reading stalls only these tasks, never a tick.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::game::frame::FrameThrottle;
use crate::game::InstanceHandle;
use crate::net::protocol::{Frame, PlayerSlot};

/// Encoded lines waiting for the writer, per instance
const LINES_PER_INSTANCE: usize = 4;

/// Write frames from every handle to `writer` until all instances stop.
///
/// Only every `frame_every`th tick of each instance is written.
pub async fn write_frames<W>(
    handles: &[InstanceHandle],
    mut writer: W,
    frame_every: u32,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let (line_tx, mut line_rx) = mpsc::channel(LINES_PER_INSTANCE * handles.len().max(1));

    let mut forwarders = JoinSet::new();
    for handle in handles {
        forwarders.spawn(forward_frames(
            handle.slot,
            handle.frame_rx.clone(),
            line_tx.clone(),
            frame_every,
        ));
    }
    drop(line_tx);

    while let Some(line) = line_rx.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }

    debug!("All frame sources closed");
    Ok(())
}

async fn forward_frames(
    slot: PlayerSlot,
    mut frame_rx: watch::Receiver<Option<Frame>>,
    line_tx: mpsc::Sender<String>,
    frame_every: u32,
) {
    let mut throttle = FrameThrottle::new(frame_every);

    while frame_rx.changed().await.is_ok() {
        let Some(frame) = frame_rx.borrow_and_update().clone() else {
            continue;
        };
        if !throttle.admit(frame.tick) {
            continue;
        }

        let mut line = match serde_json::to_string(&frame) {
            Ok(line) => line,
            Err(e) => {
                warn!(instance = %slot, error = %e, "Failed to encode frame");
                continue;
            }
        };
        line.push('\n');

        if line_tx.send(line).await.is_err() {
            // Writer went away; nothing left to draw for
            break;
        }
    }
}
