//! Operator input - decodes text commands into instance commands
//!
//! Line formats, where `slot` is `1` or `2`:
//! - `<slot> <x> <y>` requests a waypoint
//! - `<slot> clear` empties the queue
//! - `<slot> truncate <index>` drops the waypoint at `index` and after

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::game::InstanceHandle;
use crate::net::protocol::{InputCommand, PlayerSlot};

/// Input parsing errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Unknown slot: {0} (expected 1 or 2)")]
    UnknownSlot(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument: {0}")]
    Missing(&'static str),

    #[error("Not a number: {0}")]
    NotANumber(String),

    #[error("Unexpected trailing input: {0}")]
    Trailing(String),
}

/// Parse one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<(PlayerSlot, InputCommand)>, InputError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let slot = match parts.next() {
        Some("1") => PlayerSlot::One,
        Some("2") => PlayerSlot::Two,
        Some(other) => return Err(InputError::UnknownSlot(other.to_string())),
        None => return Ok(None),
    };

    let first = parts.next().ok_or(InputError::Missing("command or x"))?;
    let command = match first {
        "clear" => InputCommand::ClearWaypoints,
        "truncate" => {
            let raw = parts.next().ok_or(InputError::Missing("index"))?;
            let index = raw
                .parse()
                .map_err(|_| InputError::NotANumber(raw.to_string()))?;
            InputCommand::TruncateWaypoints { index }
        }
        raw_x => {
            let x = parse_coord(raw_x).map_err(|e| match e {
                InputError::NotANumber(s) => InputError::UnknownCommand(s),
                other => other,
            })?;
            let raw_y = parts.next().ok_or(InputError::Missing("y"))?;
            let y = parse_coord(raw_y)?;
            InputCommand::WaypointRequested { x, y }
        }
    };

    if let Some(extra) = parts.next() {
        return Err(InputError::Trailing(extra.to_string()));
    }

    Ok(Some((slot, command)))
}

fn parse_coord(raw: &str) -> Result<f64, InputError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(InputError::NotANumber(raw.to_string())),
    }
}

/// Read commands until EOF, forwarding each to the matching instance
pub async fn pump_commands<R>(reader: R, handles: &[InstanceHandle]) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(Some((slot, command))) => {
                let Some(handle) = handles.iter().find(|h| h.slot == slot) else {
                    warn!(instance = %slot, "No instance for slot");
                    continue;
                };
                if !handle.send(command) {
                    warn!(instance = %slot, "Instance stopped, command dropped");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, line = %line, "Ignoring input line"),
        }
    }
    debug!("Input closed");
    Ok(())
}
