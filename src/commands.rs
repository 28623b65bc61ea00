//! ==============================================================================
//! commands.rs - command loop
//! ==============================================================================
//!
//! purpose:
//!     reads newline-delimited control lines from the server and applies
//!     them to RuntimeState, in arrival order. every non-blank line is echoed
//!     to the log (log only, never back to the server), byte for byte as it
//!     arrived. a command is applied and echoed under the sink lock, so a
//!     concurrent shutdown sees either both or neither.
//!
//! commands:
//!     OFF          echo, then shutdown sequencer
//!     STOP         reporting off
//!     START        reporting on
//!     SCALE=C|F    change unit (other letters: echoed, ignored)
//!     PERIOD=n     change period, n >= 1 (anything else: echoed, ignored)
//!     *            echoed, ignored
//!
//! framing:
//!     BufReader::read_until keeps a partial line buffered until its newline
//!     arrives, however the bytes were split across reads. a trailing '\r'
//!     is dropped. blank lines are skipped.
//!
//! termination:
//!     Ok(()) after OFF. the server closing the connection is an error
//!     (ConnectionClosed); a partial line pending at that point is applied
//!     first.
//!
//! ==============================================================================

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::domain::{echo_record, Command};
use crate::error::{ClientError, Result};
use crate::shutdown::shutdown_on_command;
use crate::state::RuntimeState;

/// what the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

pub async fn run<R>(state: &RuntimeState, reader: R) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(ClientError::NetworkRead)?;
        if n == 0 {
            return Err(ClientError::ConnectionClosed);
        }

        let terminated = buf.last() == Some(&b'\n');
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if !line.is_empty() && apply(state, line).await? == Flow::Shutdown {
            return Ok(());
        }
        if !terminated {
            return Err(ClientError::ConnectionClosed);
        }
    }
}

/// Apply one raw command line and echo it to the log.
///
/// Lines that are not valid utf-8 can't match a command; they are echoed
/// unchanged and otherwise ignored.
pub async fn apply(state: &RuntimeState, raw: &[u8]) -> Result<Flow> {
    let text = String::from_utf8_lossy(raw);
    let line: &str = &text;
    let command = Command::parse(line);

    if command == Command::Off {
        tracing::info!("[COMMAND] OFF received, shutting down");
        shutdown_on_command(state, raw).await?;
        return Ok(Flow::Shutdown);
    }

    let mut sinks = state.sinks().await;
    // nothing may follow the sentinel (an interrupt may have got there first)
    if !state.is_running() {
        tracing::debug!("[COMMAND] '{}' arrived after shutdown, dropped", line);
        return Ok(Flow::Continue);
    }

    match command {
        Command::Stop => {
            state.set_reporting(false);
            tracing::info!("[COMMAND] reporting stopped");
        }
        Command::Start => {
            state.set_reporting(true);
            tracing::info!("[COMMAND] reporting started");
        }
        Command::Scale(scale) => {
            state.set_scale(scale);
            tracing::info!("[COMMAND] scale set to {}", scale);
        }
        Command::Period(secs) => {
            state.set_period_secs(secs);
            tracing::info!("[COMMAND] period set to {}s", secs);
        }
        Command::Rejected(reason) => {
            tracing::warn!("[COMMAND] ignoring '{}': {}", line, reason);
        }
        Command::Off | Command::Unknown => {
            tracing::warn!("[COMMAND] ignoring unrecognized '{}'", line);
        }
    }

    sinks.echo(&echo_record(raw)).await?;
    Ok(Flow::Continue)
}
