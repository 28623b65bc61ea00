//! ==============================================================================
//! shutdown.rs - shutdown sequencer
//! ==============================================================================
//!
//! purpose:
//!     the single path that ends a session gracefully. triggered by:
//!     - the OFF command (commands.rs)
//!     - ctrl-c / interrupt (client.rs)
//!
//!     a fatal socket write in either loop does NOT come through here: the
//!     error propagates out of client::run and main exits 1 without a
//!     sentinel.
//!
//! sequence (all under the sink lock):
//!     1. latch `running` false; a second caller stops here
//!     2. echo the triggering command, if any, to the log
//!     3. "HH:MM:SS SHUTDOWN" to the log, then to the socket
//!     4. flush the log, close our half of the connection
//!     then, outside the lock, release the sensor.
//!
//!     process exit (code 0) is main.rs's job once client::run returns.
//!
//! ==============================================================================

use crate::domain::{echo_record, shutdown_record, timestamp};
use crate::error::Result;
use crate::state::RuntimeState;

/// Run the shutdown sequence.
///
/// Returns `Ok(true)` for the call that actually shut down, `Ok(false)` for
/// any later call. An error means the sentinel could not be sent.
pub async fn shutdown(state: &RuntimeState) -> Result<bool> {
    sequence(state, None).await
}

/// Shut down in response to a received command line, echoing it to the log
/// in the same critical section as the sentinel.
pub async fn shutdown_on_command(state: &RuntimeState, line: &[u8]) -> Result<bool> {
    sequence(state, Some(line)).await
}

async fn sequence(state: &RuntimeState, command: Option<&[u8]>) -> Result<bool> {
    let mut sinks = state.sinks().await;
    if !state.stop_running() {
        return Ok(false);
    }

    if let Some(line) = command {
        sinks.echo(&echo_record(line)).await?;
    }
    let record = shutdown_record(&timestamp());
    let sent = sinks.emit(&record).await;
    sinks.close().await;
    drop(sinks);

    state.sensor().release();
    sent?;

    tracing::info!("[SHUTDOWN] sentinel sent, connection closed");
    Ok(true)
}
