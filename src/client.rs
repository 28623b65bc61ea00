//! ==============================================================================
//! client.rs - session orchestration
//! ==============================================================================
//!
//! purpose:
//!     wires the two loops together once the connection is up:
//!
//!     ┌──────────────────────┐        ┌──────────────────────┐
//!     │ reporter (spawned)   │        │ commands (this task) │
//!     │ sleep / sample / emit│        │ read / apply / echo  │
//!     └──────────┬───────────┘        └──────────┬───────────┘
//!                │      RuntimeState (Arc)       │
//!                └──────────────┬────────────────┘
//!                      sink lock: log + socket
//!
//!     the session ends on the first of:
//!     - command loop: OFF (Ok) or closed connection / i/o failure (Err)
//!     - reporter: fatal write (Err)
//!     - interrupt: runs the shutdown sequencer (Ok)
//!
//!     a reporter that stopped cleanly or an interrupt that lost the race to
//!     OFF does not end it; the command loop still owns the OFF sequence and
//!     returns once the sentinel is out.
//!
//!     the reporter is aborted afterwards. it can't be mid-record: once the
//!     sentinel is out it never takes the sink lock to write again.
//!
//! ==============================================================================

use std::future::Future;
use std::sync::Arc;

use tokio::io::AsyncRead;

use crate::commands;
use crate::domain::identity_record;
use crate::error::{ClientError, Result};
use crate::reporter;
use crate::shutdown::shutdown;
use crate::state::RuntimeState;

/// Send "ID=<id>" to the server and the log, once, before anything else.
pub async fn identify(state: &RuntimeState, id: &str) -> Result<()> {
    state.sinks().await.emit(&identity_record(id)).await
}

/// Run a session until graceful shutdown (Ok) or a fatal error.
pub async fn run<R, I>(state: Arc<RuntimeState>, commands: R, interrupt: I) -> Result<()>
where
    R: AsyncRead + Unpin,
    I: Future<Output = ()>,
{
    let mut reporter = tokio::spawn(reporter::run(state.clone()));
    let mut reporter_done = false;
    let mut interrupt_done = false;

    let commands = commands::run(&state, commands);
    // polled alongside the command loop, so an OFF sequence already holding
    // the sink lock keeps making progress while this one waits for it
    let on_interrupt = async {
        interrupt.await;
        tracing::info!("[SHUTDOWN] interrupt received");
        shutdown(&state).await
    };
    tokio::pin!(commands, on_interrupt);

    let outcome = loop {
        tokio::select! {
            res = &mut commands => break res,
            res = &mut reporter, if !reporter_done => match res {
                // stopped because a shutdown completed; the command loop reports it
                Ok(Ok(())) => reporter_done = true,
                Ok(Err(e)) => break Err(e),
                Err(e) => break Err(ClientError::Task(e.to_string())),
            },
            res = &mut on_interrupt, if !interrupt_done => match res {
                Ok(true) => break Ok(()),
                // an OFF got there first and has finished; let the command loop return
                Ok(false) => interrupt_done = true,
                Err(e) => break Err(e),
            },
        }
    };

    reporter.abort();
    outcome
}
