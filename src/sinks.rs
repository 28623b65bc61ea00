//! ==============================================================================
//! sinks.rs - the log file + network connection pair
//! ==============================================================================
//!
//! purpose:
//!     every record leaves the process through here. the pair is only ever
//!     touched while holding RuntimeState's sink lock, so a record is written
//!     whole to the log and then whole to the socket before anyone else
//!     gets a turn.
//!
//! failure policy:
//!     - socket write failure is fatal (NetworkWrite)
//!     - log write failure is fatal too (LogWrite); the log is the only
//!       local record of what was sent
//!
//! ==============================================================================

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{ClientError, Result};

pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub struct SinkPair {
    log: BoxedWriter,
    net: BoxedWriter,
}

impl SinkPair {
    pub fn new(log: BoxedWriter, net: BoxedWriter) -> Self {
        Self { log, net }
    }

    /// append to the log, then send the same bytes to the server
    pub async fn emit(&mut self, record: &str) -> Result<()> {
        self.echo(record.as_bytes()).await?;
        self.net
            .write_all(record.as_bytes())
            .await
            .map_err(ClientError::NetworkWrite)?;
        self.net.flush().await.map_err(ClientError::NetworkWrite)
    }

    /// append to the log only; command echoes are written byte for byte
    pub async fn echo(&mut self, record: &[u8]) -> Result<()> {
        self.log
            .write_all(record)
            .await
            .map_err(ClientError::LogWrite)?;
        self.log.flush().await.map_err(ClientError::LogWrite)
    }

    /// flush the log and close our side of the connection
    pub async fn close(&mut self) {
        if let Err(e) = self.log.flush().await {
            tracing::warn!("final log flush failed: {}", e);
        }
        if let Err(e) = self.net.shutdown().await {
            tracing::debug!("socket shutdown: {}", e);
        }
    }
}

// ==============================================================================
// test support
// ==============================================================================
