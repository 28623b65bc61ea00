//! ==============================================================================
//! error.rs - client error taxonomy
//! ==============================================================================
//!
//! purpose:
//!     one error type for everything that can stop the client.
//!     main.rs maps every variant to exit code 1. malformed control input
//!     is NOT an error: it is logged and ignored by the command loop.
//!
//! classes:
//!     - startup configuration  (Config, ConfigFile)
//!     - resource acquisition   (LogOpen, Connect, SensorInit)
//!     - runtime i/o            (NetworkWrite, LogWrite, NetworkRead, ConnectionClosed)
//!
//! ==============================================================================

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[cfg_attr(not(feature = "hardware"), allow(dead_code))]
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to load config file {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    #[error("could not open log file {path}: {source}")]
    LogOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("sensor initialization failed: {0}")]
    SensorInit(String),

    #[cfg_attr(not(feature = "hardware"), allow(dead_code))]
    #[error("sensor read failed: {0}")]
    SensorRead(String),

    #[error("could not write to socket: {0}")]
    NetworkWrite(#[source] io::Error),

    #[error("could not write to log file: {0}")]
    LogWrite(#[source] io::Error),

    #[error("could not read from socket: {0}")]
    NetworkRead(#[source] io::Error),

    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("reporter task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
