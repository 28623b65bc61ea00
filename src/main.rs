//! ==============================================================================
//! main.rs - temperature reporting client entry point
//! ==============================================================================
//!
//! purpose:
//!     samples a thermistor on a fixed cadence and streams timestamped
//!     readings to a remote server over one tcp connection. the server can
//!     steer the client in-band (STOP / START / SCALE= / PERIOD= / OFF).
//!     every record sent, and every command received, is mirrored to a
//!     local append-only log file.
//!
//! responsibilities (this file):
//!     - parse and validate the command line (cli.rs)
//!     - load tempreport.toml (config.rs) and set up tracing
//!     - acquire resources: log file, sensor, connection
//!     - send the identity line and hand over to client.rs
//!     - map the outcome to an exit code (0 graceful, 1 anything else)
//!
//! wire protocol (newline-terminated ascii):
//!
//!     client -> server            server -> client
//!     ID=123456789                STOP
//!     17:02:11 72.4               SCALE=C
//!     17:02:12 72.5               PERIOD=5
//!     ...                         OFF
//!     17:03:40 SHUTDOWN
//!
//! ==============================================================================

mod cli;
mod client;
mod commands;
mod config;
mod convert;
mod domain;
mod error;
mod hal;
mod reporter;
mod shutdown;
mod sinks;
mod state;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpStream;

use crate::cli::{Args, ClientConfig};
use crate::config::HostConfig;
use crate::error::ClientError;
use crate::sinks::SinkPair;
use crate::state::RuntimeState;

#[tokio::main]
async fn main() -> ExitCode {
    // startup errors exit 1, not clap's usual 2
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    let (host_config, config_source) = match HostConfig::load_or_default(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("[ERROR] Fatal: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&host_config.logging.level);
    tracing::info!("[CONFIG] {}", config_source);

    match start(&args, &host_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("[ERROR] Fatal: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// diagnostics go to stderr; RUST_LOG wins over the config file
fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn start(args: &Args, host_config: &HostConfig) -> Result<()> {
    let config = ClientConfig::from(args);
    tracing::info!(
        "[STARTUP] id {} -> {}:{} (period {}s, scale {}, log {})",
        config.id,
        config.host,
        config.port,
        config.period_secs,
        config.scale,
        config.log_path.display()
    );

    // step 1: log file
    let log = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .await
        .map_err(|source| ClientError::LogOpen {
            path: config.log_path.clone(),
            source,
        })?;

    // step 2: sensor
    let sensor = hal::open_sensor(&host_config.sensor)?;

    // step 3: connection
    let stream = TcpStream::connect((config.host.as_str(), config.port))
        .await
        .map_err(|source| ClientError::Connect {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;
    tracing::info!("[STARTUP] ✓ connected to {}:{}", config.host, config.port);

    let (read_half, write_half) = stream.into_split();
    let sinks = SinkPair::new(Box::new(log), Box::new(write_half));
    let state = Arc::new(RuntimeState::from_config(&config, sinks, sensor));

    // step 4: identify, then run both loops
    client::identify(&state, &config.id)
        .await
        .context("failed to send identity")?;

    client::run(state, read_half, interrupted())
        .await
        .context("session ended abnormally")?;

    tracing::info!("[SHUTDOWN] ✓ graceful exit");
    Ok(())
}

/// resolves on ctrl-c; never, if the handler can't be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
