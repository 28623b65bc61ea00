//! ==============================================================================
//! state.rs - shared runtime state
//! ==============================================================================
//!
//! purpose:
//!     the one object both loops hold (behind an Arc). owns:
//!     - the mutable reporting settings (scale, period, enabled)
//!     - the running latch
//!     - the sink pair, behind a single lock
//!     - the sensor
//!
//! consistency:
//!     the scalar settings are atomics, not guarded by the sink lock. the
//!     reporter reads them once per tick, so a change from the command loop
//!     shows up on the next tick at the latest. that staleness is accepted.
//!
//!     `running` is the exception: it is flipped by the shutdown sequencer
//!     while holding the sink lock, and the reporter re-checks it under the
//!     same lock before emitting. nothing can follow the SHUTDOWN record.
//!
//! ==============================================================================

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};

use crate::cli::ClientConfig;
use crate::domain::Scale;
use crate::hal::TemperatureSensor;
use crate::sinks::SinkPair;

pub struct RuntimeState {
    scale: AtomicU8,
    period_secs: AtomicU64,
    reporting: AtomicBool,
    running: AtomicBool,
    sinks: Mutex<SinkPair>,
    sensor: Box<dyn TemperatureSensor>,
}

impl RuntimeState {
    pub fn new(scale: Scale, period_secs: u64, sinks: SinkPair, sensor: Box<dyn TemperatureSensor>) -> Self {
        Self {
            scale: AtomicU8::new(scale.to_u8()),
            period_secs: AtomicU64::new(period_secs.max(1)),
            reporting: AtomicBool::new(true),
            running: AtomicBool::new(true),
            sinks: Mutex::new(sinks),
            sensor,
        }
    }

    pub fn from_config(config: &ClientConfig, sinks: SinkPair, sensor: Box<dyn TemperatureSensor>) -> Self {
        Self::new(config.scale, config.period_secs, sinks, sensor)
    }

    pub fn scale(&self) -> Scale {
        // only ever stored from a valid Scale
        Scale::from_u8(self.scale.load(Ordering::SeqCst)).unwrap_or(Scale::Fahrenheit)
    }

    pub fn set_scale(&self, scale: Scale) {
        self.scale.store(scale.to_u8(), Ordering::SeqCst);
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs.load(Ordering::SeqCst))
    }

    pub fn period_secs(&self) -> u64 {
        self.period_secs.load(Ordering::SeqCst)
    }

    /// zero is refused; the period stays at least one second
    pub fn set_period_secs(&self, secs: u64) -> bool {
        if secs == 0 {
            return false;
        }
        self.period_secs.store(secs, Ordering::SeqCst);
        true
    }

    pub fn reporting(&self) -> bool {
        self.reporting.load(Ordering::SeqCst)
    }

    pub fn set_reporting(&self, enabled: bool) {
        self.reporting.store(enabled, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// one-shot latch: true for exactly one caller, the first
    ///
    /// callers must hold the sink lock (see shutdown.rs)
    pub(crate) fn stop_running(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }

    pub async fn sinks(&self) -> MutexGuard<'_, SinkPair> {
        self.sinks.lock().await
    }

    pub fn sensor(&self) -> &dyn TemperatureSensor {
        self.sensor.as_ref()
    }
}
