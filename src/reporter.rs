//! ==============================================================================
//! reporter.rs - reporter loop
//! ==============================================================================
//!
//! purpose:
//!     owns the sampling cadence. every tick, while reporting is enabled:
//!     sample -> convert -> timestamp -> "HH:MM:SS 72.4" to log and socket.
//!
//! relationships:
//!     - reads: state.rs (scale, period, enabled, running) once per tick
//!     - uses: hal.rs (raw sample), convert.rs (thermistor math)
//!     - spawned by: client.rs
//!
//! termination:
//!     the loop never clears `running` itself. it returns Ok once the
//!     shutdown sequencer has finished (not merely started), or Err on a
//!     fatal socket/log write.
//!
//! ==============================================================================

use std::sync::Arc;

use crate::convert;
use crate::domain::{reading_record, timestamp};
use crate::error::Result;
use crate::state::RuntimeState;

pub async fn run(state: Arc<RuntimeState>) -> Result<()> {
    tracing::info!(
        "[REPORTER] started ({}s period, scale {})",
        state.period_secs(),
        state.scale()
    );

    while state.is_running() {
        if state.reporting() {
            tick(&state).await?;
        }
        tokio::time::sleep(state.period()).await;
    }

    // the sequencer holds the sink lock from the latch until the socket is
    // closed; don't return while it is still writing
    drop(state.sinks().await);

    tracing::debug!("[REPORTER] stopped");
    Ok(())
}

/// One reporting tick. Returns whether a reading was emitted.
///
/// A failed sensor read or an unconvertible sample skips the tick.
pub async fn tick(state: &RuntimeState) -> Result<bool> {
    // a short bus transaction; not worth a blocking-pool hop
    let raw = match state.sensor().read_raw() {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("[REPORTER] skipping tick: {}", e);
            return Ok(false);
        }
    };

    let scale = state.scale();
    let Some(temperature) = convert::to_temperature(raw, scale) else {
        tracing::warn!("[REPORTER] skipping tick: raw sample {} out of range", raw);
        return Ok(false);
    };

    let mut sinks = state.sinks().await;
    if !state.is_running() {
        return Ok(false);
    }
    let record = reading_record(&timestamp(), temperature);
    sinks.emit(&record).await?;
    drop(sinks);

    tracing::debug!("[REPORTER] {}", record.trim_end());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::Scale;
    use crate::error::ClientError;
    use crate::hal::TemperatureSensor;
    use crate::shutdown::shutdown;
    use crate::sinks::testing::{BrokenPipe, SharedBuffer};
    use crate::sinks::SinkPair;
    use crate::state::testing::{state_with, ScriptedSensor};

    fn temperatures(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|l| l.split_once(' ').map(|(_, v)| v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_tick_emits_converted_reading() {
        let (state, log, net) = state_with(Scale::Fahrenheit, 1, ScriptedSensor::new(&[511.5]));

        assert!(tick(&state).await.unwrap());
        state.set_scale(Scale::Celsius);
        assert!(tick(&state).await.unwrap());

        assert_eq!(temperatures(&log.lines()), vec!["77.0", "25.0"]);
        assert_eq!(log.contents(), net.contents());
    }

    #[tokio::test]
    async fn test_bad_samples_skip_the_tick() {
        let (state, log, _) = state_with(Scale::Celsius, 1, ScriptedSensor::new(&[0.0, 1023.0, 511.5]));

        assert!(!tick(&state).await.unwrap());
        assert!(!tick(&state).await.unwrap());
        assert!(tick(&state).await.unwrap());
        assert_eq!(temperatures(&log.lines()), vec!["25.0"]);
    }

    #[tokio::test]
    async fn test_nothing_follows_the_sentinel() {
        let (state, log, net) = state_with(Scale::Celsius, 1, ScriptedSensor::new(&[511.5]));

        assert!(shutdown(&state).await.unwrap());
        assert!(!tick(&state).await.unwrap());

        assert_eq!(log.lines().len(), 1);
        assert!(net.contents().ends_with("SHUTDOWN\n"));
    }

    #[tokio::test]
    async fn test_network_failure_ends_the_loop() {
        let log = SharedBuffer::default();
        let sinks = SinkPair::new(Box::new(log.clone()), Box::new(BrokenPipe));
        let sensor: Box<dyn TemperatureSensor> = Box::new(ScriptedSensor::new(&[511.5]));
        let state = Arc::new(RuntimeState::new(Scale::Celsius, 1, sinks, sensor));

        let err = run(state).await.unwrap_err();
        assert!(matches!(err, ClientError::NetworkWrite(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_reporting_emits_nothing() {
        let (state, log, _) = state_with(Scale::Celsius, 1, ScriptedSensor::new(&[511.5]));
        let state = Arc::new(state);
        state.set_reporting(false);

        let handle = tokio::spawn(run(state.clone()));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(log.contents().is_empty());

        // re-enabled: picked up on the next tick
        state.set_reporting(true);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(log.lines().len(), 1);

        shutdown(&state).await.unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_period_change_applies_on_next_tick() {
        let (state, log, _) = state_with(Scale::Celsius, 1, ScriptedSensor::new(&[511.5]));
        let state = Arc::new(state);

        let handle = tokio::spawn(run(state.clone()));
        // ticks at 0 and 1s; the sleep started at 1s still uses the old period
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(log.lines().len(), 2);
        state.set_period_secs(3);

        // tick at 2s, then the next one waits 3s (5s)
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(log.lines().len(), 3);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(log.lines().len(), 4);

        shutdown(&state).await.unwrap();
        handle.abort();
    }
}
