//! ==============================================================================
//! hal.rs - Hardware Abstraction Layer
//! ==============================================================================
//!
//! purpose:
//!     provides a unified interface for reading the analog temperature sensor.
//!     abstracts away the difference between running on a real Raspberry Pi
//!     (grove base hat adc over i2c, using `rppal`) and a development machine
//!     (using a mock).
//!
//! design philosophy:
//!     - "Compile Anywhere": The client should compile on Windows/Mac/Linux.
//!     - "Opaque Sample": callers only see a raw reading on the 10-bit scale.
//!       the thermistor math lives in convert.rs.
//!
//! relationships:
//!     - used by: state.rs (owned by RuntimeState), reporter.rs (one read per tick)
//!     - released by: shutdown.rs
//!     - uses: rppal (on feature="hardware")
//!
//! ==============================================================================

use crate::config::SensorConfig;
use crate::error::{ClientError, Result};

pub trait TemperatureSensor: Send + Sync {
    /// one raw sample on the 10-bit scale (0..=1023)
    fn read_raw(&self) -> Result<f64>;

    /// give the device back; reads after this fail
    fn release(&self) {}
}

/// open the backend named in the config
pub fn open_sensor(config: &SensorConfig) -> Result<Box<dyn TemperatureSensor>> {
    match config.backend.as_str() {
        "mock" => Ok(Box::new(MockSensor::new(config.mock_raw))),
        #[cfg(feature = "hardware")]
        "grove" => Ok(Box::new(GroveAdc::open(config.i2c_address()?, config.channel)?)),
        #[cfg(not(feature = "hardware"))]
        "grove" => Err(ClientError::SensorInit(
            "grove backend requires building with --features hardware".to_string(),
        )),
        other => Err(ClientError::SensorInit(format!("unknown sensor backend '{}'", other))),
    }
}

// ==============================================================================================
// MOCK IMPLEMENTATION (For WSL / Non-Hardware Build)
// ==============================================================================================

pub struct MockSensor {
    raw: f64,
}

impl MockSensor {
    pub fn new(raw: f64) -> Self {
        tracing::info!("Using MOCK sensor (raw sample fixed at {})", raw);
        Self { raw }
    }
}

impl TemperatureSensor for MockSensor {
    fn read_raw(&self) -> Result<f64> {
        tracing::trace!("[MOCK ADC] raw {}", self.raw);
        Ok(self.raw)
    }
}

// ==============================================================================================
// REAL IMPLEMENTATION (For Raspberry Pi + Grove Base Hat)
// ==============================================================================================
// the hat's stm32 exposes each adc channel as a 16-bit little-endian register
// at 0x10 + channel holding a 12-bit conversion.

#[cfg(feature = "hardware")]
pub struct GroveAdc {
    i2c: std::sync::Mutex<Option<rppal::i2c::I2c>>,
    channel: u8,
}

#[cfg(feature = "hardware")]
impl GroveAdc {
    const RAW_REGISTER_BASE: u8 = 0x10;
    const FULL_SCALE_12BIT: f64 = 4095.0;

    pub fn open(address: u16, channel: u8) -> Result<Self> {
        use rppal::i2c::I2c;
        let mut i2c = I2c::new().map_err(|e| ClientError::SensorInit(e.to_string()))?;
        i2c.set_slave_address(address)
            .map_err(|e| ClientError::SensorInit(e.to_string()))?;
        tracing::info!("Using REAL HARDWARE sensor (grove adc 0x{:02X}, channel {})", address, channel);
        Ok(Self {
            i2c: std::sync::Mutex::new(Some(i2c)),
            channel,
        })
    }
}

#[cfg(feature = "hardware")]
impl TemperatureSensor for GroveAdc {
    fn read_raw(&self) -> Result<f64> {
        let guard = self
            .i2c
            .lock()
            .map_err(|_| ClientError::SensorRead("i2c lock poisoned".to_string()))?;
        let i2c = guard
            .as_ref()
            .ok_or_else(|| ClientError::SensorRead("sensor released".to_string()))?;

        let mut buf = [0u8; 2];
        i2c.write_read(&[Self::RAW_REGISTER_BASE + self.channel], &mut buf)
            .map_err(|e| ClientError::SensorRead(e.to_string()))?;
        let raw12 = u16::from_le_bytes(buf) as f64;
        Ok(raw12 * crate::convert::ADC_MAX / Self::FULL_SCALE_12BIT)
    }

    fn release(&self) {
        if let Ok(mut guard) = self.i2c.lock() {
            guard.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_sensor_reads_configured_value() {
        let sensor = MockSensor::new(600.0);
        assert_eq!(sensor.read_raw().unwrap(), 600.0);
        sensor.release();
    }

    #[test]
    fn test_open_sensor_backends() {
        let mut config = SensorConfig::default();
        assert!(open_sensor(&config).is_ok());

        config.backend = "thermocouple".to_string();
        assert!(matches!(open_sensor(&config), Err(ClientError::SensorInit(_))));
    }

    #[cfg(not(feature = "hardware"))]
    #[test]
    fn test_grove_requires_hardware_feature() {
        let config = SensorConfig {
            backend: "grove".to_string(),
            ..SensorConfig::default()
        };
        assert!(matches!(open_sensor(&config), Err(ClientError::SensorInit(_))));
    }
}
