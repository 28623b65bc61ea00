//! ==============================================================================
//! convert.rs - thermistor converter
//! ==============================================================================
//!
//! purpose:
//!     turns a raw 10-bit analog sample from the grove temperature sensor
//!     (ntc thermistor in a voltage divider) into a temperature.
//!
//! math:
//!     R  = (1023 / raw - 1) * R0
//!     1/T = ln(R / R0) / B + 1 / T0        (T in kelvin)
//!     with B = 4275, R0 = 100k, T0 = 298.15 K (25 C)
//!
//! ==============================================================================

use crate::domain::Scale;

/// thermistor characteristic constant
pub const B: f64 = 4275.0;
/// divider resistance, equal to the thermistor's resistance at T0
pub const R0: f64 = 100_000.0;
/// reference temperature in kelvin
pub const T0: f64 = 298.15;
/// full-scale value of the 10-bit adc
pub const ADC_MAX: f64 = 1023.0;

pub fn celsius(raw: f64) -> Option<f64> {
    // zero divides by zero; full scale and above drive R to zero or below
    if raw.is_nan() || raw <= 0.0 || raw >= ADC_MAX {
        return None;
    }
    let r = (ADC_MAX / raw - 1.0) * R0;
    let c = 1.0 / ((r / R0).ln() / B + 1.0 / T0) - 273.15;
    c.is_finite().then_some(c)
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Convert a raw sample to a temperature in `scale`.
///
/// Returns `None` for samples the thermistor equation cannot handle
/// (zero, negative, or at/above full scale). The reporter skips those ticks.
pub fn to_temperature(raw: f64, scale: Scale) -> Option<f64> {
    let c = celsius(raw)?;
    Some(match scale {
        Scale::Celsius => c,
        Scale::Fahrenheit => celsius_to_fahrenheit(c),
    })
}
