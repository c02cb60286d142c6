//! Unit conversion between raw device values and engineering units.
//!
//! The controller reports temperatures in deciselsius (°C × 10). The
//! `ComfortTemperature` configuration parameter additionally carries a fixed
//! offset of 8 raw units, which must be applied identically on reads and
//! writes:
//!
//! ```text
//! encode(celsius) = celsius * 10 + 8
//! decode(raw)     = (raw - 8) / 10
//! ```

/// Raw offset the device adds to the comfort temperature.
pub const COMFORT_TEMPERATURE_OFFSET: i64 = 8;

/// Convert a deciselsius reading to degrees Celsius.
#[must_use]
pub fn from_deciselsius(raw: i32) -> f64 {
    f64::from(raw) / 10.0
}

/// Encode a comfort temperature in °C into the device's raw value.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode_comfort_temperature(celsius: f64) -> i64 {
    (celsius * 10.0).round() as i64 + COMFORT_TEMPERATURE_OFFSET
}

/// Decode a raw comfort temperature into °C.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn decode_comfort_temperature(raw: i64) -> f64 {
    (raw - COMFORT_TEMPERATURE_OFFSET) as f64 / 10.0
}
