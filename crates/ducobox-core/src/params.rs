//! Configuration parameters and namespace routing.
//!
//! The controller keeps tunables in two namespaces:
//!
//! - **Box-level** parameters live in the `Energy` module of `/boxconfigget`
//!   and are written through `/boxconfigset?mod=Energy`.
//! - **Node-level** parameters live in `/nodeconfigget?node=<id>` and are
//!   written through `/nodeconfigset?node=<id>`.
//!
//! Node 1 (the box) exposes the union of both. The routing table below is the
//! single source of truth for reads and writes alike.

use crate::model::NodeId;
use crate::units::{decode_comfort_temperature, encode_comfort_temperature};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Module qualifier for box-level parameters.
pub const BOX_CONFIG_MODULE: &str = "Energy";

/// Parameter whose raw value carries the comfort temperature offset.
pub const COMFORT_TEMPERATURE: &str = "ComfortTemperature";

/// Parameter names that belong to the box-level namespace.
pub const BOX_PARAMETERS: [&str; 9] = [
    "BypassMode",
    "BypassAdaptive",
    COMFORT_TEMPERATURE,
    "FilterReset",
    "CalibPinMax",
    "CalibPoutMax",
    "CalibQout",
    "ProgramModeZone1",
    "ProgramModeZone2",
];

const STEP_TOLERANCE: f64 = 1e-6;

/// Namespace a parameter name is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Namespace {
    /// `/boxconfigget` / `/boxconfigset`
    Box,
    /// `/nodeconfigget` / `/nodeconfigset`
    Node,
}

impl Namespace {
    /// Route a parameter name.
    #[must_use]
    pub fn of(name: &str) -> Self {
        if BOX_PARAMETERS.contains(&name) {
            Self::Box
        } else {
            Self::Node
        }
    }
}

/// A tunable value in engineering units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigParameter {
    /// Current value
    pub value: f64,
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
    /// Increment between accepted values
    pub step: f64,
}

impl ConfigParameter {
    /// Build a parameter from the raw `Val`/`Min`/`Max`/`Inc` the device reports,
    /// decoding the comfort temperature offset where it applies.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_device(name: &str, val: f64, min: f64, max: f64, inc: f64) -> Self {
        if name == COMFORT_TEMPERATURE {
            let decode = |raw: f64| decode_comfort_temperature(raw.round() as i64);
            // Raw 0/0 means no bounds were reported; keep it undecoded.
            let bounded = min != 0.0 || max != 0.0;
            Self {
                value: decode(val),
                min: if bounded { decode(min) } else { 0.0 },
                max: if bounded { decode(max) } else { 0.0 },
                step: inc / 10.0,
            }
        } else {
            Self {
                value: val,
                min,
                max,
                step: inc,
            }
        }
    }

    /// Whether the device reported bounds. Missing `Min`/`Max` both default to 0.
    fn has_range(&self) -> bool {
        self.min != 0.0 || self.max != 0.0
    }

    /// Validate `value` against range and increment and produce the raw write.
    ///
    /// # Errors
    ///
    /// Returns error if the value is not finite, out of range, not a whole
    /// number of steps above `min`, or not representable as a raw integer.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write(&self, name: &str, value: f64) -> Result<ConfigWrite, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite);
        }

        if self.has_range()
            && (value < self.min - STEP_TOLERANCE || value > self.max + STEP_TOLERANCE)
        {
            return Err(ParamError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }

        if self.step > 0.0 {
            let steps = (value - self.min) / self.step;
            if (steps - steps.round()).abs() > STEP_TOLERANCE {
                return Err(ParamError::NotOnStep {
                    value,
                    min: self.min,
                    step: self.step,
                });
            }
        }

        let raw = if name == COMFORT_TEMPERATURE {
            encode_comfort_temperature(value)
        } else {
            if (value - value.round()).abs() > STEP_TOLERANCE {
                return Err(ParamError::NotInteger(value));
            }
            value.round() as i64
        };

        Ok(ConfigWrite {
            name: name.to_string(),
            raw,
        })
    }
}

/// A validated configuration write, ready for transmission.
///
/// Only [`ConfigParameter::write`] constructs one, so every write on the wire
/// has been checked against the parameter's range and increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWrite {
    name: String,
    raw: i64,
}

impl ConfigWrite {
    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw integer value sent to the device.
    #[must_use]
    pub fn raw(&self) -> i64 {
        self.raw
    }

    /// Namespace this write is routed to.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        Namespace::of(&self.name)
    }
}

/// Configuration of a single node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node the configuration belongs to
    pub node_id: Option<NodeId>,
    /// Location label from the node config, if reported
    pub location: Option<String>,
    /// Parameters keyed by name
    pub params: BTreeMap<String, ConfigParameter>,
}

impl NodeConfig {
    /// Look up a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConfigParameter> {
        self.params.get(name)
    }
}

/// Rejected configuration write.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// NaN or infinite
    #[error("value is not a finite number")]
    NotFinite,
    /// Outside `[min, max]`
    #[error("value {value} is outside {min}..={max}")]
    OutOfRange {
        /// Requested value
        value: f64,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Not aligned to the increment
    #[error("value {value} is not {min} plus a multiple of {step}")]
    NotOnStep {
        /// Requested value
        value: f64,
        /// Lower bound the steps count from
        min: f64,
        /// Increment
        step: f64,
    },
    /// The device only accepts integers for this parameter
    #[error("value {0} is not an integer")]
    NotInteger(f64),
    /// Parameter not present in the node's configuration
    #[error("unknown parameter {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn co2_setpoint() -> ConfigParameter {
        ConfigParameter::from_device("CO2Setpoint", 900.0, 400.0, 2000.0, 50.0)
    }

    #[test]
    fn routing_table() {
        assert_eq!(Namespace::of("BypassMode"), Namespace::Box);
        assert_eq!(Namespace::of("ComfortTemperature"), Namespace::Box);
        assert_eq!(Namespace::of("ProgramModeZone2"), Namespace::Box);
        assert_eq!(Namespace::of("CO2Setpoint"), Namespace::Node);
        assert_eq!(Namespace::of("Capacity"), Namespace::Node);
    }

    #[test]
    fn write_on_increment_is_accepted() {
        let write = co2_setpoint().write("CO2Setpoint", 950.0).unwrap();
        assert_eq!(write.name(), "CO2Setpoint");
        assert_eq!(write.raw(), 950);
        assert_eq!(write.namespace(), Namespace::Node);
    }

    #[test]
    fn write_off_increment_is_rejected() {
        let err = co2_setpoint().write("CO2Setpoint", 925.0).unwrap_err();
        assert!(matches!(err, ParamError::NotOnStep { .. }));
    }

    #[test]
    fn write_out_of_range_is_rejected() {
        let err = co2_setpoint().write("CO2Setpoint", 2050.0).unwrap_err();
        assert!(matches!(err, ParamError::OutOfRange { .. }));
        assert_eq!(
            co2_setpoint().write("CO2Setpoint", f64::NAN),
            Err(ParamError::NotFinite)
        );
    }

    #[test]
    fn comfort_temperature_is_decoded_and_encoded() {
        let param = ConfigParameter::from_device(COMFORT_TEMPERATURE, 218.0, 108.0, 308.0, 1.0);
        assert!((param.value - 21.0).abs() < 1e-9);
        assert!((param.min - 10.0).abs() < 1e-9);
        assert!((param.max - 30.0).abs() < 1e-9);
        assert!((param.step - 0.1).abs() < 1e-9);

        let write = param.write(COMFORT_TEMPERATURE, 20.0).unwrap();
        assert_eq!(write.raw(), 208);
        assert_eq!(write.namespace(), Namespace::Box);

        let write = param.write(COMFORT_TEMPERATURE, 22.5).unwrap();
        assert_eq!(write.raw(), 233);
    }

    #[test]
    fn comfort_temperature_without_bounds() {
        let param = ConfigParameter::from_device(COMFORT_TEMPERATURE, 218.0, 0.0, 0.0, 1.0);
        assert!((param.value - 21.0).abs() < 1e-9);
        assert!(!param.has_range());

        let write = param.write(COMFORT_TEMPERATURE, 20.0).unwrap();
        assert_eq!(write.raw(), 208);
    }

    #[test]
    fn missing_bounds_skip_range_check() {
        let param = ConfigParameter::from_device("FilterReset", 0.0, 0.0, 0.0, 1.0);
        assert_eq!(param.write("FilterReset", 1.0).map(|w| w.raw()), Ok(1));
        assert!(matches!(
            param.write("FilterReset", 0.5),
            Err(ParamError::NotOnStep { .. })
        ));
    }
}
