//! Device records in engineering units.

use crate::state::{OverrideValue, VentilationState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node ID on the controller's internal bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u16);

/// The main box is always node 1.
pub const BOX_NODE_ID: NodeId = NodeId(1);

impl NodeId {
    /// Whether this node is the main box.
    #[must_use]
    pub fn is_box(self) -> bool {
        self == BOX_NODE_ID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the main controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device-type code (e.g. `BOX`)
    pub device_type: String,
    /// Serial number
    pub serial_number: String,
    /// Firmware version, if reported
    pub firmware_version: Option<String>,
    /// Location label (may be empty)
    pub location: String,
}

impl DeviceInfo {
    /// Display model name: device type and location, underscores as spaces,
    /// title-cased.
    #[must_use]
    pub fn model(&self) -> String {
        let raw = format!("{} {}", self.device_type, self.location);
        title_case(&raw.trim().replace('_', " "))
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Operational snapshot of the main unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxState {
    /// Mode code as reported (`mode`)
    pub mode: Option<String>,
    /// Raw state code (`state`)
    pub state_code: Option<String>,
    /// Target flow level in percent (`trgt`)
    pub target_flow: Option<u8>,
    /// Relative humidity in percent (`rh`)
    pub humidity: Option<f64>,
    /// Seconds left in a timed state (`cntdwn`)
    pub countdown_secs: Option<u32>,
    /// End of a timed state (`endtime`)
    pub ends_at: Option<DateTime<Utc>>,
    /// Active flow override (`ovrl`)
    pub override_value: OverrideValue,
}

impl BoxState {
    /// Parsed ventilation state, if the code is known.
    #[must_use]
    pub fn state(&self) -> Option<VentilationState> {
        self.state_code
            .as_deref()
            .and_then(VentilationState::from_code)
    }

    /// Human state name; falls back to the raw code for unknown states.
    #[must_use]
    pub fn state_name(&self) -> Option<String> {
        match self.state() {
            Some(state) => Some(state.label().to_string()),
            None => self.state_code.clone(),
        }
    }
}

/// Thermal and fan telemetry from `/boxinfoget`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyInfo {
    /// Outdoor air temperature (°C)
    pub temp_outdoor: Option<f64>,
    /// Supply air temperature (°C)
    pub temp_supply: Option<f64>,
    /// Extract air temperature (°C)
    pub temp_extract: Option<f64>,
    /// Exhaust air temperature (°C)
    pub temp_exhaust: Option<f64>,
    /// Bypass position in percent
    pub bypass_percent: Option<u8>,
    /// Days until the filter should be replaced
    pub filter_remaining_days: Option<u32>,
    /// Supply fan speed (rpm)
    pub supply_fan_speed: Option<u32>,
    /// Supply fan PWM duty in percent
    pub supply_fan_pwm: Option<u8>,
    /// Exhaust fan speed (rpm)
    pub exhaust_fan_speed: Option<u32>,
    /// Exhaust fan PWM duty in percent
    pub exhaust_fan_pwm: Option<u8>,
}

/// Radio diagnostics for a wireless node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfDiagnostics {
    /// Signal strength node → master
    pub rssi_to_master: Option<i32>,
    /// Signal strength node → hop
    pub rssi_to_hop: Option<i32>,
    /// Node the traffic is routed through
    pub hop_via: Option<u16>,
    /// Communication error count
    pub error_count: Option<u32>,
}

impl RfDiagnostics {
    /// Whether no diagnostic field was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rssi_to_master.is_none()
            && self.rssi_to_hop.is_none()
            && self.hop_via.is_none()
            && self.error_count.is_none()
    }
}

/// A discovered sensor or room node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Bus address
    pub node_id: NodeId,
    /// Location label
    pub location: String,
    /// Device-type code (e.g. `UCCO2`, `UCRH`)
    pub device_type: String,
    /// Temperature (°C)
    pub temperature: Option<f64>,
    /// CO2 concentration (ppm)
    pub co2: Option<u32>,
    /// Relative humidity in percent; absent when the node reports 0 or less
    pub humidity: Option<f64>,
    /// Raw state code
    pub state_code: Option<String>,
    /// Mode code
    pub mode: Option<String>,
    /// Firmware version
    pub firmware_version: Option<String>,
    /// Serial number
    pub serial_number: Option<String>,
    /// Active flow override
    pub override_value: Option<OverrideValue>,
    /// Seconds left in a timed state
    pub countdown_secs: Option<u32>,
    /// When the timed state ends
    pub ends_at: Option<DateTime<Utc>>,
    /// Error indicator as reported
    pub error: Option<String>,
    /// Network type (`VLV`, `RF`, ...)
    pub network: Option<String>,
    /// Association as reported
    pub association: Option<String>,
    /// Radio diagnostics, when any were reported
    pub rf: Option<RfDiagnostics>,
}
