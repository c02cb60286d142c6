//! Raw response bodies as the device sends them.
//!
//! Every field is optional: absent nodes, older firmware, and sensors without
//! a given capability all simply omit keys. Required-field checks belong to
//! the client, which knows which call it made.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Body of `/nodeinfoget?node=<id>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfoResponse {
    /// Device-type code
    pub devtype: Option<String>,
    /// State code (`AUTO`, `MAN1`, ...)
    pub state: Option<String>,
    /// Mode code
    pub mode: Option<String>,
    /// Serial number
    pub serialnb: Option<String>,
    /// Firmware version
    pub swversion: Option<String>,
    /// Location label
    pub location: Option<String>,
    /// Temperature (°C)
    pub temp: Option<f64>,
    /// CO2 (ppm)
    pub co2: Option<u32>,
    /// Relative humidity (%)
    pub rh: Option<f64>,
    /// Target flow level (%)
    pub trgt: Option<u8>,
    /// Countdown (s)
    pub cntdwn: Option<u32>,
    /// End of timed state (UNIX seconds)
    pub endtime: Option<i64>,
    /// Override (0..=100, 255 = none)
    pub ovrl: Option<u8>,
    /// RSSI node → master
    pub rssi_n2m: Option<i32>,
    /// RSSI node → hop
    pub rssi_n2h: Option<i32>,
    /// Hop node
    pub hop_via: Option<u16>,
    /// Communication error count
    pub cerr: Option<u32>,
    /// Error indicator; firmware sends either a code or a number
    pub error: Option<Value>,
    /// Network type
    pub netw: Option<Value>,
    /// Association
    pub asso: Option<Value>,
}

/// `EnergyInfo` section of `/boxinfoget`. Temperatures are deciselsius.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyInfoSection {
    /// Outdoor air
    #[serde(rename = "TempODA")]
    pub temp_oda: Option<i32>,
    /// Supply air
    #[serde(rename = "TempSUP")]
    pub temp_sup: Option<i32>,
    /// Extract air
    #[serde(rename = "TempETA")]
    pub temp_eta: Option<i32>,
    /// Exhaust air
    #[serde(rename = "TempEHA")]
    pub temp_eha: Option<i32>,
    /// Bypass position (%)
    #[serde(rename = "BypassStatus")]
    pub bypass_status: Option<u8>,
    /// Filter lifetime left (days)
    #[serde(rename = "FilterRemainingTime")]
    pub filter_remaining_time: Option<u32>,
}

/// `EnergyFan` section of `/boxinfoget`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnergyFanSection {
    /// Supply fan rpm
    pub supply_fan_speed: Option<u32>,
    /// Supply fan duty (%)
    pub supply_fan_pwm_percentage: Option<u8>,
    /// Exhaust fan rpm
    pub exhaust_fan_speed: Option<u32>,
    /// Exhaust fan duty (%)
    pub exhaust_fan_pwm_percentage: Option<u8>,
}

/// Body of `/boxinfoget`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxInfoResponse {
    /// Temperatures, bypass, filter
    #[serde(rename = "EnergyInfo", default)]
    pub energy_info: EnergyInfoSection,
    /// Fan telemetry
    #[serde(rename = "EnergyFan", default)]
    pub energy_fan: EnergyFanSection,
}

/// A parameter object (`{"Val":900,"Min":400,"Max":2000,"Inc":50}`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawParam {
    /// Current value
    #[serde(rename = "Val", default)]
    pub val: f64,
    /// Lower bound
    #[serde(rename = "Min", default)]
    pub min: f64,
    /// Upper bound
    #[serde(rename = "Max", default)]
    pub max: f64,
    /// Increment
    #[serde(rename = "Inc", default = "default_inc")]
    pub inc: f64,
}

fn default_inc() -> f64 {
    1.0
}

/// One configuration object: `/nodeconfigget` or a module of `/boxconfigget`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSection(pub Map<String, Value>);

impl ConfigSection {
    /// Location label, reported either as a string or as `{"Val": "..."}`.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self.0.get("Location")? {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj
                .get("Val")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }

    /// Every entry that parses as a numeric parameter object.
    #[must_use]
    pub fn params(&self) -> BTreeMap<String, RawParam> {
        self.0
            .iter()
            .filter_map(|(name, value)| {
                let obj = value.as_object()?;
                if !obj.get("Val").is_some_and(Value::is_number) {
                    return None;
                }
                let param = serde_json::from_value::<RawParam>(value.clone()).ok()?;
                Some((name.clone(), param))
            })
            .collect()
    }
}

/// Body of `/boxconfigget`: module name → section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxConfigResponse(pub Map<String, Value>);

impl BoxConfigResponse {
    /// The section of a module (`Energy`, ...); empty when absent or not an object.
    #[must_use]
    pub fn module(&self, name: &str) -> ConfigSection {
        match self.0.get(name) {
            Some(Value::Object(obj)) => ConfigSection(obj.clone()),
            _ => ConfigSection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_info_partial_body() {
        let body = json!({
            "devtype": "UCCO2", "location": "Bedroom", "co2": 640, "extra": true,
            "netw": "VLV", "asso": 1
        });
        let info: NodeInfoResponse = serde_json::from_value(body).unwrap();
        assert_eq!(info.devtype.as_deref(), Some("UCCO2"));
        assert_eq!(info.co2, Some(640));
        assert_eq!(info.netw, Some(json!("VLV")));
        assert_eq!(info.asso, Some(json!(1)));
        assert!(info.serialnb.is_none());
        assert!(info.error.is_none());
    }

    #[test]
    fn box_info_sections() {
        let body = json!({
            "EnergyInfo": {
                "TempODA": 85, "TempSUP": 192, "BypassStatus": 0, "FilterRemainingTime": 120
            },
            "EnergyFan": {"SupplyFanSpeed": 1450, "ExhaustFanPwmPercentage": 31}
        });
        let info: BoxInfoResponse = serde_json::from_value(body).unwrap();
        assert_eq!(info.energy_info.temp_oda, Some(85));
        assert_eq!(info.energy_info.temp_eha, None);
        assert_eq!(info.energy_fan.supply_fan_speed, Some(1450));
        assert_eq!(info.energy_fan.exhaust_fan_pwm_percentage, Some(31));

        let empty: BoxInfoResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, BoxInfoResponse::default());
    }

    #[test]
    fn config_section_params_and_location() {
        let section: ConfigSection = serde_json::from_value(json!({
            "CO2Setpoint": {"Val": 900, "Min": 400, "Max": 2000, "Inc": 50},
            "ManualTimeout": {"Val": 15},
            "Location": "Living",
            "Broken": {"Min": 1}
        }))
        .unwrap();

        let params = section.params();
        assert_eq!(params.len(), 2);
        assert!((params["CO2Setpoint"].inc - 50.0).abs() < f64::EPSILON);
        let timeout = params["ManualTimeout"];
        assert!(timeout.min.abs() < f64::EPSILON);
        assert!(timeout.max.abs() < f64::EPSILON);
        assert!((timeout.inc - 1.0).abs() < f64::EPSILON);
        assert_eq!(section.location().as_deref(), Some("Living"));
    }

    #[test]
    fn box_config_module_lookup() {
        let body: BoxConfigResponse = serde_json::from_value(json!({
            "General": {"Lan": {"Val": 1}},
            "Energy": {"BypassMode": {"Val": 0, "Min": 0, "Max": 2, "Inc": 1}},
            "Version": 3
        }))
        .unwrap();
        assert_eq!(body.module("Energy").params().len(), 1);
        assert!(body.module("Version").params().is_empty());
        assert!(body.module("Missing").params().is_empty());
    }

    #[test]
    fn location_as_object() {
        let section: ConfigSection =
            serde_json::from_value(json!({"Location": {"Val": "Attic"}})).unwrap();
        assert_eq!(section.location().as_deref(), Some("Attic"));
    }
}
