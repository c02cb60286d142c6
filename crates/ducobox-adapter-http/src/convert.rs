//! Raw wire bodies → domain records.

use crate::client::ClientError;
use chrono::{DateTime, Utc};
use ducobox_core::units::from_deciselsius;
use ducobox_core::{
    BoxState, ConfigParameter, DeviceInfo, EnergyInfo, Namespace, NodeConfig, NodeId, NodeInfo,
    OverrideValue, RfDiagnostics,
};
use ducobox_proto::{BoxInfoResponse, ConfigSection, NodeInfoResponse};
use serde_json::Value;

/// Build device identity; `devtype` and `serialnb` are required.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] if a required field is missing.
pub fn device_info(raw: NodeInfoResponse) -> Result<DeviceInfo, ClientError> {
    let device_type = raw.devtype.ok_or_else(|| missing("devtype"))?;
    let serial_number = raw.serialnb.ok_or_else(|| missing("serialnb"))?;

    Ok(DeviceInfo {
        device_type,
        serial_number,
        firmware_version: raw.swversion,
        location: raw.location.unwrap_or_default(),
    })
}

fn missing(field: &str) -> ClientError {
    ClientError::Validation(format!("device info is missing {field}"))
}

/// Build the box state from node 1's info.
#[must_use]
pub fn box_state(raw: NodeInfoResponse) -> BoxState {
    let override_value = raw
        .ovrl
        .map_or(OverrideValue::Clear, OverrideValue::from_raw);
    BoxState {
        mode: raw.mode,
        state_code: raw.state,
        target_flow: raw.trgt,
        humidity: humidity(raw.rh),
        countdown_secs: raw.cntdwn,
        ends_at: raw.endtime.and_then(timestamp),
        override_value,
    }
}

/// A humidity of 0 or less means the sensor is absent.
fn humidity(rh: Option<f64>) -> Option<f64> {
    rh.filter(|rh| *rh > 0.0)
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

/// Free-form diagnostic fields arrive as strings or numbers.
fn reported(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Build energy telemetry, converting deciselsius temperatures.
#[must_use]
pub fn energy_info(raw: BoxInfoResponse) -> EnergyInfo {
    let info = raw.energy_info;
    let fan = raw.energy_fan;
    EnergyInfo {
        temp_outdoor: info.temp_oda.map(from_deciselsius),
        temp_supply: info.temp_sup.map(from_deciselsius),
        temp_extract: info.temp_eta.map(from_deciselsius),
        temp_exhaust: info.temp_eha.map(from_deciselsius),
        bypass_percent: info.bypass_status,
        filter_remaining_days: info.filter_remaining_time,
        supply_fan_speed: fan.supply_fan_speed,
        supply_fan_pwm: fan.supply_fan_pwm_percentage,
        exhaust_fan_speed: fan.exhaust_fan_speed,
        exhaust_fan_pwm: fan.exhaust_fan_pwm_percentage,
    }
}

/// Build a node record. Returns `None` unless the body carries both a
/// non-empty `location` and `devtype`.
#[must_use]
pub fn node_info(node_id: NodeId, raw: NodeInfoResponse) -> Option<NodeInfo> {
    let location = raw.location.filter(|s| !s.is_empty())?;
    let device_type = raw.devtype.filter(|s| !s.is_empty())?;

    let rf = RfDiagnostics {
        rssi_to_master: raw.rssi_n2m,
        rssi_to_hop: raw.rssi_n2h,
        hop_via: raw.hop_via,
        error_count: raw.cerr,
    };

    Some(NodeInfo {
        node_id,
        location,
        device_type,
        temperature: raw.temp,
        co2: raw.co2,
        humidity: humidity(raw.rh),
        state_code: raw.state,
        mode: raw.mode,
        firmware_version: raw.swversion,
        serial_number: raw.serialnb,
        override_value: raw.ovrl.map(OverrideValue::from_raw),
        countdown_secs: raw.cntdwn,
        ends_at: raw.endtime.and_then(timestamp),
        error: reported(raw.error),
        network: reported(raw.netw),
        association: reported(raw.asso),
        rf: (!rf.is_empty()).then_some(rf),
    })
}

/// Merge the parameters of `section` that belong to `namespace` into `config`.
pub fn merge_section(config: &mut NodeConfig, section: &ConfigSection, namespace: Namespace) {
    for (name, raw) in section.params() {
        if Namespace::of(&name) != namespace {
            continue;
        }
        let param = ConfigParameter::from_device(&name, raw.val, raw.min, raw.max, raw.inc);
        config.params.insert(name, param);
    }
    if config.location.is_none() {
        config.location = section.location();
    }
}
