//! Read-only sensor readings derived from a snapshot.

use ducobox_core::{NodeInfo, Snapshot};
use std::fmt;

/// A single measured value.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Stable key, e.g. `energy.temp_outdoor` or `node.5.co2`
    pub key: String,
    /// Value in `unit`
    pub value: f64,
    /// Unit symbol
    pub unit: &'static str,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} {}", self.key, self.value, self.unit)
    }
}

struct Readings(Vec<Reading>);

impl Readings {
    fn push<V: Into<f64>>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
        unit: &'static str,
    ) {
        if let Some(value) = value {
            self.0.push(Reading {
                key: key.into(),
                value: value.into(),
                unit,
            });
        }
    }
}

/// Every reading present in `snapshot`. Absent values produce no reading.
#[must_use]
pub fn readings(snapshot: &Snapshot) -> Vec<Reading> {
    let mut out = Readings(Vec::new());

    if let Some(box_state) = &snapshot.box_state {
        out.push("box.humidity", box_state.humidity, "%");
        out.push("box.target_flow", box_state.target_flow, "%");
        out.push("box.countdown", box_state.countdown_secs, "s");
    }

    if let Some(energy) = &snapshot.energy {
        out.push("energy.temp_outdoor", energy.temp_outdoor, "°C");
        out.push("energy.temp_supply", energy.temp_supply, "°C");
        out.push("energy.temp_extract", energy.temp_extract, "°C");
        out.push("energy.temp_exhaust", energy.temp_exhaust, "°C");
        out.push("energy.bypass", energy.bypass_percent, "%");
        out.push("energy.filter_remaining", energy.filter_remaining_days, "d");
        out.push("energy.supply_fan_speed", energy.supply_fan_speed, "rpm");
        out.push("energy.supply_fan_pwm", energy.supply_fan_pwm, "%");
        out.push("energy.exhaust_fan_speed", energy.exhaust_fan_speed, "rpm");
        out.push("energy.exhaust_fan_pwm", energy.exhaust_fan_pwm, "%");
    }

    for node in snapshot.nodes.iter().flat_map(|nodes| nodes.iter()) {
        node_readings(&mut out, node);
    }

    out.0
}

fn node_readings(out: &mut Readings, node: &NodeInfo) {
    let prefix = format!("node.{}", node.node_id);
    out.push(format!("{prefix}.temperature"), node.temperature, "°C");
    out.push(format!("{prefix}.co2"), node.co2, "ppm");
    out.push(format!("{prefix}.humidity"), node.humidity, "%");
    if let Some(rf) = &node.rf {
        out.push(format!("{prefix}.rssi_to_master"), rf.rssi_to_master, "dBm");
        out.push(format!("{prefix}.rssi_to_hop"), rf.rssi_to_hop, "dBm");
    }
}
