//! Scripted in-memory [`DucoApi`] for tests of downstream crates.
//!
//! Every call is recorded. Reads return whatever was last scripted; writes
//! succeed unless [`StubApi::fail_writes`] is set and, while
//! [`StubApi::honor_writes`] is on, update the scripted box state the way the
//! device would.

use crate::api::DucoApi;
use crate::client::ClientError;
use async_trait::async_trait;
use ducobox_core::{
    BoxState, ConfigWrite, DeviceInfo, EnergyInfo, NodeConfig, NodeId, NodeInfo, OverrideValue,
    VentilationState, BOX_NODE_ID,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A call received by the stub.
#[derive(Debug, Clone, PartialEq)]
pub enum StubCall {
    /// `get_device_info`
    DeviceInfo,
    /// `get_box_state`
    BoxState,
    /// `get_energy_info`
    EnergyInfo,
    /// `scan_nodes`
    ScanNodes,
    /// `get_node_info`
    NodeInfo(NodeId),
    /// `set_ventilation_state`
    SetState(VentilationState),
    /// `set_override`
    SetOverride(NodeId, OverrideValue),
    /// `get_box_config`
    BoxConfig,
    /// `get_node_config`
    NodeConfig(NodeId),
    /// `set_config` with the parameter name and raw value
    SetConfig(NodeId, String, i64),
}

struct StubData {
    device: Result<DeviceInfo, ClientError>,
    box_state: Result<BoxState, ClientError>,
    energy: Result<EnergyInfo, ClientError>,
    nodes: Result<Vec<NodeInfo>, ClientError>,
    configs: BTreeMap<NodeId, NodeConfig>,
    write_error: Option<ClientError>,
    honor_writes: bool,
    calls: Vec<StubCall>,
}

/// In-memory device double.
pub struct StubApi {
    data: Mutex<StubData>,
}

impl Default for StubApi {
    fn default() -> Self {
        Self::new()
    }
}

impl StubApi {
    /// A stub answering with sample data for a box in `AUTO`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Mutex::new(StubData {
                device: Ok(Self::sample_device()),
                box_state: Ok(Self::sample_box_state()),
                energy: Ok(Self::sample_energy()),
                nodes: Ok(Vec::new()),
                configs: BTreeMap::new(),
                write_error: None,
                honor_writes: true,
                calls: Vec::new(),
            }),
        }
    }

    /// Sample device identity.
    #[must_use]
    pub fn sample_device() -> DeviceInfo {
        DeviceInfo {
            device_type: "BOX".to_string(),
            serial_number: "RS2315001234".to_string(),
            firmware_version: Some("16056".to_string()),
            location: "ENERGY_PREMIUM".to_string(),
        }
    }

    /// Sample box state in `AUTO` without override.
    #[must_use]
    pub fn sample_box_state() -> BoxState {
        BoxState {
            mode: Some("AUTO".to_string()),
            state_code: Some(VentilationState::Auto.code().to_string()),
            target_flow: Some(25),
            humidity: Some(52.0),
            countdown_secs: Some(0),
            ends_at: None,
            override_value: OverrideValue::Clear,
        }
    }

    /// Sample energy telemetry.
    #[must_use]
    pub fn sample_energy() -> EnergyInfo {
        EnergyInfo {
            temp_outdoor: Some(8.5),
            temp_supply: Some(19.2),
            temp_extract: Some(21.5),
            temp_exhaust: Some(10.1),
            bypass_percent: Some(0),
            filter_remaining_days: Some(120),
            supply_fan_speed: Some(1450),
            supply_fan_pwm: Some(30),
            exhaust_fan_speed: Some(1380),
            exhaust_fan_pwm: Some(29),
        }
    }

    /// Sample room sensor.
    #[must_use]
    pub fn sample_node(id: u16) -> NodeInfo {
        NodeInfo {
            node_id: NodeId(id),
            location: format!("Room {id}"),
            device_type: "UCCO2".to_string(),
            temperature: Some(21.0),
            co2: Some(650),
            humidity: None,
            state_code: Some("AUTO".to_string()),
            mode: Some("AUTO".to_string()),
            firmware_version: None,
            serial_number: None,
            override_value: None,
            countdown_secs: None,
            ends_at: None,
            error: None,
            network: None,
            association: None,
            rf: None,
        }
    }

    fn data(&self) -> MutexGuard<'_, StubData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: StubCall) {
        self.data().calls.push(call);
    }

    /// Script the device identity.
    pub fn set_device(&self, result: Result<DeviceInfo, ClientError>) {
        self.data().device = result;
    }

    /// Script the box state.
    pub fn set_box_state(&self, result: Result<BoxState, ClientError>) {
        self.data().box_state = result;
    }

    /// Script energy telemetry.
    pub fn set_energy(&self, result: Result<EnergyInfo, ClientError>) {
        self.data().energy = result;
    }

    /// Script the node scan.
    pub fn set_nodes(&self, result: Result<Vec<NodeInfo>, ClientError>) {
        self.data().nodes = result;
    }

    /// Script a node's configuration.
    pub fn set_config(&self, node: NodeId, config: NodeConfig) {
        self.data().configs.insert(node, config);
    }

    /// Make every write fail with `error`, or succeed again with `None`.
    pub fn fail_writes(&self, error: Option<ClientError>) {
        self.data().write_error = error;
    }

    /// Whether successful writes update the scripted box state.
    pub fn honor_writes(&self, honor: bool) {
        self.data().honor_writes = honor;
    }

    /// Every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<StubCall> {
        self.data().calls.clone()
    }

    /// Number of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&StubCall) -> bool) -> usize {
        self.data().calls.iter().filter(|c| pred(c)).count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.data().calls.clear();
    }

    fn check_write(&self) -> Result<(), ClientError> {
        match &self.data().write_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DucoApi for StubApi {
    async fn get_device_info(&self) -> Result<DeviceInfo, ClientError> {
        self.record(StubCall::DeviceInfo);
        self.data().device.clone()
    }

    async fn get_box_state(&self) -> Result<BoxState, ClientError> {
        self.record(StubCall::BoxState);
        self.data().box_state.clone()
    }

    async fn get_energy_info(&self) -> Result<EnergyInfo, ClientError> {
        self.record(StubCall::EnergyInfo);
        self.data().energy.clone()
    }

    async fn scan_nodes(&self) -> Result<Vec<NodeInfo>, ClientError> {
        self.record(StubCall::ScanNodes);
        self.data().nodes.clone()
    }

    async fn get_node_info(&self, node: NodeId) -> Result<NodeInfo, ClientError> {
        self.record(StubCall::NodeInfo(node));
        let nodes = self.data().nodes.clone()?;
        nodes
            .into_iter()
            .find(|n| n.node_id == node)
            .ok_or_else(|| {
                ClientError::Validation(format!("node {node} reported no location or devtype"))
            })
    }

    async fn set_ventilation_state(&self, state: VentilationState) -> Result<(), ClientError> {
        self.record(StubCall::SetState(state));
        self.check_write()?;
        let mut data = self.data();
        if data.honor_writes {
            if let Ok(box_state) = data.box_state.as_mut() {
                box_state.state_code = Some(state.code().to_string());
                box_state.override_value = OverrideValue::Clear;
            }
        }
        Ok(())
    }

    async fn set_override(&self, node: NodeId, value: OverrideValue) -> Result<(), ClientError> {
        self.record(StubCall::SetOverride(node, value));
        self.check_write()?;
        let mut data = self.data();
        if data.honor_writes && node.is_box() {
            if let Ok(box_state) = data.box_state.as_mut() {
                box_state.override_value = value;
            }
        }
        Ok(())
    }

    async fn get_box_config(&self) -> Result<NodeConfig, ClientError> {
        self.record(StubCall::BoxConfig);
        let data = self.data();
        Ok(data.configs.get(&BOX_NODE_ID).cloned().unwrap_or_default())
    }

    async fn get_node_config(&self, node: NodeId) -> Result<NodeConfig, ClientError> {
        self.record(StubCall::NodeConfig(node));
        Ok(self.data().configs.get(&node).cloned().unwrap_or_default())
    }

    async fn set_config(&self, node: NodeId, write: &ConfigWrite) -> Result<(), ClientError> {
        let call = StubCall::SetConfig(node, write.name().to_string(), write.raw());
        self.record(call);
        self.check_write()
    }
}
