//! Capability interface for talking to a DucoBox.

use crate::client::ClientError;
use async_trait::async_trait;
use ducobox_core::{
    BoxState, ConfigWrite, DeviceInfo, EnergyInfo, NodeConfig, NodeId, NodeInfo, OverrideValue,
    VentilationState,
};

/// Everything the poller and entities need from a device.
///
/// [`DucoClient`](crate::DucoClient) is the HTTP implementation for the
/// Communication Print board.
#[async_trait]
pub trait DucoApi: Send + Sync {
    /// Identity of the box.
    async fn get_device_info(&self) -> Result<DeviceInfo, ClientError>;

    /// Live operational state of the box.
    async fn get_box_state(&self) -> Result<BoxState, ClientError>;

    /// Energy and fan telemetry.
    async fn get_energy_info(&self) -> Result<EnergyInfo, ClientError>;

    /// Probe the configured node ID ranges and return every valid node in
    /// ascending ID order. Individual probe failures are skipped.
    async fn scan_nodes(&self) -> Result<Vec<NodeInfo>, ClientError>;

    /// Live info for one node.
    async fn get_node_info(&self, node: NodeId) -> Result<NodeInfo, ClientError>;

    /// Change the operating state of the box.
    async fn set_ventilation_state(&self, state: VentilationState) -> Result<(), ClientError>;

    /// Set or clear a flow override on a node.
    async fn set_override(&self, node: NodeId, value: OverrideValue) -> Result<(), ClientError>;

    /// Box-level configuration.
    async fn get_box_config(&self) -> Result<NodeConfig, ClientError>;

    /// Configuration of a node; node 1 includes box-level parameters.
    async fn get_node_config(&self, node: NodeId) -> Result<NodeConfig, ClientError>;

    /// Write a validated parameter, routed by its namespace.
    async fn set_config(&self, node: NodeId, write: &ConfigWrite) -> Result<(), ClientError>;

    /// States the box accepts through [`set_ventilation_state`](Self::set_ventilation_state).
    fn ventilation_state_options(&self) -> Vec<VentilationState> {
        VentilationState::ALL.to_vec()
    }
}
