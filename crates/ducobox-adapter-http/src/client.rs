//! HTTP client for the Communication Print API.

use crate::api::DucoApi;
use crate::convert;
use crate::discovery::{self, default_node_ranges, NodeRange};
use async_trait::async_trait;
use ducobox_core::params::BOX_CONFIG_MODULE;
use ducobox_core::{
    BoxState, ConfigWrite, DeviceInfo, EnergyInfo, Namespace, NodeConfig, NodeId, NodeInfo,
    OverrideValue, VentilationState, BOX_NODE_ID,
};
use ducobox_proto::{BoxConfigResponse, BoxInfoResponse, ConfigSection, Endpoint, NodeInfoResponse};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// DucoBox client configuration.
#[derive(Debug, Clone)]
pub struct DucoClientConfig {
    /// Base URL of the device (e.g., <http://192.168.1.50>)
    pub base_url: String,
    /// Timeout for standard calls
    pub timeout: Duration,
    /// Timeout for node-discovery probes
    pub probe_timeout: Duration,
    /// Timeout for the detection probe
    pub detect_timeout: Duration,
    /// Node ID ranges probed by [`DucoApi::scan_nodes`]
    pub node_ranges: Vec<NodeRange>,
}

impl Default for DucoClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(2),
            detect_timeout: Duration::from_secs(5),
            node_ranges: default_node_ranges(),
        }
    }
}

impl DucoClientConfig {
    /// Configuration for a device reachable at `host` over plain HTTP.
    #[must_use]
    pub fn for_host(host: &str) -> Self {
        Self {
            base_url: format!("http://{host}"),
            ..Self::default()
        }
    }
}

/// HTTP client for a single DucoBox.
pub struct DucoClient {
    client: Client,
    base_url: Url,
    config: DucoClientConfig,
}

impl DucoClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// created.
    pub fn new(config: DucoClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::Init(format!("invalid base URL {}: {e}", config.base_url))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Create a client after confirming a Communication Print answers at the
    /// configured address.
    ///
    /// The box must answer `/nodeinfoget?node=1` with both `devtype` and
    /// `state`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Communication`] if the device cannot be reached
    /// and [`ClientError::Validation`] if it is not a Communication Print.
    pub async fn detect(config: DucoClientConfig) -> Result<Self, ClientError> {
        let client = Self::new(config)?;
        let endpoint = Endpoint::NodeInfo { node: BOX_NODE_ID };
        let info: NodeInfoResponse = client
            .get_json(&endpoint, client.config.detect_timeout)
            .await?;

        if info.devtype.is_none() || info.state.is_none() {
            return Err(ClientError::Validation(format!(
                "no Communication Print (0000-4251) at {}",
                client.base_url
            )));
        }

        tracing::info!(
            base_url = %client.base_url,
            devtype = info.devtype.as_deref().unwrap_or_default(),
            "Detected DucoBox Communication Print"
        );
        Ok(client)
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &DucoClientConfig {
        &self.config
    }

    async fn send(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Response, ClientError> {
        let url = self
            .base_url
            .join(endpoint.path())
            .map_err(|e| ClientError::Init(e.to_string()))?;

        tracing::debug!(
            url = %url,
            query = ?endpoint.query(),
            write = endpoint.is_write(),
            "GET"
        );

        let response = self
            .client
            .get(url)
            .query(&endpoint.query())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Communication(format!(
                        "{} timed out after {timeout:?}",
                        endpoint.path()
                    ))
                } else {
                    ClientError::Communication(format!("{}: {e}", endpoint.path()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Communication(format!(
                "{} returned HTTP {}",
                endpoint.path(),
                status.as_u16()
            )));
        }

        Ok(response)
    }

    /// Fetch and decode a JSON body. Malformed JSON is a communication
    /// failure; well-formed JSON of the wrong shape is a validation failure.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<T, ClientError> {
        let body: Value = self
            .send(endpoint, timeout)
            .await?
            .json()
            .await
            .map_err(|e| {
                ClientError::Communication(format!("{}: malformed JSON: {e}", endpoint.path()))
            })?;

        serde_json::from_value(body).map_err(|e| {
            ClientError::Validation(format!("{}: unexpected body: {e}", endpoint.path()))
        })
    }

    async fn write(&self, endpoint: &Endpoint) -> Result<(), ClientError> {
        self.send(endpoint, self.config.timeout).await?;
        Ok(())
    }

    /// Short-timeout info request used by discovery. `Ok(None)` means the
    /// address answered but holds no valid node.
    pub(crate) async fn probe_node(&self, node: NodeId) -> Result<Option<NodeInfo>, ClientError> {
        let raw: NodeInfoResponse = self
            .get_json(&Endpoint::NodeInfo { node }, self.config.probe_timeout)
            .await?;
        Ok(convert::node_info(node, raw))
    }

    async fn fetch_config_section(
        &self,
        endpoint: &Endpoint,
    ) -> Result<ConfigSection, ClientError> {
        self.get_json(endpoint, self.config.timeout).await
    }

    async fn fetch_box_section(&self) -> Result<ConfigSection, ClientError> {
        let modules: BoxConfigResponse = self
            .get_json(&Endpoint::BoxConfigGet, self.config.timeout)
            .await?;
        Ok(modules.module(BOX_CONFIG_MODULE))
    }
}

#[async_trait]
impl DucoApi for DucoClient {
    async fn get_device_info(&self) -> Result<DeviceInfo, ClientError> {
        let endpoint = Endpoint::NodeInfo { node: BOX_NODE_ID };
        let raw: NodeInfoResponse = self.get_json(&endpoint, self.config.timeout).await?;
        convert::device_info(raw)
    }

    async fn get_box_state(&self) -> Result<BoxState, ClientError> {
        let endpoint = Endpoint::NodeInfo { node: BOX_NODE_ID };
        let raw: NodeInfoResponse = self.get_json(&endpoint, self.config.timeout).await?;
        Ok(convert::box_state(raw))
    }

    async fn get_energy_info(&self) -> Result<EnergyInfo, ClientError> {
        let raw: BoxInfoResponse = self
            .get_json(&Endpoint::BoxInfo, self.config.timeout)
            .await?;
        Ok(convert::energy_info(raw))
    }

    async fn scan_nodes(&self) -> Result<Vec<NodeInfo>, ClientError> {
        Ok(discovery::scan(self, &self.config.node_ranges).await)
    }

    async fn get_node_info(&self, node: NodeId) -> Result<NodeInfo, ClientError> {
        let raw: NodeInfoResponse = self
            .get_json(&Endpoint::NodeInfo { node }, self.config.timeout)
            .await?;
        convert::node_info(node, raw).ok_or_else(|| {
            ClientError::Validation(format!("node {node} reported no location or devtype"))
        })
    }

    async fn set_ventilation_state(&self, state: VentilationState) -> Result<(), ClientError> {
        self.write(&Endpoint::SetOperState {
            node: BOX_NODE_ID,
            value: state.code(),
        })
        .await?;
        tracing::debug!(state = state.code(), "Set ventilation state");
        Ok(())
    }

    async fn set_override(&self, node: NodeId, value: OverrideValue) -> Result<(), ClientError> {
        self.write(&Endpoint::SetOverride {
            node,
            value: value.raw(),
        })
        .await?;
        tracing::debug!(%node, value = value.raw(), "Set node override");
        Ok(())
    }

    async fn get_box_config(&self) -> Result<NodeConfig, ClientError> {
        let section = self.fetch_box_section().await?;
        let mut config = NodeConfig {
            node_id: Some(BOX_NODE_ID),
            ..NodeConfig::default()
        };
        convert::merge_section(&mut config, &section, Namespace::Box);
        Ok(config)
    }

    async fn get_node_config(&self, node: NodeId) -> Result<NodeConfig, ClientError> {
        let section = self
            .fetch_config_section(&Endpoint::NodeConfigGet { node })
            .await?;
        let mut config = NodeConfig {
            node_id: Some(node),
            ..NodeConfig::default()
        };
        convert::merge_section(&mut config, &section, Namespace::Node);

        if node.is_box() {
            let box_section = self.fetch_box_section().await?;
            convert::merge_section(&mut config, &box_section, Namespace::Box);
        }

        Ok(config)
    }

    async fn set_config(&self, node: NodeId, write: &ConfigWrite) -> Result<(), ClientError> {
        let endpoint = match write.namespace() {
            Namespace::Box => {
                if !node.is_box() {
                    return Err(ClientError::Validation(format!(
                        "{} is a box-level parameter and cannot be written to node {node}",
                        write.name()
                    )));
                }
                Endpoint::BoxConfigSet {
                    module: BOX_CONFIG_MODULE,
                    para: write.name().to_string(),
                    value: write.raw(),
                }
            }
            Namespace::Node => Endpoint::NodeConfigSet {
                node,
                para: write.name().to_string(),
                value: write.raw(),
            },
        };

        self.write(&endpoint).await?;
        tracing::debug!(%node, para = write.name(), value = write.raw(), "Set config parameter");
        Ok(())
    }
}

/// Errors that can occur with the DucoBox client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),
    /// Transport failure, timeout, non-success status, or malformed JSON
    #[error("communication error: {0}")]
    Communication(String),
    /// Well-formed response missing required data, or a rejected request
    #[error("validation error: {0}")]
    Validation(String),
}
