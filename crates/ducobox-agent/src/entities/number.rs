//! Writable configuration parameters.

use super::EntityError;
use ducobox_adapter_http::DucoApi;
use ducobox_core::{ConfigParameter, NodeId, ParamError};
use std::sync::Arc;

/// One tunable parameter of one node.
pub struct ConfigNumber<A: ?Sized> {
    api: Arc<A>,
    node: NodeId,
    name: String,
    param: ConfigParameter,
}

impl<A: DucoApi + ?Sized> ConfigNumber<A> {
    /// One entity per parameter of `node`, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns error if the node configuration cannot be read.
    pub async fn load(api: &Arc<A>, node: NodeId) -> Result<Vec<Self>, EntityError> {
        let config = api.get_node_config(node).await?;
        Ok(config
            .params
            .into_iter()
            .map(|(name, param)| Self {
                api: Arc::clone(api),
                node,
                name,
                param,
            })
            .collect())
    }

    /// The entity for a single parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Unknown`] if the node has no such parameter.
    pub async fn find(api: &Arc<A>, node: NodeId, name: &str) -> Result<Self, EntityError> {
        Self::load(api, node)
            .await?
            .into_iter()
            .find(|number| number.name == name)
            .ok_or_else(|| ParamError::Unknown(name.to_string()).into())
    }

    /// Owning node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value, bounds, and increment in engineering units.
    #[must_use]
    pub fn param(&self) -> &ConfigParameter {
        &self.param
    }

    /// Validate and write a new value.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::Param`] without contacting the device if the
    /// value is out of range or off-increment, and [`EntityError::Client`] if
    /// the write fails.
    pub async fn set_value(&mut self, value: f64) -> Result<(), EntityError> {
        let write = self.param.write(&self.name, value)?;
        self.api.set_config(self.node, &write).await?;
        tracing::info!(node_id = %self.node, para = %self.name, value, "Config parameter written");
        self.param.value = value;
        Ok(())
    }
}
