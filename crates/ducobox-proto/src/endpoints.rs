//! Endpoint paths and query strings.

use ducobox_core::NodeId;

/// One request against the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Live info for a node (node 1 is the box)
    NodeInfo {
        /// Node to query
        node: NodeId,
    },
    /// Energy telemetry
    BoxInfo,
    /// Change the operating state of a node
    SetOperState {
        /// Target node
        node: NodeId,
        /// State code (`AUTO`, `MAN1`, ...)
        value: &'static str,
    },
    /// Set (0..=100) or clear (255) a flow override
    SetOverride {
        /// Target node
        node: NodeId,
        /// Raw override value
        value: u8,
    },
    /// Read box-level configuration
    BoxConfigGet,
    /// Write a box-level parameter
    BoxConfigSet {
        /// Module qualifier (`Energy`)
        module: &'static str,
        /// Parameter name
        para: String,
        /// Raw value
        value: i64,
    },
    /// Read node-level configuration
    NodeConfigGet {
        /// Node to query
        node: NodeId,
    },
    /// Write a node-level parameter
    NodeConfigSet {
        /// Target node
        node: NodeId,
        /// Parameter name
        para: String,
        /// Raw value
        value: i64,
    },
}

impl Endpoint {
    /// Request path.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::NodeInfo { .. } => "/nodeinfoget",
            Self::BoxInfo => "/boxinfoget",
            Self::SetOperState { .. } => "/nodesetoperstate",
            Self::SetOverride { .. } => "/nodesetoverrule",
            Self::BoxConfigGet => "/boxconfigget",
            Self::BoxConfigSet { .. } => "/boxconfigset",
            Self::NodeConfigGet { .. } => "/nodeconfigget",
            Self::NodeConfigSet { .. } => "/nodeconfigset",
        }
    }

    /// Query parameters in the order the device documentation lists them.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::NodeInfo { node } | Self::NodeConfigGet { node } => {
                vec![("node", node.to_string())]
            }
            Self::BoxInfo | Self::BoxConfigGet => Vec::new(),
            Self::SetOperState { node, value } => {
                vec![("node", node.to_string()), ("value", (*value).to_string())]
            }
            Self::SetOverride { node, value } => {
                vec![("node", node.to_string()), ("value", value.to_string())]
            }
            Self::BoxConfigSet {
                module,
                para,
                value,
            } => vec![
                ("mod", (*module).to_string()),
                ("para", para.clone()),
                ("value", value.to_string()),
            ],
            Self::NodeConfigSet { node, para, value } => vec![
                ("node", node.to_string()),
                ("para", para.clone()),
                ("value", value.to_string()),
            ],
        }
    }

    /// Whether the endpoint changes device state.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::SetOperState { .. }
                | Self::SetOverride { .. }
                | Self::BoxConfigSet { .. }
                | Self::NodeConfigSet { .. }
        )
    }
}
