//! The merged view published once per poll cycle.

use crate::model::{BoxState, EnergyInfo, NodeId, NodeInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A data category the coordinator caches between fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Discovered nodes and their readings
    Nodes,
    /// Energy telemetry
    Energy,
}

/// How fresh a snapshot is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// Box state is fresh and every due category refreshed
    Available,
    /// Box state is fresh, but at least one due category served stale cache
    Degraded,
    /// No fresh box state this cycle
    Unavailable,
}

/// One consistent view of the device.
///
/// Snapshots are immutable once published. Cached categories are shared by
/// `Arc`: a category that was not refreshed points at the same allocation as
/// in the previous snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Publication counter, starting at 1 for the first cycle
    pub generation: u64,
    /// Freshness of this snapshot
    pub availability: Availability,
    /// Categories that were due but served from cache
    pub stale: Vec<Category>,
    /// Box state; `None` only when unavailable
    pub box_state: Option<BoxState>,
    /// Last good node scan
    pub nodes: Option<Arc<Vec<NodeInfo>>>,
    /// Last good energy reading
    pub energy: Option<Arc<EnergyInfo>>,
    /// Wall-clock time the cycle completed
    pub refreshed_at: DateTime<Utc>,
}

impl Snapshot {
    /// Placeholder published before the first cycle completes.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            generation: 0,
            availability: Availability::Unavailable,
            stale: Vec::new(),
            box_state: None,
            nodes: None,
            energy: None,
            refreshed_at: Utc::now(),
        }
    }

    /// Whether entities should report themselves available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability != Availability::Unavailable
    }

    /// Look up a node by ID.
    #[must_use]
    pub fn node(&self, node_id: NodeId) -> Option<&NodeInfo> {
        self.nodes
            .as_deref()
            .and_then(|nodes| nodes.iter().find(|n| n.node_id == node_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u16) -> NodeInfo {
        NodeInfo {
            node_id: NodeId(id),
            location: format!("Room {id}"),
            device_type: "UCCO2".to_string(),
            temperature: None,
            co2: Some(600),
            humidity: None,
            state_code: None,
            mode: None,
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

    #[test]
    fn pending_is_unavailable() {
        let snapshot = Snapshot::pending();
        assert_eq!(snapshot.generation, 0);
        assert!(!snapshot.is_available());
        assert!(snapshot.box_state.is_none());
    }

    #[test]
    fn node_lookup() {
        let snapshot = Snapshot {
            nodes: Some(Arc::new(vec![node(2), node(5)])),
            ..Snapshot::pending()
        };
        let found = snapshot.node(NodeId(5)).map(|n| n.location.as_str());
        assert_eq!(found, Some("Room 5"));
        assert!(snapshot.node(NodeId(3)).is_none());
    }
}
