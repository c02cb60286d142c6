//! Bounded node discovery.
//!
//! The Communication Print has no "list nodes" call, so nodes are found by
//! probing candidate IDs one by one with a short timeout. Room sensors sit in
//! a small low range; box-mounted sensors (UCRH and friends) further up.
//! Absent IDs answer with an error, an empty body, or not at all; all of
//! those are skipped without failing the scan.

use crate::client::DucoClient;
use ducobox_core::{NodeId, NodeInfo};
use std::ops::RangeInclusive;

/// An inclusive range of node IDs to probe.
pub type NodeRange = RangeInclusive<u16>;

/// Room sensors (`2..=10`) and box sensors (`50..=100`).
#[must_use]
pub fn default_node_ranges() -> Vec<NodeRange> {
    vec![2..=10, 50..=100]
}

/// Candidate IDs in ascending order, without duplicates.
#[must_use]
pub fn candidates(ranges: &[NodeRange]) -> Vec<NodeId> {
    let mut ids: Vec<u16> = ranges.iter().flat_map(Clone::clone).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.into_iter().map(NodeId).collect()
}

/// Probe every candidate ID and keep the valid nodes.
pub(crate) async fn scan(client: &DucoClient, ranges: &[NodeRange]) -> Vec<NodeInfo> {
    let ids = candidates(ranges);
    let mut nodes = Vec::new();

    for node_id in &ids {
        match client.probe_node(*node_id).await {
            Ok(Some(node)) => {
                tracing::debug!(%node_id, devtype = %node.device_type, "Discovered node");
                nodes.push(node);
            }
            Ok(None) => {
                tracing::trace!(%node_id, "No node at address");
            }
            Err(e) => {
                tracing::debug!(%node_id, error = %e, "Node probe failed");
            }
        }
    }

    tracing::debug!(probed = ids.len(), found = nodes.len(), "Node scan complete");
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ranges_cover_room_and_box_sensors() {
        let ids = candidates(&default_node_ranges());
        assert_eq!(ids.len(), 9 + 51);
        assert_eq!(ids.first(), Some(&NodeId(2)));
        assert_eq!(ids.last(), Some(&NodeId(100)));
        assert!(!ids.contains(&NodeId(1)));
    }

    #[test]
    fn candidates_are_sorted_and_unique() {
        let ids = candidates(&[8..=12, 2..=4, 10..=11]);
        let raw: Vec<u16> = ids.into_iter().map(|id| id.0).collect();
        assert_eq!(raw, vec![2, 3, 4, 8, 9, 10, 11, 12]);
    }
}
