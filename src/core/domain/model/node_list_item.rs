//! Node list items from the `/nodes` endpoint, used for node discovery.

use serde::{Deserialize, Serialize};

/// A node as listed by `/api2/json/nodes`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeListItem {
    /// The node name (e.g., "pve1").
    pub node: String,
    /// Current node status ("online", "offline", "unknown").
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxcpu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
}

impl NodeListItem {
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

/// Picks the first online node, falling back to the first node listed.
pub(crate) fn select_node(nodes: &[NodeListItem]) -> Option<&NodeListItem> {
    nodes
        .iter()
        .find(|n| n.is_online())
        .or_else(|| nodes.first())
}
