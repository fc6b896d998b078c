//! Cluster-wide views: version, membership, resources, pools and users.
//!
//! These come from endpoints outside `/nodes/{node}` and describe the whole
//! datacenter the inspected node belongs to. Entry types the crate does not
//! know (e.g. `sdn`) are kept as plain strings instead of failing the decode.

use crate::core::domain::value_object::serde_helpers::{lenient_flag, lenient_u64};
use serde::{Deserialize, Serialize};

/// Manager version from `/version` or `/nodes/{node}/version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repoid: Option<String>,
}

/// One entry of `/cluster/status`: the cluster itself or a member node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClusterStatusItem {
    /// `cluster` or `node`.
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub name: String,
    /// Member count (cluster entry only).
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub nodes: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_flag::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub quorate: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_flag::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// One entry of `/cluster/resources`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClusterResource {
    /// e.g. `qemu/100`, `storage/pve/local`, `node/pve`.
    pub id: String,
    /// `qemu`, `lxc`, `storage`, `node`, `pool`, `sdn`, ...
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub vmid: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub mem: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub maxmem: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
}

/// A resource pool from `/pools`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolItem {
    pub poolid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A user from `/access/users`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserItem {
    pub userid: String,
    #[serde(
        default,
        deserialize_with = "lenient_flag::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable: Option<bool>,
    /// Account expiry as a unix timestamp; `0` means never.
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub expire: Option<u64>,
}

impl UserItem {
    /// Users are enabled unless the server says otherwise.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enable != Some(false)
    }
}

/// Datacenter-level view gathered alongside a node inventory.
///
/// Each field is `None` when its endpoint could not be read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClusterOverview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<ClusterStatusItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ClusterResource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pools: Option<Vec<PoolItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserItem>>,
}

impl ClusterOverview {
    /// The `cluster` entry; absent on a standalone node.
    #[must_use]
    pub fn cluster(&self) -> Option<&ClusterStatusItem> {
        self.status
            .iter()
            .flatten()
            .find(|item| item.item_type == "cluster")
    }

    /// Member nodes reported offline.
    pub fn offline_nodes(&self) -> impl Iterator<Item = &ClusterStatusItem> {
        self.status
            .iter()
            .flatten()
            .filter(|item| item.item_type == "node" && item.online == Some(false))
    }

    /// Number of cluster resources of `resource_type` (`qemu`, `lxc`, ...).
    #[must_use]
    pub fn resource_count(&self, resource_type: &str) -> Option<usize> {
        self.resources.as_ref().map(|resources| {
            resources
                .iter()
                .filter(|r| r.resource_type == resource_type)
                .count()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cluster_status_and_resources() {
        let overview = ClusterOverview {
            version: Some(VersionInfo {
                version: Some("8.2.4".to_string()),
                release: Some("8.2".to_string()),
                repoid: None,
            }),
            status: Some(
                serde_json::from_value(json!([
                    {"type": "cluster", "name": "homelab", "nodes": 2, "quorate": 1, "version": 4},
                    {"type": "node", "name": "pve", "online": 1, "ip": "192.168.1.10"},
                    {"type": "node", "name": "pve2", "online": 0}
                ]))
                .unwrap(),
            ),
            resources: Some(
                serde_json::from_value(json!([
                    {"id": "qemu/100", "type": "qemu", "node": "pve", "vmid": 100},
                    {"id": "lxc/101", "type": "lxc", "node": "pve", "vmid": "101"},
                    {"id": "sdn/pve/localnetwork", "type": "sdn", "node": "pve"}
                ]))
                .unwrap(),
            ),
            pools: None,
            users: None,
        };

        let cluster = overview.cluster().unwrap();
        assert_eq!(cluster.name, "homelab");
        assert_eq!(cluster.quorate, Some(true));
        let offline: Vec<&str> = overview.offline_nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(offline, vec!["pve2"]);
        assert_eq!(overview.resource_count("qemu"), Some(1));
        assert_eq!(overview.resource_count("sdn"), Some(1));
        assert_eq!(ClusterOverview::default().resource_count("qemu"), None);
    }

    #[test]
    fn test_users_enabled_by_default() {
        let users: Vec<UserItem> = serde_json::from_value(json!([
            {"userid": "root@pam", "enable": 1, "expire": 0},
            {"userid": "backup@pve", "enable": 0},
            {"userid": "audit@pve"}
        ]))
        .unwrap();
        let enabled: Vec<bool> = users.iter().map(UserItem::is_enabled).collect();
        assert_eq!(enabled, vec![true, false, true]);
    }
}
