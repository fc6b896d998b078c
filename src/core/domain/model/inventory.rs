//! Point-in-time inventory of one node.

use super::cluster::{ClusterOverview, VersionInfo};
use super::network_interface::NetworkInterface;
use super::node_disk::NodeDisk;
use super::node_service::NodeService;
use super::node_status::NodeStatus;
use super::resource::{GuestConfig, GuestUtilization, ResourceHandle, ResourceKind};
use super::snapshot::SnapshotRef;
use super::storage::StorageUsage;
use crate::core::domain::value_object::serde_helpers::system_time;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Everything known about a node at `generated_at`.
///
/// Keys of `resources` are inventory ids (`qemu/100`, `lxc/101`,
/// `storage/local-lvm`), so iteration order is stable.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Inventory {
    pub node: String,
    #[serde(with = "system_time")]
    pub generated_at: SystemTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_status: Option<NodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_version: Option<VersionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Vec<NetworkInterface>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disks: Option<Vec<NodeDisk>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<NodeService>>,
    #[serde(default)]
    pub cluster: ClusterOverview,
    pub resources: BTreeMap<String, InventoryEntry>,
    /// Endpoints whose top-level listing failed during this pass.
    #[serde(default)]
    pub unavailable: Vec<String>,
}

/// One resource and whatever detail could be fetched for it.
///
/// `None` means the detail request failed or does not apply to the kind.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InventoryEntry {
    pub handle: ResourceHandle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<GuestConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<Vec<SnapshotRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<StorageUsage>,
    /// Live usage of a guest from its listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization: Option<GuestUtilization>,
    /// Content types a storage pool accepts (`images`, `backup`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<String>>,
}

impl InventoryEntry {
    pub fn new(handle: ResourceHandle) -> Self {
        Self {
            handle,
            config: None,
            snapshots: None,
            usage: None,
            utilization: None,
            content: None,
        }
    }

    /// Whether a storage pool lists `content` among its content types.
    #[must_use]
    pub fn accepts(&self, content: &str) -> bool {
        self.content
            .as_ref()
            .is_some_and(|types| types.iter().any(|t| t == content))
    }
}

impl Inventory {
    pub fn new(node: impl Into<String>, generated_at: SystemTime) -> Self {
        Self {
            node: node.into(),
            generated_at,
            node_status: None,
            node_version: None,
            network: None,
            disks: None,
            services: None,
            cluster: ClusterOverview::default(),
            resources: BTreeMap::new(),
            unavailable: Vec::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&InventoryEntry> {
        self.resources.get(id)
    }

    /// VMs and containers, in id order.
    pub fn guests(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.resources
            .values()
            .filter(|e| e.handle.kind.has_snapshots())
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &InventoryEntry> {
        self.resources.values().filter(move |e| e.handle.kind == kind)
    }

    pub fn storage_pools(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.of_kind(ResourceKind::StoragePool)
    }

    /// Storage pools that accept backups.
    pub fn backup_pools(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.storage_pools().filter(|entry| entry.accepts("backup"))
    }

    /// Every known snapshot across all guests.
    pub fn snapshots(&self) -> impl Iterator<Item = (&ResourceHandle, &SnapshotRef)> {
        self.guests().flat_map(|entry| {
            entry
                .snapshots
                .iter()
                .flatten()
                .map(move |snapshot| (&entry.handle, snapshot))
        })
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::model::resource::LifecycleState;

    fn sample() -> Inventory {
        let mut inventory = Inventory::new("pve", SystemTime::UNIX_EPOCH);
        let vm = ResourceHandle::guest(ResourceKind::Vm, "pve", 100, None, "running");
        let mut entry = InventoryEntry::new(vm);
        entry.snapshots = Some(vec![SnapshotRef {
            owner: "qemu/100".to_string(),
            name: "before-upgrade".to_string(),
            created_at: None,
            description: None,
            parent: None,
        }]);
        inventory.resources.insert(entry.handle.id.clone(), entry);

        let ct = ResourceHandle::guest(ResourceKind::Container, "pve", 101, None, "stopped");
        inventory
            .resources
            .insert(ct.id.clone(), InventoryEntry::new(ct));

        let pool = ResourceHandle::storage_pool("pve", "local", LifecycleState::Running);
        let mut entry = InventoryEntry::new(pool);
        entry.usage = Some(StorageUsage::NotApplicable);
        entry.content = Some(vec!["iso".to_string(), "backup".to_string()]);
        inventory.resources.insert(entry.handle.id.clone(), entry);
        inventory.network = Some(vec![]);
        inventory
    }

    #[test]
    fn test_inventory_views() {
        let inventory = sample();
        assert_eq!(inventory.guests().count(), 2);
        assert_eq!(inventory.storage_pools().count(), 1);
        assert_eq!(inventory.snapshot_count(), 1);
        assert_eq!(inventory.backup_pools().count(), 1);
        assert!(!inventory.get("qemu/100").unwrap().accepts("backup"));
        let (handle, snapshot) = inventory.snapshots().next().unwrap();
        assert_eq!(handle.id, "qemu/100");
        assert_eq!(snapshot.name, "before-upgrade");
    }

    #[test]
    fn test_inventory_json_round_trip() {
        let inventory = sample();
        let json = serde_json::to_string(&inventory).unwrap();
        let parsed: Inventory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, inventory);
    }
}
