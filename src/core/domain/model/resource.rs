//! Resource handles for guests and storage pools.
//!
//! Handles are rebuilt from the API on every inventory pass and never cached.

use crate::core::domain::value_object::serde_helpers::{lenient_flag, lenient_u64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a managed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A QEMU virtual machine.
    Vm,
    /// An LXC container.
    Container,
    /// A storage pool attached to the node.
    StoragePool,
}

impl ResourceKind {
    /// Path segment used by the API for this kind (`qemu`, `lxc`, `storage`).
    #[must_use]
    pub fn api_segment(self) -> &'static str {
        match self {
            ResourceKind::Vm => "qemu",
            ResourceKind::Container => "lxc",
            ResourceKind::StoragePool => "storage",
        }
    }

    /// Whether resources of this kind own snapshots.
    #[must_use]
    pub fn has_snapshots(self) -> bool {
        matches!(self, ResourceKind::Vm | ResourceKind::Container)
    }

    /// Short operator-facing prefix (`VM`, `CT`, `Storage`).
    #[must_use]
    pub fn short_label(self) -> &'static str {
        match self {
            ResourceKind::Vm => "VM",
            ResourceKind::Container => "CT",
            ResourceKind::StoragePool => "Storage",
        }
    }

    /// Inventory key of a resource, e.g. `qemu/100` or `storage/local-lvm`.
    #[must_use]
    pub fn resource_id(self, key: impl fmt::Display) -> String {
        format!("{}/{}", self.api_segment(), key)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_label())
    }
}

/// Coarse lifecycle state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Running,
    Stopped,
    Unknown,
}

impl LifecycleState {
    /// Maps a guest `status` string from the API.
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status {
            "running" => LifecycleState::Running,
            "stopped" => LifecycleState::Stopped,
            _ => LifecycleState::Unknown,
        }
    }

    /// Maps a storage `active` flag; missing means unknown.
    #[must_use]
    pub fn from_active_flag(active: Option<bool>) -> Self {
        match active {
            Some(true) => LifecycleState::Running,
            Some(false) => LifecycleState::Stopped,
            None => LifecycleState::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Running => "running",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Unknown => "unknown",
        }
    }
}

/// In-memory representation of a VM, container or storage pool.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    /// Inventory key, e.g. `qemu/100`.
    pub id: String,
    /// Node the resource lives on.
    pub node: String,
    /// Guest id; absent for storage pools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmid: Option<u32>,
    pub name: String,
    pub state: LifecycleState,
}

impl ResourceHandle {
    /// Handle for a VM or container. Guests without a name get `VM-<id>` / `CT-<id>`.
    pub fn guest(
        kind: ResourceKind,
        node: &str,
        vmid: u32,
        name: Option<String>,
        status: &str,
    ) -> Self {
        Self {
            kind,
            id: kind.resource_id(vmid),
            node: node.to_string(),
            vmid: Some(vmid),
            name: name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("{}-{vmid}", kind.short_label())),
            state: LifecycleState::from_status(status),
        }
    }

    /// Handle for a storage pool.
    pub fn storage_pool(node: &str, storage: &str, state: LifecycleState) -> Self {
        Self {
            kind: ResourceKind::StoragePool,
            id: ResourceKind::StoragePool.resource_id(storage),
            node: node.to_string(),
            vmid: None,
            name: storage.to_string(),
            state,
        }
    }

    /// Operator-facing label, e.g. `VM 114 (homeassistant)` or `Storage local-lvm`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.vmid {
            Some(vmid) => format!("{} {vmid} ({})", self.kind.short_label(), self.name),
            None => format!("{} {}", self.kind.short_label(), self.name),
        }
    }
}

/// A guest as listed by `/nodes/{node}/qemu` or `/nodes/{node}/lxc`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuestListItem {
    #[serde(deserialize_with = "lenient_vmid")]
    pub vmid: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: String,
    /// Memory in use, bytes (running guests only).
    #[serde(default, deserialize_with = "lenient_u64::deserialize")]
    pub mem: Option<u64>,
    /// Memory allocation, bytes.
    #[serde(default, deserialize_with = "lenient_u64::deserialize")]
    pub maxmem: Option<u64>,
    /// CPU usage ratio over the allocated vCPUs.
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u64::deserialize")]
    pub cpus: Option<u64>,
}

impl GuestListItem {
    /// Live usage against allocation; `None` without a memory allocation.
    #[must_use]
    pub fn utilization(&self) -> Option<GuestUtilization> {
        let maxmem = self.maxmem.filter(|m| *m > 0)?;
        Some(GuestUtilization {
            mem: self.mem.unwrap_or(0),
            maxmem,
            cpu: self.cpu,
            cpus: self.cpus,
        })
    }
}

/// Live usage of a guest as reported by its node listing.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GuestUtilization {
    pub mem: u64,
    pub maxmem: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<u64>,
}

fn lenient_vmid<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient_u64::deserialize(deserializer)?
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| serde::de::Error::custom("vmid must be a positive integer"))
}

/// Guest configuration from `/nodes/{node}/{qemu|lxc}/{vmid}/config`.
///
/// Only the fields the reports use are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GuestConfig {
    /// Cores per socket.
    #[serde(default, deserialize_with = "lenient_u64::deserialize")]
    pub cores: Option<u64>,
    /// CPU sockets (VMs only).
    #[serde(default, deserialize_with = "lenient_u64::deserialize")]
    pub sockets: Option<u64>,
    /// Memory in MiB.
    #[serde(default, deserialize_with = "lenient_u64::deserialize")]
    pub memory: Option<u64>,
    /// Guest OS type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ostype: Option<String>,
    /// Start at boot.
    #[serde(default, deserialize_with = "lenient_flag::deserialize")]
    pub onboot: Option<bool>,
    /// Container host name (LXC only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GuestConfig {
    /// Total allocated vCPUs; sockets default to one.
    #[must_use]
    pub fn vcpus(&self) -> Option<u64> {
        self.cores.map(|cores| cores * self.sockets.unwrap_or(1))
    }
}
