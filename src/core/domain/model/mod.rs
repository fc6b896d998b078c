pub mod cluster;
pub mod deletion;
pub mod inventory;
pub mod network_interface;
pub mod node_disk;
pub mod node_list_item;
pub mod node_service;
pub mod node_status;
pub mod proxmox_connection;
pub mod resource;
pub mod session;
pub mod snapshot;
pub mod storage;

pub use cluster::{
    ClusterOverview, ClusterResource, ClusterStatusItem, PoolItem, UserItem, VersionInfo,
};
pub use deletion::{DeletionOutcome, DeletionRequest, RunSummary, SpaceDelta};
pub use inventory::{Inventory, InventoryEntry};
pub use network_interface::NetworkInterface;
pub use node_disk::NodeDisk;
pub use node_list_item::NodeListItem;
pub use node_service::NodeService;
pub use node_status::{CpuInfo, MemoryInfo, NodeStatus};
pub use proxmox_connection::{ProxmoxConnection, RateLimitConfig, TlsPolicy};
pub use resource::{GuestConfig, GuestUtilization, LifecycleState, ResourceHandle, ResourceKind};
pub use session::Session;
pub use snapshot::SnapshotRef;
pub use storage::{StorageCounters, StorageUsage};
