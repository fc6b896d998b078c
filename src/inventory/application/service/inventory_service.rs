use crate::core::{
    domain::{
        error::{ApiError, ApiResult, ProxmoxError, ProxmoxResult, ValidationError},
        model::{
            GuestConfig, Inventory, InventoryEntry, LifecycleState, NodeListItem, ResourceHandle,
            ResourceKind, StorageUsage,
            node_list_item::select_node,
            resource::GuestListItem,
            snapshot::{SnapshotListItem, snapshots_from_list},
            storage::{StorageCounters, StorageListItem},
        },
    },
    infrastructure::api_client::{ProxmoxApi, decode},
};
use serde_json::Value;
use std::time::SystemTime;
use tracing::{debug, info, instrument, warn};

/// Top-level listings fetched in the first fan-out, in request order.
///
/// Node-scoped listings come first, then the datacenter-wide ones.
#[derive(Debug, Clone, Copy)]
enum Listing {
    Vms,
    Containers,
    Storage,
    NodeStatus,
    NodeVersion,
    Network,
    Disks,
    Services,
    Version,
    ClusterStatus,
    ClusterResources,
    Pools,
    Users,
}

impl Listing {
    const ALL: [Listing; 13] = [
        Listing::Vms,
        Listing::Containers,
        Listing::Storage,
        Listing::NodeStatus,
        Listing::NodeVersion,
        Listing::Network,
        Listing::Disks,
        Listing::Services,
        Listing::Version,
        Listing::ClusterStatus,
        Listing::ClusterResources,
        Listing::Pools,
        Listing::Users,
    ];

    fn path(self, node: &str) -> String {
        match self {
            Listing::Vms => format!("nodes/{node}/qemu"),
            Listing::Containers => format!("nodes/{node}/lxc"),
            Listing::Storage => format!("nodes/{node}/storage"),
            Listing::NodeStatus => format!("nodes/{node}/status"),
            Listing::NodeVersion => format!("nodes/{node}/version"),
            Listing::Network => format!("nodes/{node}/network"),
            Listing::Disks => format!("nodes/{node}/disks/list"),
            Listing::Services => format!("nodes/{node}/services"),
            Listing::Version => "version".to_string(),
            Listing::ClusterStatus => "cluster/status".to_string(),
            Listing::ClusterResources => "cluster/resources".to_string(),
            Listing::Pools => "pools".to_string(),
            Listing::Users => "access/users".to_string(),
        }
    }
}

/// Per-resource fetches of the second fan-out. Each carries the inventory id it belongs to.
#[derive(Debug, Clone)]
enum Detail {
    Config(String),
    Snapshots(String),
    StorageStatus(String),
}

/// Reads one node into an [`Inventory`].
///
/// Reads never fail as a whole: a failed top-level listing is recorded in
/// [`Inventory::unavailable`] and a failed detail fetch leaves that field absent.
pub struct InventoryService<'a> {
    api: &'a dyn ProxmoxApi,
}

impl<'a> InventoryService<'a> {
    pub fn new(api: &'a dyn ProxmoxApi) -> Self {
        Self { api }
    }

    /// Returns the configured node, or the first online node the server lists.
    ///
    /// # Errors
    /// Fails when the node list cannot be read or is empty.
    #[instrument(skip(self))]
    pub async fn discover_node(&self, configured: Option<&str>) -> ProxmoxResult<String> {
        if let Some(node) = configured.filter(|n| !n.is_empty()) {
            return Ok(node.to_string());
        }

        let nodes: Vec<NodeListItem> = self.api.get("nodes").await.and_then(decode)?;
        let node = select_node(&nodes)
            .map(|n| n.node.clone())
            .ok_or_else(|| {
                ProxmoxError::from(ValidationError::ConstraintViolation(
                    "The server reported no nodes".to_string(),
                ))
            })?;
        info!(%node, "discovered node");
        Ok(node)
    }

    /// Builds the inventory of `node` with two concurrent fan-outs: the
    /// node and datacenter listings (guests, storage, status, version,
    /// network, disks, services, cluster status and resources, pools, users),
    /// then config, snapshots and pool status per resource.
    #[instrument(skip(self))]
    pub async fn build(&self, node: &str) -> Inventory {
        let mut inventory = Inventory::new(node, SystemTime::now());

        let paths: Vec<String> = Listing::ALL.iter().map(|l| l.path(node)).collect();
        let listings = self.api.get_many(&paths).await;
        for (listing, (path, result)) in Listing::ALL.into_iter().zip(listings) {
            if let Err(error) = merge_listing(&mut inventory, listing, result) {
                warn!(%path, %error, "listing unavailable");
                inventory.unavailable.push(path);
            }
        }

        let details = detail_requests(&inventory);
        let paths: Vec<String> = details.iter().map(|(path, _)| path.clone()).collect();
        let results = self.api.get_many(&paths).await;
        for ((_, detail), (path, result)) in details.into_iter().zip(results) {
            match result {
                Ok(data) => merge_detail(&mut inventory, detail, data, &path),
                Err(error) => debug!(%path, %error, "detail unavailable"),
            }
        }

        info!(
            resources = inventory.resources.len(),
            snapshots = inventory.snapshot_count(),
            unavailable = inventory.unavailable.len(),
            "inventory built"
        );
        inventory
    }
}

fn merge_listing(
    inventory: &mut Inventory,
    listing: Listing,
    result: ApiResult<Value>,
) -> Result<(), ApiError> {
    let data = result?;
    let node = inventory.node.clone();
    match listing {
        Listing::Vms | Listing::Containers => {
            let kind = match listing {
                Listing::Vms => ResourceKind::Vm,
                _ => ResourceKind::Container,
            };
            let guests: Vec<GuestListItem> = decode(data)?;
            for guest in guests {
                let utilization = guest.utilization();
                let handle =
                    ResourceHandle::guest(kind, &node, guest.vmid, guest.name, &guest.status);
                let mut entry = InventoryEntry::new(handle);
                entry.utilization = utilization;
                inventory.resources.insert(entry.handle.id.clone(), entry);
            }
        }
        Listing::Storage => {
            let pools: Vec<StorageListItem> = decode(data)?;
            for pool in pools {
                let handle = ResourceHandle::storage_pool(
                    &node,
                    &pool.storage,
                    LifecycleState::from_active_flag(pool.active),
                );
                let mut entry = InventoryEntry::new(handle);
                entry.usage = Some(pool.counters.usage());
                entry.content = pool.content.as_deref().map(split_content);
                inventory.resources.insert(entry.handle.id.clone(), entry);
            }
        }
        Listing::NodeStatus => inventory.node_status = Some(decode(data)?),
        Listing::NodeVersion => inventory.node_version = Some(decode(data)?),
        Listing::Network => inventory.network = Some(decode(data)?),
        Listing::Disks => inventory.disks = Some(decode(data)?),
        Listing::Services => inventory.services = Some(decode(data)?),
        Listing::Version => inventory.cluster.version = Some(decode(data)?),
        Listing::ClusterStatus => inventory.cluster.status = Some(decode(data)?),
        Listing::ClusterResources => inventory.cluster.resources = Some(decode(data)?),
        Listing::Pools => inventory.cluster.pools = Some(decode(data)?),
        Listing::Users => inventory.cluster.users = Some(decode(data)?),
    }
    Ok(())
}

// "images,rootdir, backup" -> ["images", "rootdir", "backup"]
fn split_content(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn detail_requests(inventory: &Inventory) -> Vec<(String, Detail)> {
    let mut details = Vec::new();
    for entry in inventory.resources.values() {
        let handle = &entry.handle;
        let base = format!("nodes/{}/{}", handle.node, handle.id);
        match handle.kind {
            ResourceKind::Vm | ResourceKind::Container => {
                details.push((format!("{base}/config"), Detail::Config(handle.id.clone())));
                details.push((format!("{base}/snapshot"), Detail::Snapshots(handle.id.clone())));
            }
            ResourceKind::StoragePool => {
                details.push((
                    format!("{base}/status"),
                    Detail::StorageStatus(handle.id.clone()),
                ));
            }
        }
    }
    details
}

fn merge_detail(inventory: &mut Inventory, detail: Detail, data: Value, path: &str) {
    let (id, outcome) = match detail {
        Detail::Config(id) => {
            let outcome = decode::<GuestConfig>(data).map(|config| {
                if let Some(entry) = inventory.resources.get_mut(&id) {
                    entry.config = Some(config);
                }
            });
            (id, outcome)
        }
        Detail::Snapshots(id) => {
            let outcome = decode::<Vec<SnapshotListItem>>(data).map(|items| {
                if let Some(entry) = inventory.resources.get_mut(&id) {
                    entry.snapshots = Some(snapshots_from_list(&id, items));
                }
            });
            (id, outcome)
        }
        Detail::StorageStatus(id) => {
            let outcome = decode::<StorageCounters>(data).map(|counters| {
                if let Some(entry) = inventory.resources.get_mut(&id) {
                    // Keep the listing's figures when the status endpoint has none.
                    let usage = counters.usage();
                    if usage != StorageUsage::NotApplicable || entry.usage.is_none() {
                        entry.usage = Some(usage);
                    }
                }
            });
            (id, outcome)
        }
    };
    if let Err(error) = outcome {
        debug!(%id, %path, %error, "detail could not be decoded");
    }
}
