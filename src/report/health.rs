//! Usage severities and health findings derived from an inventory.

use super::format::format_bytes;
use crate::core::domain::model::{Inventory, InventoryEntry, LifecycleState, StorageUsage};
use serde::Serialize;
use std::fmt;

/// Classification of a usage percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UsageSeverity {
    Healthy,
    Elevated,
    Warning,
    Critical,
}

impl UsageSeverity {
    /// `>= 95` critical, `>= 90` warning, `>= 80` elevated, healthy below.
    #[must_use]
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 95.0 {
            UsageSeverity::Critical
        } else if percent >= 90.0 {
            UsageSeverity::Warning
        } else if percent >= 80.0 {
            UsageSeverity::Elevated
        } else {
            UsageSeverity::Healthy
        }
    }

    /// Severity of a pool's usage; `None` when the pool does not report capacity.
    #[must_use]
    pub fn of_storage(usage: &StorageUsage) -> Option<Self> {
        usage.percent().map(Self::from_percent)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UsageSeverity::Healthy => "HEALTHY",
            UsageSeverity::Elevated => "ELEVATED",
            UsageSeverity::Warning => "WARNING",
            UsageSeverity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for UsageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingLevel {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for FindingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FindingLevel::Info => "INFO",
            FindingLevel::Warning => "WARNING",
            FindingLevel::Critical => "CRITICAL",
        })
    }
}

/// One observation worth an operator's attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub level: FindingLevel,
    pub message: String,
}

impl Finding {
    fn new(level: FindingLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// One row of the storage report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageRow {
    pub storage: String,
    pub state: LifecycleState,
    pub usage: Option<StorageUsage>,
    /// Absent when the pool does not report capacity.
    pub severity: Option<UsageSeverity>,
}

/// Running guests using less than this share of their memory allocation are underutilized.
pub const UNDERUTILIZED_PERCENT: f64 = 20.0;

const RETENTION_ADVICE: &str = "keep 7 daily, 4 weekly, 12 monthly";

/// How much of an allocation is in use, as a percentage capped at 100.
///
/// An empty allocation scores 0.
#[must_use]
pub fn efficiency_score(allocated: u64, used: u64) -> f64 {
    if allocated == 0 {
        return 0.0;
    }
    (used as f64 / allocated as f64 * 100.0).min(100.0)
}

/// Storage pools with their usage severity, fullest first.
pub fn storage_rows(inventory: &Inventory) -> Vec<StorageRow> {
    let mut rows: Vec<StorageRow> = inventory
        .storage_pools()
        .map(|entry| StorageRow {
            storage: entry.handle.name.clone(),
            state: entry.handle.state,
            usage: entry.usage,
            severity: entry.usage.as_ref().and_then(UsageSeverity::of_storage),
        })
        .collect();
    rows.sort_by(|a, b| {
        let percent = |row: &StorageRow| row.usage.and_then(|u| u.percent()).unwrap_or(-1.0);
        percent(b).total_cmp(&percent(a))
    });
    rows
}

/// Derives findings from an inventory, most severe first.
pub fn assess_health(inventory: &Inventory) -> Vec<Finding> {
    let mut findings = Vec::new();

    for path in &inventory.unavailable {
        findings.push(Finding::new(
            FindingLevel::Warning,
            format!("Endpoint {path} could not be read"),
        ));
    }

    if let Some(percent) = inventory
        .node_status
        .as_ref()
        .and_then(|status| status.memory)
        .and_then(|memory| memory.used_percent())
    {
        if percent > 90.0 {
            findings.push(Finding::new(
                FindingLevel::Critical,
                format!("Node memory usage is {percent:.1}%"),
            ));
        } else if percent > 80.0 {
            findings.push(Finding::new(
                FindingLevel::Warning,
                format!("Node memory usage is {percent:.1}%"),
            ));
        }
    }

    for entry in inventory.storage_pools() {
        let Some((usage, percent)) = entry
            .usage
            .and_then(|usage| usage.percent().map(|p| (usage, p)))
        else {
            continue;
        };
        let level = match UsageSeverity::of_storage(&usage) {
            Some(UsageSeverity::Critical) => FindingLevel::Critical,
            Some(UsageSeverity::Warning) => FindingLevel::Warning,
            _ => continue,
        };
        findings.push(Finding::new(
            level,
            format!("Storage {} is {percent:.1}% full", entry.handle.name),
        ));
    }

    backup_findings(inventory, &mut findings);
    allocation_findings(inventory, &mut findings);
    node_findings(inventory, &mut findings);
    cluster_findings(inventory, &mut findings);

    for entry in inventory.guests() {
        if entry.handle.state == LifecycleState::Stopped {
            findings.push(Finding::new(
                FindingLevel::Info,
                format!("{} is stopped", entry.handle.label()),
            ));
        }
        if entry.config.is_none() {
            findings.push(Finding::new(
                FindingLevel::Info,
                format!("Configuration of {} is unknown", entry.handle.label()),
            ));
        }
    }

    findings.sort_by(|a, b| b.level.cmp(&a.level));
    findings
}

fn backup_findings(inventory: &Inventory, findings: &mut Vec<Finding>) {
    let pools: Vec<&InventoryEntry> = inventory.storage_pools().collect();
    // Without content types nothing can be said about backup targets.
    if pools.is_empty() || pools.iter().any(|pool| pool.content.is_none()) {
        return;
    }

    let mut targets = 0;
    for pool in inventory.backup_pools() {
        targets += 1;
        let level = match pool.usage.as_ref().and_then(UsageSeverity::of_storage) {
            Some(UsageSeverity::Critical) => FindingLevel::Critical,
            Some(UsageSeverity::Warning) => FindingLevel::Warning,
            _ => continue,
        };
        findings.push(Finding::new(
            level,
            format!(
                "Backup storage {} is nearly full; prune old backups and set a retention policy ({RETENTION_ADVICE})",
                pool.handle.name
            ),
        ));
    }
    if targets == 0 {
        findings.push(Finding::new(
            FindingLevel::Warning,
            "No storage pool accepts backups",
        ));
    }
}

fn allocation_findings(inventory: &Inventory, findings: &mut Vec<Finding>) {
    let running: Vec<&InventoryEntry> = inventory
        .guests()
        .filter(|entry| entry.handle.state == LifecycleState::Running)
        .collect();

    for entry in &running {
        let Some(utilization) = entry.utilization else {
            continue;
        };
        let score = efficiency_score(utilization.maxmem, utilization.mem);
        if score < UNDERUTILIZED_PERCENT {
            findings.push(Finding::new(
                FindingLevel::Info,
                format!(
                    "{} uses {score:.1}% of its allocated memory",
                    entry.handle.label()
                ),
            ));
        }
    }

    let Some(status) = inventory.node_status.as_ref() else {
        return;
    };

    // Configured memory is in MiB.
    let allocated_memory: u64 = running
        .iter()
        .filter_map(|entry| entry.config.as_ref()?.memory)
        .map(|mib| mib * 1024 * 1024)
        .sum();
    if let Some(memory) = status.memory.filter(|m| m.total > 0) {
        if allocated_memory > memory.total {
            findings.push(Finding::new(
                FindingLevel::Warning,
                format!(
                    "Running guests are allocated {} of memory, more than the node's {}",
                    format_bytes(allocated_memory),
                    format_bytes(memory.total)
                ),
            ));
        }
    }

    let allocated_cpus: u64 = running
        .iter()
        .filter_map(|entry| entry.config.as_ref()?.vcpus())
        .sum();
    if let Some(cpus) = status
        .cpuinfo
        .as_ref()
        .and_then(|info| info.cpus)
        .filter(|c| *c > 0)
    {
        if allocated_cpus > cpus {
            findings.push(Finding::new(
                FindingLevel::Info,
                format!("Running guests are allocated {allocated_cpus} vCPUs on {cpus} CPUs"),
            ));
        }
    }
}

fn node_findings(inventory: &Inventory, findings: &mut Vec<Finding>) {
    for service in inventory.services.iter().flatten() {
        if service.has_failed() {
            findings.push(Finding::new(
                FindingLevel::Warning,
                format!("Service {} has failed", service.service),
            ));
        }
    }

    for disk in inventory.disks.iter().flatten() {
        if disk.health_failed() {
            findings.push(Finding::new(
                FindingLevel::Critical,
                format!(
                    "Disk {} reports health {}",
                    disk.devpath,
                    disk.health.as_deref().unwrap_or("unknown")
                ),
            ));
        } else if disk.worn_out() {
            findings.push(Finding::new(
                FindingLevel::Warning,
                format!(
                    "Disk {} has {}% wearout left",
                    disk.devpath,
                    disk.wearout.unwrap_or(0)
                ),
            ));
        }
    }

    for iface in inventory.network.iter().flatten() {
        if iface.is_down() {
            findings.push(Finding::new(
                FindingLevel::Warning,
                format!("Interface {} is configured to start but is down", iface.iface),
            ));
        }
    }
}

fn cluster_findings(inventory: &Inventory, findings: &mut Vec<Finding>) {
    if let Some(cluster) = inventory.cluster.cluster() {
        if cluster.quorate == Some(false) {
            findings.push(Finding::new(
                FindingLevel::Critical,
                format!("Cluster {} has lost quorum", cluster.name),
            ));
        }
    }
    for node in inventory.cluster.offline_nodes() {
        findings.push(Finding::new(
            FindingLevel::Warning,
            format!("Cluster node {} is offline", node.name),
        ));
    }
}
