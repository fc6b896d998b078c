//! Plain-text renderers for stdout.

use super::format::{format_bytes, format_percent, format_uptime};
use super::health::{Finding, StorageRow};
use crate::cleanup::application::request::cleanup_plan::{CleanupPlan, Risk};
use crate::core::domain::model::{
    ClusterOverview, Inventory, InventoryEntry, LifecycleState, NetworkInterface, NodeDisk,
    NodeService, ResourceKind, RunSummary, SpaceDelta, StorageUsage,
};

const RULE: &str = "================================================================";

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("{RULE}\n{title}\n{RULE}\n"));
}

fn state_marker(state: LifecycleState) -> &'static str {
    match state {
        LifecycleState::Running => "[up]  ",
        LifecycleState::Stopped => "[down]",
        LifecycleState::Unknown => "[?]   ",
    }
}

fn usage_line(usage: Option<&StorageUsage>) -> String {
    match usage {
        Some(StorageUsage::Measured { used, total, avail }) => format!(
            "{} / {} ({}), {} free",
            format_bytes(*used),
            format_bytes(*total),
            format_percent(*used, *total),
            format_bytes(*avail)
        ),
        Some(StorageUsage::NotApplicable) => "usage not applicable".to_string(),
        None => "usage unknown".to_string(),
    }
}

fn guest_line(out: &mut String, entry: &InventoryEntry) {
    let handle = &entry.handle;
    out.push_str(&format!(
        "  {} {} [{}]",
        state_marker(handle.state),
        handle.label(),
        handle.state.as_str()
    ));
    match &entry.config {
        Some(config) => {
            if let Some(vcpus) = config.vcpus() {
                out.push_str(&format!(", {vcpus} vCPU"));
            }
            if let Some(memory) = config.memory {
                out.push_str(&format!(", {}", format_bytes(memory * 1024 * 1024)));
            }
            if config.onboot == Some(true) {
                out.push_str(", onboot");
            }
        }
        None => out.push_str(", config unknown"),
    }
    if let Some(utilization) = &entry.utilization {
        out.push_str(&format!(
            ", using {} ({})",
            format_bytes(utilization.mem),
            format_percent(utilization.mem, utilization.maxmem)
        ));
    }
    match &entry.snapshots {
        Some(snapshots) => out.push_str(&format!(", {} snapshot(s)\n", snapshots.len())),
        None => out.push_str(", snapshots unknown\n"),
    }
}

fn render_network_into(out: &mut String, network: Option<&[NetworkInterface]>) {
    out.push_str("\nNetwork:\n");
    let Some(network) = network else {
        out.push_str("  unavailable\n");
        return;
    };
    if network.is_empty() {
        out.push_str("  none\n");
    }
    for iface in network {
        let marker = if iface.active == Some(true) {
            state_marker(LifecycleState::Running)
        } else {
            state_marker(LifecycleState::Stopped)
        };
        out.push_str(&format!(
            "  {marker} {} ({})",
            iface.iface,
            iface.iface_type.as_deref().unwrap_or("unknown")
        ));
        if let Some(address) = iface.display_address() {
            out.push_str(&format!(" {address}"));
        }
        if let Some(gateway) = &iface.gateway {
            out.push_str(&format!(" via {gateway}"));
        }
        if let Some(ports) = iface.bridge_ports.as_deref().filter(|p| !p.is_empty()) {
            out.push_str(&format!(", ports {ports}"));
        }
        out.push('\n');
    }
}

fn render_disks_into(out: &mut String, disks: &[NodeDisk]) {
    out.push_str("\nDisks:\n");
    for disk in disks {
        out.push_str(&format!(
            "  {} {} {}, health {}",
            disk.devpath,
            disk.model.as_deref().unwrap_or("unknown model"),
            disk.size.map_or_else(|| "size unknown".to_string(), format_bytes),
            disk.health.as_deref().unwrap_or("unknown")
        ));
        if let Some(wearout) = disk.wearout {
            out.push_str(&format!(", wearout {wearout}%"));
        }
        out.push('\n');
    }
}

fn render_services_into(out: &mut String, services: &[NodeService]) {
    let running = services.iter().filter(|s| s.is_running()).count();
    out.push_str(&format!(
        "\nServices: {running}/{} running\n",
        services.len()
    ));
    for service in services.iter().filter(|s| s.has_failed()) {
        out.push_str(&format!("  failed: {}\n", service.service));
    }
}

fn render_cluster_into(out: &mut String, cluster: &ClusterOverview) {
    out.push_str("\nCluster:\n");
    match cluster.cluster() {
        Some(item) => {
            let quorate = match item.quorate {
                Some(true) => "quorate",
                Some(false) => "NOT quorate",
                None => "quorum unknown",
            };
            out.push_str(&format!(
                "  {} ({} node(s), {quorate})\n",
                item.name,
                item.nodes.unwrap_or(0)
            ));
        }
        None if cluster.status.is_some() => out.push_str("  standalone node\n"),
        None => out.push_str("  status unavailable\n"),
    }
    if let Some(version) = cluster.version.as_ref().and_then(|v| v.version.as_deref()) {
        out.push_str(&format!("  API version: {version}\n"));
    }
    if cluster.resources.is_some() {
        out.push_str(&format!(
            "  Resources: {} VM(s), {} container(s), {} storage, {} node(s)\n",
            cluster.resource_count("qemu").unwrap_or(0),
            cluster.resource_count("lxc").unwrap_or(0),
            cluster.resource_count("storage").unwrap_or(0),
            cluster.resource_count("node").unwrap_or(0)
        ));
    }
    if let Some(pools) = &cluster.pools {
        out.push_str(&format!("  Pools: {}\n", pools.len()));
    }
    if let Some(users) = &cluster.users {
        let enabled = users.iter().filter(|u| u.is_enabled()).count();
        out.push_str(&format!("  Users: {enabled}/{} enabled\n", users.len()));
    }
}

/// Full assessment: node status, guests, storage, network, cluster and findings.
pub fn render_inventory(inventory: &Inventory, findings: &[Finding]) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Node {}", inventory.node));

    match &inventory.node_status {
        Some(status) => {
            if let Some(version) = &status.pveversion {
                out.push_str(&format!("Version: {version}\n"));
            }
            if let Some(cpu) = status.cpu {
                out.push_str(&format!("CPU usage: {:.1}%", cpu * 100.0));
                if let Some(cpus) = status.cpuinfo.as_ref().and_then(|c| c.cpus) {
                    out.push_str(&format!(" of {cpus} CPU(s)"));
                }
                out.push('\n');
            }
            if let Some(memory) = &status.memory {
                out.push_str(&format!(
                    "Memory: {} / {} ({})\n",
                    format_bytes(memory.used),
                    format_bytes(memory.total),
                    format_percent(memory.used, memory.total)
                ));
            }
            if let Some(rootfs) = &status.rootfs {
                out.push_str(&format!(
                    "Root filesystem: {} / {} ({})\n",
                    format_bytes(rootfs.used),
                    format_bytes(rootfs.total),
                    format_percent(rootfs.used, rootfs.total)
                ));
            }
            if let Some(uptime) = status.uptime {
                out.push_str(&format!("Uptime: {}\n", format_uptime(uptime)));
            }
        }
        None => out.push_str("Node status unavailable\n"),
    }
    if let Some(version) = &inventory.node_version {
        out.push_str(&format!(
            "Manager: {} (release {})\n",
            version.version.as_deref().unwrap_or("unknown"),
            version.release.as_deref().unwrap_or("unknown")
        ));
    }

    for (kind, title) in [
        (ResourceKind::Vm, "Virtual machines"),
        (ResourceKind::Container, "Containers"),
    ] {
        let guests: Vec<&InventoryEntry> = inventory.of_kind(kind).collect();
        let running = guests
            .iter()
            .filter(|e| e.handle.state == LifecycleState::Running)
            .count();
        out.push_str(&format!("\n{title} ({running}/{} running):\n", guests.len()));
        if guests.is_empty() {
            out.push_str("  none\n");
        }
        for entry in guests {
            guest_line(&mut out, entry);
        }
    }

    out.push_str("\nStorage:\n");
    for entry in inventory.storage_pools() {
        out.push_str(&format!(
            "  {} {}: {}",
            state_marker(entry.handle.state),
            entry.handle.name,
            usage_line(entry.usage.as_ref())
        ));
        if let Some(content) = entry.content.as_ref().filter(|c| !c.is_empty()) {
            out.push_str(&format!(" [{}]", content.join(",")));
        }
        out.push('\n');
    }

    render_network_into(&mut out, inventory.network.as_deref());
    if let Some(disks) = &inventory.disks {
        render_disks_into(&mut out, disks);
    }
    if let Some(services) = &inventory.services {
        render_services_into(&mut out, services);
    }
    render_cluster_into(&mut out, &inventory.cluster);

    out.push_str(&format!("\nSnapshots: {}\n", inventory.snapshot_count()));
    render_findings_into(&mut out, findings);
    out
}

fn render_findings_into(out: &mut String, findings: &[Finding]) {
    out.push_str("\nFindings:\n");
    if findings.is_empty() {
        out.push_str("  none\n");
    }
    for finding in findings {
        out.push_str(&format!("  [{}] {}\n", finding.level, finding.message));
    }
}

/// Storage pools with usage and severity.
pub fn render_storage(node: &str, rows: &[StorageRow]) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Storage on {node}"));
    if rows.is_empty() {
        out.push_str("No storage pools reported.\n");
    }
    for row in rows {
        let severity = row.severity.map_or("-", |s| s.as_str());
        out.push_str(&format!(
            "  {:<9} {:<20} {}\n",
            severity,
            row.storage,
            usage_line(row.usage.as_ref())
        ));
    }
    out
}

/// Cleanup plan grouped by risk.
pub fn render_plan(plan: &CleanupPlan) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Cleanup plan for {}", plan.node));
    out.push_str(&format!(
        "Policy: min age {} day(s), max risk {}\n",
        plan.policy.min_age_days, plan.policy.max_risk
    ));
    out.push_str(&format!(
        "Candidates: {} (LOW {}, MEDIUM {}, HIGH {})\n",
        plan.candidates.len(),
        plan.count_by_risk(Risk::Low),
        plan.count_by_risk(Risk::Medium),
        plan.count_by_risk(Risk::High)
    ));
    for risk in [Risk::Low, Risk::Medium, Risk::High] {
        let mut group = plan.candidates.iter().filter(|c| c.risk == risk).peekable();
        if group.peek().is_none() {
            continue;
        }
        out.push_str(&format!("\n{risk} risk:\n"));
        for candidate in group {
            let age = candidate
                .age_days
                .map_or_else(|| "age unknown".to_string(), |d| format!("{d} day(s)"));
            out.push_str(&format!(
                "  {} / {} ({age}) - {}\n",
                candidate.label, candidate.snapshot, candidate.reason
            ));
        }
    }
    out
}

/// Tally of a cleanup run, failures listed individually.
pub fn render_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    heading(&mut out, "Cleanup run");
    out.push_str(&format!(
        "Deleted: {}  Failed: {}  Total: {}\n",
        summary.success_count(),
        summary.failed_count(),
        summary.outcomes.len()
    ));
    for outcome in &summary.outcomes {
        let status = if outcome.success { "ok  " } else { "FAIL" };
        out.push_str(&format!(
            "  [{status}] {} / {}",
            outcome.request.label(),
            outcome.request.snapshot()
        ));
        match &outcome.error {
            Some(error) => out.push_str(&format!(": {error}\n")),
            None => out.push('\n'),
        }
    }

    if let Some(storage) = &summary.storage {
        out.push_str(&format!(
            "\nStorage {storage} before: {}\n",
            usage_line(summary.storage_before.as_ref())
        ));
        out.push_str(&format!(
            "Storage {storage} after:  {}\n",
            usage_line(summary.storage_after.as_ref())
        ));
    }
    let space = match summary.space {
        SpaceDelta::Freed { bytes } => format!("{} freed", format_bytes(bytes)),
        SpaceDelta::NotYetReflected => "not yet reflected in pool usage".to_string(),
        SpaceDelta::Unknown => "unknown".to_string(),
    };
    out.push_str(&format!("Space: {space}\n"));
    out
}
