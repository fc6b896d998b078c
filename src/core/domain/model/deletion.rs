//! Deletion requests, their outcomes and the summary of a cleanup run.

use super::resource::ResourceKind;
use super::storage::StorageUsage;
use crate::core::domain::error::{ApiError, ValidationError};
use crate::core::domain::value_object::serde_helpers::system_time;
use crate::core::domain::value_object::validate_snapshot_name;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One snapshot to delete. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeletionRequest {
    kind: ResourceKind,
    node: String,
    vmid: u32,
    snapshot: String,
    label: String,
}

impl DeletionRequest {
    /// Builds a request after checking that the kind owns snapshots and that
    /// the name is a deletable snapshot.
    pub fn new(
        kind: ResourceKind,
        node: impl Into<String>,
        vmid: u32,
        snapshot: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if !kind.has_snapshots() {
            return Err(ValidationError::ConstraintViolation(format!(
                "{kind} resources have no snapshots"
            )));
        }
        let node = node.into();
        if node.is_empty() {
            return Err(ValidationError::field("node", "Node name cannot be empty"));
        }
        let snapshot = snapshot.into();
        validate_snapshot_name(&snapshot)?;
        Ok(Self {
            kind,
            node,
            vmid,
            snapshot,
            label: label.into(),
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn vmid(&self) -> u32 {
        self.vmid
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    /// Human label of the owning guest, e.g. `VM 114 (homeassistant)`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// API path of the snapshot, relative to `/api2/json`.
    #[must_use]
    pub fn path(&self) -> String {
        format!(
            "nodes/{}/{}/{}/snapshot/{}",
            self.node,
            self.kind.api_segment(),
            self.vmid,
            self.snapshot
        )
    }
}

/// Result of executing one [`DeletionRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletionOutcome {
    pub request: DeletionRequest,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// Task UPID returned by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
}

impl DeletionOutcome {
    pub fn succeeded(request: DeletionRequest, task: Option<String>) -> Self {
        Self {
            request,
            success: true,
            error: None,
            task,
        }
    }

    pub fn failed(request: DeletionRequest, error: ApiError) -> Self {
        Self {
            request,
            success: false,
            error: Some(error),
            task: None,
        }
    }
}

/// Change in pool usage observed around a cleanup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpaceDelta {
    Freed { bytes: u64 },
    /// Usage did not drop yet; thin pools reclaim space asynchronously.
    NotYetReflected,
    /// No usable measurement before or after the run.
    Unknown,
}

impl SpaceDelta {
    /// Compares two readings of the same pool.
    #[must_use]
    pub fn between(before: Option<StorageUsage>, after: Option<StorageUsage>) -> Self {
        match (before.and_then(|u| u.used()), after.and_then(|u| u.used())) {
            (Some(before), Some(after)) if before > after => SpaceDelta::Freed {
                bytes: before - after,
            },
            (Some(_), Some(_)) => SpaceDelta::NotYetReflected,
            _ => SpaceDelta::Unknown,
        }
    }
}

/// Tally of a cleanup run. Holds exactly one outcome per submitted request,
/// in submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    #[serde(with = "system_time")]
    pub started_at: SystemTime,
    #[serde(with = "system_time")]
    pub finished_at: SystemTime,
    pub outcomes: Vec<DeletionOutcome>,
    /// Pool read before and after the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_before: Option<StorageUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_after: Option<StorageUsage>,
    pub space: SpaceDelta,
}

impl RunSummary {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path() {
        let request = DeletionRequest::new(
            ResourceKind::Container,
            "pve",
            113,
            "pre-update",
            "CT 113 (pihole)",
        )
        .unwrap();
        assert_eq!(request.path(), "nodes/pve/lxc/113/snapshot/pre-update");
        assert_eq!(request.label(), "CT 113 (pihole)");
    }

    #[test]
    fn test_request_rejects_invalid_targets() {
        assert!(DeletionRequest::new(ResourceKind::Vm, "pve", 100, "current", "VM 100").is_err());
        assert!(DeletionRequest::new(ResourceKind::Vm, "pve", 100, "a/b", "VM 100").is_err());
        assert!(DeletionRequest::new(ResourceKind::Vm, "", 100, "nightly", "VM 100").is_err());
        assert!(
            DeletionRequest::new(ResourceKind::StoragePool, "pve", 1, "nightly", "x").is_err()
        );
    }

    #[test]
    fn test_space_delta() {
        let measured = |used| {
            Some(StorageUsage::Measured {
                used,
                total: 1000,
                avail: 1000 - used,
            })
        };
        assert_eq!(
            SpaceDelta::between(measured(900), measured(600)),
            SpaceDelta::Freed { bytes: 300 }
        );
        assert_eq!(
            SpaceDelta::between(measured(600), measured(600)),
            SpaceDelta::NotYetReflected
        );
        assert_eq!(
            SpaceDelta::between(measured(600), measured(650)),
            SpaceDelta::NotYetReflected
        );
        assert_eq!(SpaceDelta::between(measured(600), None), SpaceDelta::Unknown);
        assert_eq!(
            SpaceDelta::between(Some(StorageUsage::NotApplicable), measured(1)),
            SpaceDelta::Unknown
        );
    }
}
