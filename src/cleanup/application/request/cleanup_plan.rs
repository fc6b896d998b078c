//! Reviewable cleanup plans.
//!
//! A plan is produced from an inventory, written to disk for review and
//! later turned into [`DeletionRequest`]s.

use crate::core::domain::{
    error::{ProxmoxResult, ValidationError},
    model::{DeletionRequest, ResourceKind},
    value_object::serde_helpers::{option_system_time, system_time},
};
use crate::report::json::{DocumentKind, read_document, write_document};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::SystemTime;

const LOW_RISK_AFTER_DAYS: u64 = 30;
const MEDIUM_RISK_AFTER_DAYS: u64 = 7;

/// How risky deleting a snapshot is, judged by its age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    /// Older than 30 days is low risk, older than 7 days medium, anything
    /// newer or of unknown age high.
    #[must_use]
    pub fn assess(age_days: Option<u64>) -> (Risk, &'static str) {
        match age_days {
            Some(days) if days > LOW_RISK_AFTER_DAYS => (Risk::Low, "Snapshot older than 30 days"),
            Some(days) if days > MEDIUM_RISK_AFTER_DAYS => {
                (Risk::Medium, "Snapshot older than 1 week")
            }
            Some(_) => (Risk::High, "Recent snapshot (< 7 days)"),
            None => (Risk::High, "Snapshot age unknown"),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Risk::Low => "LOW",
            Risk::Medium => "MEDIUM",
            Risk::High => "HIGH",
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Risk {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Risk::Low),
            "medium" => Ok(Risk::Medium),
            "high" => Ok(Risk::High),
            other => Err(ValidationError::field(
                "risk",
                format!("'{other}' is not one of low, medium, high"),
            )),
        }
    }
}

/// Which snapshots a plan includes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlanPolicy {
    /// Snapshots younger than this are left out. Unknown ages pass only at zero.
    pub min_age_days: u64,
    /// Highest risk level still included.
    pub max_risk: Risk,
    /// Restrict to these guests (`qemu/100`, `lxc/101` or a bare vmid); empty means all.
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            min_age_days: 0,
            max_risk: Risk::High,
            resources: Vec::new(),
        }
    }
}

/// One snapshot proposed for deletion.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CleanupCandidate {
    pub resource_id: String,
    pub kind: ResourceKind,
    pub node: String,
    pub vmid: u32,
    /// Label of the owning guest, e.g. `VM 114 (homeassistant)`.
    pub label: String,
    pub snapshot: String,
    #[serde(default, with = "option_system_time")]
    pub created_at: Option<SystemTime>,
    #[serde(default)]
    pub age_days: Option<u64>,
    pub risk: Risk,
    pub reason: String,
}

impl CleanupCandidate {
    /// # Errors
    /// Fails if the candidate was edited into an invalid target (e.g. `current`).
    pub fn to_request(&self) -> Result<DeletionRequest, ValidationError> {
        DeletionRequest::new(
            self.kind,
            self.node.clone(),
            self.vmid,
            self.snapshot.clone(),
            self.label.clone(),
        )
    }
}

/// Ordered list of snapshots to delete, with the policy that selected them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CleanupPlan {
    pub node: String,
    #[serde(with = "system_time")]
    pub generated_at: SystemTime,
    pub policy: PlanPolicy,
    pub candidates: Vec<CleanupCandidate>,
}

impl CleanupPlan {
    /// Deletion requests in plan order.
    ///
    /// # Errors
    /// Fails on the first invalid candidate; nothing is executed for a broken plan.
    pub fn requests(&self) -> Result<Vec<DeletionRequest>, ValidationError> {
        self.candidates
            .iter()
            .map(CleanupCandidate::to_request)
            .collect()
    }

    pub fn count_by_risk(&self, risk: Risk) -> usize {
        self.candidates.iter().filter(|c| c.risk == risk).count()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Reads a plan previously written with [`CleanupPlan::save`].
    pub async fn load(path: impl AsRef<Path>) -> ProxmoxResult<Self> {
        read_document(path.as_ref(), DocumentKind::CleanupPlan).await
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> ProxmoxResult<()> {
        write_document(path.as_ref(), DocumentKind::CleanupPlan, self).await
    }
}
