//! Storage pool listings and usage.

use crate::core::domain::value_object::serde_helpers::{lenient_flag, lenient_u64};
use serde::{Deserialize, Serialize};

/// Usage of a storage pool.
///
/// Pools that do not report capacity (some network and directory backends)
/// are `NotApplicable`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageUsage {
    Measured { used: u64, total: u64, avail: u64 },
    NotApplicable,
}

impl StorageUsage {
    /// Used share in percent.
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        match self {
            StorageUsage::Measured { used, total, .. } if *total > 0 => {
                Some(*used as f64 / *total as f64 * 100.0)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn used(&self) -> Option<u64> {
        match self {
            StorageUsage::Measured { used, .. } => Some(*used),
            StorageUsage::NotApplicable => None,
        }
    }
}

/// Capacity counters as reported by both the storage list and the status endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct StorageCounters {
    #[serde(default, deserialize_with = "lenient_u64::deserialize")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64::deserialize")]
    pub used: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64::deserialize")]
    pub avail: Option<u64>,
}

impl StorageCounters {
    /// `Measured` only when both total (non-zero) and used are present.
    #[must_use]
    pub fn usage(&self) -> StorageUsage {
        match (self.total, self.used) {
            (Some(total), Some(used)) if total > 0 => StorageUsage::Measured {
                used,
                total,
                avail: self.avail.unwrap_or_else(|| total.saturating_sub(used)),
            },
            _ => StorageUsage::NotApplicable,
        }
    }
}

/// A pool as listed by `/nodes/{node}/storage`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageListItem {
    pub storage: String,
    #[serde(default, rename = "type")]
    pub storage_type: Option<String>,
    /// Comma-separated content types (`images,rootdir,backup`).
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag::deserialize")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag::deserialize")]
    pub shared: Option<bool>,
    #[serde(flatten)]
    pub counters: StorageCounters,
}
