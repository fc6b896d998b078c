//! Snapshot references from `/nodes/{node}/{qemu|lxc}/{vmid}/snapshot`.

use crate::core::domain::value_object::CURRENT_STATE;
use crate::core::domain::value_object::serde_helpers::option_system_time;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// A snapshot owned by a VM or container.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SnapshotRef {
    /// Inventory key of the owning resource, e.g. `qemu/100`.
    pub owner: String,
    pub name: String,
    /// Creation time; absent when the server did not report one.
    #[serde(default, with = "option_system_time")]
    pub created_at: Option<SystemTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl SnapshotRef {
    /// Age relative to `now`; `None` when the creation time is unknown or in the future.
    #[must_use]
    pub fn age(&self, now: SystemTime) -> Option<Duration> {
        self.created_at
            .and_then(|created| now.duration_since(created).ok())
    }

    /// Age in whole days.
    #[must_use]
    pub fn age_days(&self, now: SystemTime) -> Option<u64> {
        self.age(now).map(|age| age.as_secs() / 86_400)
    }
}

/// Raw snapshot list entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SnapshotListItem {
    pub name: String,
    #[serde(default, with = "option_system_time")]
    pub snaptime: Option<SystemTime>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

/// Converts a raw snapshot list into references, dropping the `current` pseudo-entry.
pub(crate) fn snapshots_from_list(owner: &str, items: Vec<SnapshotListItem>) -> Vec<SnapshotRef> {
    items
        .into_iter()
        .filter(|item| item.name != CURRENT_STATE)
        .map(|item| SnapshotRef {
            owner: owner.to_string(),
            name: item.name,
            created_at: item.snaptime,
            description: item.description.filter(|d| !d.trim().is_empty()),
            parent: item.parent,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::UNIX_EPOCH;

    #[test]
    fn test_snapshots_from_list_skips_current() {
        let items: Vec<SnapshotListItem> = serde_json::from_value(json!([
            {"name": "pre-upgrade", "snaptime": 1_700_000_000, "description": "before 8.2\n"},
            {"name": "nightly", "snaptime": "1700086400", "parent": "pre-upgrade", "description": ""},
            {"name": "current", "running": 1, "parent": "nightly"}
        ]))
        .unwrap();

        let snapshots = snapshots_from_list("qemu/100", items);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].owner, "qemu/100");
        assert_eq!(snapshots[0].description.as_deref(), Some("before 8.2\n"));
        assert_eq!(snapshots[1].description, None);
        assert_eq!(
            snapshots[1].created_at,
            Some(UNIX_EPOCH + Duration::from_secs(1_700_086_400))
        );
    }

    #[test]
    fn test_age_days() {
        let snapshot = SnapshotRef {
            owner: "lxc/101".to_string(),
            name: "weekly".to_string(),
            created_at: Some(UNIX_EPOCH + Duration::from_secs(1_000_000)),
            description: None,
            parent: None,
        };
        let now = UNIX_EPOCH + Duration::from_secs(1_000_000 + 3 * 86_400 + 60);
        assert_eq!(snapshot.age_days(now), Some(3));
        assert_eq!(snapshot.age_days(UNIX_EPOCH), None);
    }
}
