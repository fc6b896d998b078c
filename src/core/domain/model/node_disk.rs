//! Physical disks from `/nodes/{node}/disks/list`.

use crate::core::domain::value_object::serde_helpers::lenient_u64;
use serde::{Deserialize, Serialize};

/// Wearout at or below this remaining-life percentage is reported.
pub const WEAROUT_WARNING_PERCENT: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NodeDisk {
    pub devpath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Size in bytes.
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u64>,
    /// `hdd`, `ssd`, `nvme`, ...
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub disk_type: Option<String>,
    /// SMART health (`PASSED`, `OK`, `FAILED`, `UNKNOWN`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    /// Remaining life in percent; the server sends `N/A` for spinning disks.
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub wearout: Option<u64>,
    /// What the disk is used for (`LVM`, `ZFS`, `partitions`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<String>,
}

impl NodeDisk {
    /// SMART reported a failure. Unknown health is not a failure.
    #[must_use]
    pub fn health_failed(&self) -> bool {
        self.health.as_deref().is_some_and(|health| {
            !matches!(
                health.to_ascii_uppercase().as_str(),
                "PASSED" | "OK" | "UNKNOWN"
            )
        })
    }

    #[must_use]
    pub fn worn_out(&self) -> bool {
        self.wearout.is_some_and(|w| w <= WEAROUT_WARNING_PERCENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_disk_health_and_wearout() {
        let disks: Vec<NodeDisk> = serde_json::from_value(json!([
            {"devpath": "/dev/sda", "model": "ST4000", "size": 4_000_787_030_016u64,
             "type": "hdd", "health": "PASSED", "wearout": "N/A", "used": "LVM"},
            {"devpath": "/dev/nvme0n1", "type": "nvme", "health": "FAILED", "wearout": 8}
        ]))
        .unwrap();

        assert_eq!(disks[0].wearout, None);
        assert!(!disks[0].health_failed());
        assert!(!disks[0].worn_out());
        assert!(disks[1].health_failed());
        assert!(disks[1].worn_out());
    }
}
