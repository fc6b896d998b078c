//! Node status from the `/nodes/{node}/status` endpoint.

use crate::core::domain::value_object::serde_helpers::lenient_u64;
use serde::{Deserialize, Deserializer, Serialize};

/// Host-level status of the node being inspected.
///
/// Every field is optional: older servers omit some of them and the status
/// is informational only.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NodeStatus {
    /// CPU usage ratio (0.0 to 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpuinfo: Option<CpuInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryInfo>,
    /// Root filesystem of the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootfs: Option<MemoryInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<MemoryInfo>,
    /// System uptime in seconds.
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub uptime: Option<u64>,
    /// Load averages over 1, 5 and 15 minutes.
    #[serde(
        default,
        deserialize_with = "lenient_loadavg",
        skip_serializing_if = "Option::is_none"
    )]
    pub loadavg: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kversion: Option<String>,
    /// Manager version string, e.g. `pve-manager/8.2.4/faa83925c9641325`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pveversion: Option<String>,
}

/// Host CPU topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CpuInfo {
    /// Logical CPUs (threads).
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub cpus: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub sockets: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Used/total counters in bytes, shared by memory, swap and rootfs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemoryInfo {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub free: u64,
}

impl MemoryInfo {
    /// Used share in percent; `None` when the total is zero.
    #[must_use]
    pub fn used_percent(&self) -> Option<f64> {
        (self.total > 0).then(|| self.used as f64 / self.total as f64 * 100.0)
    }
}

// The API reports load averages as strings ("0.52").
fn lenient_loadavg<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values.map(|values| {
        values
            .iter()
            .filter_map(|v| match v {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_status_from_api_payload() {
        let status: NodeStatus = serde_json::from_value(json!({
            "cpu": 0.0421,
            "cpuinfo": {"cpus": 8, "sockets": 1, "cores": 4, "model": "Intel(R) Core(TM) i7-7700"},
            "memory": {"total": 16_000_000_000u64, "used": 13_600_000_000u64, "free": 2_400_000_000u64},
            "rootfs": {"total": 100, "used": 42, "free": 58, "avail": 58},
            "uptime": 86400,
            "loadavg": ["0.52", "0.48", "0.40"],
            "pveversion": "pve-manager/8.2.4/faa83925c9641325",
            "kversion": "Linux 6.8.8-2-pve"
        }))
        .unwrap();

        assert_eq!(status.uptime, Some(86400));
        assert_eq!(status.loadavg, Some(vec![0.52, 0.48, 0.40]));
        let memory = status.memory.unwrap();
        assert!((memory.used_percent().unwrap() - 85.0).abs() < 1e-9);
        assert_eq!(status.rootfs.unwrap().used, 42);
        assert_eq!(status.cpuinfo.unwrap().cpus, Some(8));
    }

    #[test]
    fn test_node_status_tolerates_missing_fields() {
        let status: NodeStatus = serde_json::from_value(json!({})).unwrap();
        assert_eq!(status, NodeStatus::default());
        assert_eq!(MemoryInfo::default().used_percent(), None);
    }
}
