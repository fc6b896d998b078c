//! System services from `/nodes/{node}/services`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NodeService {
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// `running` or `stopped`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// systemd active state (`active`, `inactive`, `failed`).
    #[serde(default, rename = "active-state", skip_serializing_if = "Option::is_none")]
    pub active_state: Option<String>,
    /// systemd unit state (`enabled`, `disabled`, `masked`, ...).
    #[serde(default, rename = "unit-state", skip_serializing_if = "Option::is_none")]
    pub unit_state: Option<String>,
}

impl NodeService {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.as_deref() == Some("running")
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.active_state.as_deref() == Some("failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_states() {
        let service: NodeService = serde_json::from_value(serde_json::json!({
            "service": "pvestatd", "name": "pvestatd", "desc": "PVE Status Daemon",
            "state": "stopped", "active-state": "failed", "unit-state": "enabled"
        }))
        .unwrap();
        assert!(!service.is_running());
        assert!(service.has_failed());
        assert_eq!(service.unit_state.as_deref(), Some("enabled"));
    }
}
