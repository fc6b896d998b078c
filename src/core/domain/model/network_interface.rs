//! Network interfaces from `/nodes/{node}/network`.

use crate::core::domain::value_object::serde_helpers::lenient_flag;
use serde::{Deserialize, Serialize};

/// One interface of the node (physical NIC, bridge, bond or VLAN).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkInterface {
    pub iface: String,
    /// `eth`, `bridge`, `bond`, `vlan`, ...
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub iface_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_flag::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_flag::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub autostart: Option<bool>,
    /// Address configuration method (`static`, `manual`, `dhcp`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// Space-separated member ports of a bridge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_ports: Option<String>,
}

impl NetworkInterface {
    /// Address to show: the CIDR if known, else the bare address.
    #[must_use]
    pub fn display_address(&self) -> Option<&str> {
        self.cidr.as_deref().or(self.address.as_deref())
    }

    /// Autostarted interfaces that are not up.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.autostart == Some(true) && self.active != Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bridge_and_down_interface() {
        let interfaces: Vec<NetworkInterface> = serde_json::from_value(json!([
            {"iface": "vmbr0", "type": "bridge", "active": 1, "autostart": 1,
             "method": "static", "cidr": "192.168.1.10/24", "address": "192.168.1.10",
             "gateway": "192.168.1.1", "bridge_ports": "eno1"},
            {"iface": "eno2", "type": "eth", "autostart": "1", "method": "manual"}
        ]))
        .unwrap();

        assert_eq!(interfaces[0].display_address(), Some("192.168.1.10/24"));
        assert_eq!(interfaces[0].bridge_ports.as_deref(), Some("eno1"));
        assert!(!interfaces[0].is_down());
        assert_eq!(interfaces[1].display_address(), None);
        assert!(interfaces[1].is_down());
    }
}
