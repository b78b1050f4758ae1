// ── WAN port assembly ──
//
// A gateway's WAN view is stitched from three Mist responses:
//
// - the site port search: which ports are WAN, link state, counters
// - the device config: static addressing, keyed by port description
// - the device search `if_stat`: addresses actually in use (DHCP leases)
//
// Static config is matched to ports by description because the config is
// keyed by interface range while the port search is keyed by port id.

use std::collections::HashMap;

use circuitstats_api::models::{DeviceConfig, DeviceSearchResult, PortSearchResult};

use crate::addressing::{normalize_netmask, split_cidr};
use crate::aggregate::TrafficTotals;
use crate::model::{AddressType, WanPort};

/// Addressing configured for a WAN port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredAddress {
    pub description: String,
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
    pub address_type: AddressType,
    pub override_config: bool,
    pub disabled: bool,
}

/// Address a WAN interface is actually using.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeAddress {
    pub ip: String,
    pub prefix_len: u8,
    pub address_mode: String,
}

/// WAN addressing from a device config, keyed by trimmed description.
///
/// Ports without a description can't be matched and are skipped.
pub fn configured_wan_addresses(config: &DeviceConfig) -> HashMap<String, ConfiguredAddress> {
    config
        .port_config
        .values()
        .filter(|cfg| cfg.usage.as_deref() == Some("wan"))
        .filter_map(|cfg| {
            let description = cfg.description.as_deref().unwrap_or("").trim();
            if description.is_empty() {
                return None;
            }
            let ip_cfg = cfg.ip_config.clone().unwrap_or_default();
            Some((
                description.to_owned(),
                ConfiguredAddress {
                    description: description.to_owned(),
                    ip: ip_cfg.ip.unwrap_or_default().trim().to_owned(),
                    netmask: ip_cfg.netmask.unwrap_or_default(),
                    gateway: ip_cfg.gateway.unwrap_or_default(),
                    address_type: AddressType::from_config(ip_cfg.kind.as_deref()),
                    override_config: cfg.override_,
                    disabled: cfg.disabled,
                },
            ))
        })
        .collect()
}

/// Runtime WAN addresses from `if_stat`, keyed by port id.
///
/// When several logical interfaces share a port the first (by interface
/// name) with a usable address wins.
pub fn runtime_wan_addresses(device: &DeviceSearchResult) -> HashMap<String, RuntimeAddress> {
    let mut out = HashMap::new();
    for stat in device.if_stat.values() {
        if stat.port_usage.as_deref() != Some("wan") {
            continue;
        }
        let Some(port_id) = stat.port_id.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let Some((ip, prefix_len)) = stat.ips.first().and_then(|cidr| split_cidr(cidr)) else {
            continue;
        };
        out.entry(port_id.to_owned()).or_insert_with(|| RuntimeAddress {
            ip: ip.to_string(),
            prefix_len,
            address_mode: stat
                .address_mode
                .clone()
                .unwrap_or_else(|| "Unknown".into()),
        });
    }
    out
}

/// Merge one port search entry with its addressing and window totals.
pub fn build_wan_port(
    port: &PortSearchResult,
    configured: Option<&ConfiguredAddress>,
    runtime: Option<&RuntimeAddress>,
    traffic: Option<TrafficTotals>,
) -> WanPort {
    let port_desc = port.port_desc.as_deref().unwrap_or("").trim();
    let address_type = configured.map_or(AddressType::Dhcp, |c| c.address_type);

    // DHCP ports report the leased address at runtime; static ports show
    // what was configured.
    let (ip, netmask) = match runtime {
        Some(rt) if address_type == AddressType::Dhcp => (rt.ip.clone(), rt.prefix_len.to_string()),
        _ => configured.map_or_else(
            || (String::new(), String::new()),
            |c| (c.ip.clone(), normalize_netmask(&c.netmask)),
        ),
    };

    let disabled = configured.is_some_and(|c| c.disabled);

    WanPort {
        name: port.port_id.clone().unwrap_or_default(),
        description: configured.map_or_else(|| port_desc.to_owned(), |c| c.description.clone()),
        enabled: port.up && !disabled,
        up: port.up,
        usage: "wan",
        ip,
        netmask,
        gateway: configured.map(|c| c.gateway.clone()).unwrap_or_default(),
        address_type,
        override_config: configured.is_some_and(|c| c.override_config),
        address_mode: runtime.map(|rt| rt.address_mode.clone()),
        rx_bytes: traffic.map_or(0, |t| t.rx_bytes),
        tx_bytes: traffic.map_or(0, |t| t.tx_bytes),
        rx_pkts: port.rx_pkts,
        tx_pkts: port.tx_pkts,
        rx_errors: port.rx_errors,
        tx_errors: port.tx_errors,
        speed: port.speed,
        mac: port.port_mac.clone().unwrap_or_default(),
        traffic,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn port(value: serde_json::Value) -> PortSearchResult {
        serde_json::from_value(value).unwrap()
    }

    fn config() -> DeviceConfig {
        serde_json::from_value(json!({
            "port_config": {
                "ge-0/0/0": {
                    "usage": "wan",
                    "description": " ISP-A ",
                    "ip_config": { "type": "static", "ip": "203.0.113.10", "netmask": "/29", "gateway": "203.0.113.9" },
                    "override": true
                },
                "ge-0/0/1": { "usage": "wan", "description": "ISP-B", "ip_config": { "type": "dhcp" } },
                "ge-0/0/2": { "usage": "wan" },
                "ge-0/0/3": { "usage": "lan", "description": "LAN" }
            }
        }))
        .unwrap()
    }

    fn search() -> DeviceSearchResult {
        serde_json::from_value(json!({
            "mac": "aabbcc001122",
            "if_stat": {
                "ge-0/0/1.0": { "port_id": "ge-0/0/1", "port_usage": "wan", "ips": ["100.64.1.7/22"], "address_mode": "DHCP" },
                "ge-0/0/3.0": { "port_id": "ge-0/0/3", "port_usage": "lan", "ips": ["10.0.0.1/24"] },
                "ge-0/0/4.0": { "port_id": "ge-0/0/4", "port_usage": "wan", "ips": [] }
            }
        }))
        .unwrap()
    }

    #[test]
    fn configured_addresses_keyed_by_trimmed_description() {
        let map = configured_wan_addresses(&config());
        assert_eq!(map.len(), 2);
        let a = &map["ISP-A"];
        assert_eq!(a.address_type, AddressType::Static);
        assert_eq!(a.ip, "203.0.113.10");
        assert!(a.override_config);
        assert_eq!(map["ISP-B"].address_type, AddressType::Dhcp);
    }

    #[test]
    fn runtime_addresses_only_for_wan_with_ips() {
        let map = runtime_wan_addresses(&search());
        assert_eq!(map.len(), 1);
        let rt = &map["ge-0/0/1"];
        assert_eq!(rt.ip, "100.64.1.7");
        assert_eq!(rt.prefix_len, 22);
        assert_eq!(rt.address_mode, "DHCP");
    }

    #[test]
    fn static_port_uses_configured_address() {
        let cfg = configured_wan_addresses(&config());
        let p = port(json!({ "port_id": "ge-0/0/0", "port_desc": "ISP-A", "up": true, "speed": 1000 }));
        let wan = build_wan_port(&p, cfg.get("ISP-A"), None, None);
        assert_eq!(wan.ip, "203.0.113.10");
        assert_eq!(wan.netmask, "29");
        assert_eq!(wan.gateway, "203.0.113.9");
        assert!(wan.enabled);
        assert_eq!(wan.rx_bytes, 0);
        assert!(wan.traffic.is_none());
    }

    #[test]
    fn dhcp_port_prefers_runtime_address() {
        let cfg = configured_wan_addresses(&config());
        let rt = runtime_wan_addresses(&search());
        let p = port(json!({ "port_id": "ge-0/0/1", "port_desc": "ISP-B", "up": false }));
        let totals = TrafficTotals {
            rx_bytes: 42,
            tx_bytes: 7,
            ..TrafficTotals::default()
        };
        let wan = build_wan_port(&p, cfg.get("ISP-B"), rt.get("ge-0/0/1"), Some(totals));
        assert_eq!(wan.ip, "100.64.1.7");
        assert_eq!(wan.netmask, "22");
        assert_eq!(wan.address_mode.as_deref(), Some("DHCP"));
        assert!(!wan.enabled);
        assert_eq!(wan.rx_bytes, 42);
        assert_eq!(wan.tx_bytes, 7);
    }

    #[test]
    fn unmatched_port_defaults_to_dhcp() {
        let p = port(json!({ "port_id": "ge-0/0/5", "port_desc": " spare ", "up": true }));
        let wan = build_wan_port(&p, None, None, None);
        assert_eq!(wan.address_type, AddressType::Dhcp);
        assert_eq!(wan.description, "spare");
        assert_eq!(wan.ip, "");
        assert_eq!(wan.address_mode, None);
        assert!(!wan.override_config);
    }
}
