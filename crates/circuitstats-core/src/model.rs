// ── Dashboard domain types ──
//
// What the dashboard serves. Built fresh from Mist API responses on every
// request; nothing here is cached.

use std::collections::BTreeMap;

use serde::Serialize;

use circuitstats_api::models as api;

use crate::aggregate::{TrafficTotals, WindowedSummary};
use crate::window::Timeframe;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub created_time: Option<f64>,
    pub updated_time: Option<f64>,
}

impl From<api::Org> for Organization {
    fn from(org: api::Org) -> Self {
        Self {
            id: org.id,
            name: org.name.unwrap_or_else(|| "Unknown Organization".into()),
            created_time: org.created_time,
            updated_time: org.updated_time,
        }
    }
}

/// An organization the token holds privileges on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationRef {
    pub org_id: String,
    pub org_name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub address: String,
    pub timezone: String,
    pub num_devices: u32,
}

impl From<api::Site> for Site {
    fn from(site: api::Site) -> Self {
        Self {
            id: site.id,
            name: site.name.unwrap_or_default(),
            address: site.address.unwrap_or_default(),
            timezone: site.timezone.unwrap_or_else(|| "UTC".into()),
            num_devices: site.num_devices.unwrap_or(0),
        }
    }
}

/// One gateway and its WAN ports, with traffic over the requested window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewaySummary {
    pub id: String,
    pub name: String,
    pub site_id: Option<String>,
    pub site_name: String,
    pub model: String,
    pub version: String,
    pub status: String,
    pub uptime: f64,
    pub ip: String,
    pub mac: String,
    pub timeframe: Timeframe,
    pub ports: Vec<WanPort>,
    pub num_ports: usize,
}

/// How a WAN port obtains its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Static,
    Dhcp,
    Pppoe,
    Unknown,
}

impl AddressType {
    pub fn from_config(kind: Option<&str>) -> Self {
        match kind.map(str::to_ascii_lowercase).as_deref() {
            // Unconfigured WAN ports come up on DHCP.
            None | Some("dhcp") => Self::Dhcp,
            Some("static") => Self::Static,
            Some("pppoe") => Self::Pppoe,
            Some(_) => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WanPort {
    /// Port id, e.g. `ge-0/0/0`.
    pub name: String,
    pub description: String,
    /// Link up and not administratively disabled.
    pub enabled: bool,
    pub up: bool,
    pub usage: &'static str,
    pub ip: String,
    /// Prefix length, e.g. `24`.
    pub netmask: String,
    pub gateway: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    #[serde(rename = "override")]
    pub override_config: bool,
    /// How the gateway reports the address in use (`DHCP`, `Static`, ...),
    /// when it reports one.
    pub address_mode: Option<String>,
    /// Bytes over the window when traffic insights were available.
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_pkts: u64,
    pub tx_pkts: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub speed: u64,
    pub mac: String,
    /// `None` when the insights request for this port failed.
    pub traffic: Option<TrafficTotals>,
}

/// Current counters for every port of one gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayPorts {
    pub gateway_id: String,
    pub gateway_name: String,
    pub ports: BTreeMap<String, PortCounters>,
    /// Last time the gateway reported, epoch seconds.
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortCounters {
    pub up: bool,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_pkts: u64,
    pub tx_pkts: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_bps: f64,
    pub tx_bps: f64,
    pub speed: u64,
    pub mac: String,
    pub full_duplex: bool,
}

impl From<api::PortStat> for PortCounters {
    fn from(p: api::PortStat) -> Self {
        Self {
            up: p.up,
            rx_bytes: p.rx_bytes,
            tx_bytes: p.tx_bytes,
            rx_pkts: p.rx_pkts,
            tx_pkts: p.tx_pkts,
            rx_errors: p.rx_errors,
            tx_errors: p.tx_errors,
            rx_bps: p.rx_bps,
            tx_bps: p.tx_bps,
            speed: p.speed,
            mac: p.mac.unwrap_or_default(),
            full_duplex: p.full_duplex.unwrap_or(true),
        }
    }
}

impl From<api::GatewayStats> for GatewayPorts {
    fn from(gw: api::GatewayStats) -> Self {
        Self {
            gateway_id: gw.id,
            gateway_name: gw.name.unwrap_or_else(|| "Unknown".into()),
            ports: gw
                .port_stat
                .into_iter()
                .map(|(name, stat)| (name, stat.into()))
                .collect(),
            timestamp: gw.last_seen.unwrap_or(0.0),
        }
    }
}

/// Chart series for one port: parallel arrays of `BUCKETS` entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortTraffic {
    pub gateway_id: String,
    pub port_id: String,
    pub site_id: String,
    pub timeframe: Timeframe,
    pub start: i64,
    pub end: i64,
    pub interval: u64,
    pub timestamps: Vec<i64>,
    pub rx_bps: Vec<f64>,
    pub tx_bps: Vec<f64>,
    pub totals: TrafficTotals,
}

impl PortTraffic {
    pub fn new(gateway_id: String, port_id: String, site_id: String, summary: WindowedSummary) -> Self {
        let WindowedSummary {
            window,
            samples,
            totals,
        } = summary;
        Self {
            gateway_id,
            port_id,
            site_id,
            timeframe: window.timeframe,
            start: window.start,
            end: window.end,
            interval: window.interval,
            timestamps: samples.iter().map(|s| s.timestamp).collect(),
            rx_bps: samples.iter().map(|s| s.rx_bps).collect(),
            tx_bps: samples.iter().map(|s| s.tx_bps).collect(),
            totals,
        }
    }
}
