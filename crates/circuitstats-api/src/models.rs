// Mist API response types
//
// Only the fields the dashboard reads are modelled. Everything carries
// `#[serde(default)]` because Mist omits keys freely depending on device
// type, firmware, and whether the device has reported yet.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Identity ─────────────────────────────────────────────────────────

/// `GET /api/v1/self`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelfInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub privileges: Vec<Privilege>,
}

/// One entry of the token's privilege list.
#[derive(Debug, Clone, Deserialize)]
pub struct Privilege {
    /// `"org"`, `"site"`, `"msp"`, ...
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// ── Organization / Site ──────────────────────────────────────────────

/// `GET /api/v1/orgs/{org_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct Org {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_time: Option<f64>,
    #[serde(default)]
    pub updated_time: Option<f64>,
}

/// Site object from `/orgs/{org_id}/sites` and `/sites/{site_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub num_devices: Option<u32>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Gateway entry from `/orgs/{org_id}/stats/devices?type=gateway`.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayStats {
    pub id: String,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub uptime: Option<f64>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub last_seen: Option<f64>,
    /// Per-port counters keyed by port id (`ge-0/0/0`).
    #[serde(default)]
    pub port_stat: BTreeMap<String, PortStat>,
}

/// Current counters for one physical port.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortStat {
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub rx_bytes: u64,
    #[serde(default)]
    pub tx_bytes: u64,
    #[serde(default)]
    pub rx_pkts: u64,
    #[serde(default)]
    pub tx_pkts: u64,
    #[serde(default)]
    pub rx_errors: u64,
    #[serde(default)]
    pub tx_errors: u64,
    #[serde(default)]
    pub rx_bps: f64,
    #[serde(default)]
    pub tx_bps: f64,
    /// Link speed in Mbps.
    #[serde(default)]
    pub speed: u64,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub full_duplex: Option<bool>,
}

/// Device configuration from `/sites/{site_id}/devices/{device_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Port configuration keyed by interface range (`ge-0/0/0`).
    #[serde(default)]
    pub port_config: BTreeMap<String, PortConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortConfig {
    /// `"wan"`, `"lan"`, ...
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ip_config: Option<IpConfig>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, rename = "override")]
    pub override_: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpConfig {
    /// `"static"`, `"dhcp"`, `"pppoe"`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    /// Either dotted (`255.255.255.0`) or prefix (`/24`) notation.
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
}

/// Result of `/sites/{site_id}/devices/search?stats=true`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSearchResult {
    #[serde(default)]
    pub mac: Option<String>,
    /// Runtime interface state keyed by logical interface (`ge-0/0/0.0`).
    #[serde(default)]
    pub if_stat: BTreeMap<String, IfStat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IfStat {
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub port_usage: Option<String>,
    /// Addresses in CIDR notation (`192.168.20.2/24`).
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default)]
    pub address_mode: Option<String>,
    #[serde(default)]
    pub up: Option<bool>,
}

// ── Port statistics ──────────────────────────────────────────────────

/// Port entry from `/sites/{site_id}/stats/ports/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct PortSearchResult {
    /// MAC of the device owning the port.
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub port_desc: Option<String>,
    #[serde(default)]
    pub port_mac: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub port_usage: Option<String>,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub rx_bytes: u64,
    #[serde(default)]
    pub tx_bytes: u64,
    #[serde(default)]
    pub rx_pkts: u64,
    #[serde(default)]
    pub tx_pkts: u64,
    #[serde(default)]
    pub rx_errors: u64,
    #[serde(default)]
    pub tx_errors: u64,
    #[serde(default)]
    pub speed: u64,
}

impl PortSearchResult {
    /// A WAN port on a gateway (the search also returns switch ports).
    pub fn is_gateway_wan(&self) -> bool {
        self.device_type.as_deref() == Some("gateway") && self.port_usage.as_deref() == Some("wan")
    }
}

/// `{ "results": [...] }` wrapper used by the search endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

// ── Insights ─────────────────────────────────────────────────────────

/// Parameters for a windowed gateway port insights query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightsQuery {
    pub site_id: String,
    pub device_id: String,
    pub port_id: String,
    /// Window start, epoch seconds.
    pub start: i64,
    /// Window end, epoch seconds.
    pub end: i64,
    /// Bucket width in seconds.
    pub interval: u64,
}

/// `/sites/{site_id}/insights/gateway/{device_id}/stats`
///
/// One value per bucket; buckets with no data come back as `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortInsights {
    #[serde(default)]
    pub rx_bps: Vec<Option<f64>>,
    #[serde(default)]
    pub tx_bps: Vec<Option<f64>>,
    /// Bucket start times, when the API includes them.
    #[serde(default)]
    pub rt: Vec<f64>,
}
