// ── Stats service ──
//
// Facade the dashboard calls into. Every operation builds its answer from
// fresh Mist API calls; the only state kept between requests is the token
// rotation cursor and the resolved organization id.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use circuitstats_api::models::{GatewayStats, InsightsQuery, PortSearchResult};
use circuitstats_api::{MistClient, TokenRotator, TransportConfig};

use crate::addressing::{looks_like_mac, normalize_mac};
use crate::aggregate::{TrafficTotals, summarize};
use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;
use crate::error::CoreError;
use crate::gateway::{build_wan_port, configured_wan_addresses, runtime_wan_addresses};
use crate::model::{
    GatewayPorts, GatewaySummary, Organization, OrganizationRef, PortTraffic, Site, WanPort,
};
use crate::window::{Timeframe, Window};

/// Read-only view of one Mist organization's gateways and WAN traffic.
pub struct StatsService {
    client: MistClient,
    configured_org: Option<String>,
    org_id: OnceCell<String>,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    /// Build a service talking to the Mist cloud described by `config`.
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let rotator = TokenRotator::new(config.tokens)?;
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = MistClient::new(&config.host, rotator, &transport)?;
        info!(
            base_url = %client.base_url(),
            tokens = client.rotator().len(),
            "Mist API client ready"
        );
        Ok(Self::with_client(client, config.org_id, Arc::new(SystemClock)))
    }

    /// Wrap an existing client with an explicit time source.
    pub fn with_client(client: MistClient, org_id: Option<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            configured_org: org_id.filter(|id| !id.trim().is_empty()),
            org_id: OnceCell::new(),
            clock,
        }
    }

    pub fn client(&self) -> &MistClient {
        &self.client
    }

    // ── Organization ─────────────────────────────────────────────────

    /// The organization id, resolved on first use.
    ///
    /// A configured id is taken as-is. Otherwise the token's privileges
    /// must name exactly one organization.
    pub async fn org_id(&self) -> Result<&str, CoreError> {
        self.org_id
            .get_or_try_init(|| self.resolve_org_id())
            .await
            .map(String::as_str)
    }

    async fn resolve_org_id(&self) -> Result<String, CoreError> {
        if let Some(id) = &self.configured_org {
            return Ok(id.trim().to_owned());
        }

        let me = self.client.get_self().await?;
        let orgs: BTreeSet<&str> = me
            .privileges
            .iter()
            .filter_map(|p| p.org_id.as_deref())
            .filter(|id| !id.is_empty())
            .collect();

        match orgs.len() {
            1 => {
                let id = orgs.into_iter().next().unwrap_or_default().to_owned();
                info!(org_id = %id, "auto-detected organization");
                Ok(id)
            }
            0 => Err(CoreError::Config {
                message: "the API token has no organization privileges; set MIST_ORG_ID".into(),
            }),
            n => Err(CoreError::Config {
                message: format!(
                    "the API token can access {n} organizations; set MIST_ORG_ID to pick one"
                ),
            }),
        }
    }

    pub async fn organization(&self) -> Result<Organization, CoreError> {
        let org_id = self.org_id().await?;
        Ok(self.client.get_org(org_id).await?.into())
    }

    /// Organizations the token holds privileges on, one entry per org.
    pub async fn organizations(&self) -> Result<Vec<OrganizationRef>, CoreError> {
        let me = self.client.get_self().await?;
        let mut seen = BTreeSet::new();
        Ok(me
            .privileges
            .into_iter()
            .filter_map(|p| {
                let org_id = p.org_id.filter(|id| !id.is_empty())?;
                let org_name = p.org_name?;
                seen.insert(org_id.clone()).then(|| OrganizationRef {
                    org_id,
                    org_name,
                    role: p.role.unwrap_or_else(|| "unknown".into()),
                })
            })
            .collect())
    }

    pub async fn sites(&self) -> Result<Vec<Site>, CoreError> {
        let org_id = self.org_id().await?;
        let sites = self.client.list_org_sites(org_id).await?;
        Ok(sites.into_iter().map(Site::from).collect())
    }

    // ── Gateway overview ─────────────────────────────────────────────

    /// Every gateway in the organization (optionally one site's) with its
    /// WAN ports and their traffic over `timeframe`.
    pub async fn gateway_overview(
        &self,
        timeframe: Timeframe,
        site_filter: Option<&str>,
    ) -> Result<Vec<GatewaySummary>, CoreError> {
        let window = Window::ending_at(self.clock.now(), timeframe);
        let org_id = self.org_id().await?;

        let site_names: HashMap<String, String> = self
            .client
            .list_org_sites(org_id)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name.unwrap_or_default()))
            .collect();

        let gateways: Vec<GatewayStats> = self
            .client
            .list_org_gateway_stats(org_id)
            .await?
            .into_iter()
            .filter(|gw| site_filter.is_none_or(|site| gw.site_id.as_deref() == Some(site)))
            .collect();
        debug!(count = gateways.len(), %timeframe, "building gateway overview");

        let wan_ports = self.wan_ports_by_device(&gateways, &window).await?;

        let mut summaries = Vec::with_capacity(gateways.len());
        for gw in gateways {
            let ports = gw
                .mac
                .as_deref()
                .map(normalize_mac)
                .and_then(|mac| wan_ports.get(&mac))
                .map_or(&[][..], Vec::as_slice);
            let site_name = self.site_name(gw.site_id.as_deref(), &site_names).await?;
            summaries.push(self.summarize_gateway(gw, site_name, ports, &window).await?);
        }
        Ok(summaries)
    }

    /// WAN port search results for every site hosting one of `gateways`,
    /// keyed by normalized gateway MAC.
    async fn wan_ports_by_device(
        &self,
        gateways: &[GatewayStats],
        window: &Window,
    ) -> Result<HashMap<String, Vec<PortSearchResult>>, CoreError> {
        let site_ids: BTreeSet<&str> = gateways.iter().filter_map(|gw| gw.site_id.as_deref()).collect();

        let mut by_device: HashMap<String, Vec<PortSearchResult>> = HashMap::new();
        for site_id in site_ids {
            let result = self
                .client
                .search_site_ports(site_id, Some(window.start), Some(window.end))
                .await;
            let Some(ports) = degrade(result, "port search")? else {
                continue;
            };
            for port in ports.into_iter().filter(PortSearchResult::is_gateway_wan) {
                let Some(mac) = port.mac.as_deref().map(normalize_mac) else {
                    continue;
                };
                by_device.entry(mac).or_default().push(port);
            }
        }

        for ports in by_device.values_mut() {
            ports.sort_by(|a, b| a.port_id.cmp(&b.port_id));
        }
        Ok(by_device)
    }

    /// Site name from the org listing, falling back to a direct lookup for
    /// sites the listing missed.
    async fn site_name(
        &self,
        site_id: Option<&str>,
        known: &HashMap<String, String>,
    ) -> Result<String, CoreError> {
        let Some(site_id) = site_id else {
            return Ok(String::new());
        };
        if let Some(name) = known.get(site_id).filter(|n| !n.is_empty()) {
            return Ok(name.clone());
        }
        let site = degrade(self.client.get_site(site_id).await, "site lookup")?;
        Ok(site.and_then(|s| s.name).unwrap_or_default())
    }

    async fn summarize_gateway(
        &self,
        gw: GatewayStats,
        site_name: String,
        wan_ports: &[PortSearchResult],
        window: &Window,
    ) -> Result<GatewaySummary, CoreError> {
        let ports = match gw.site_id.as_deref() {
            Some(site_id) if !wan_ports.is_empty() => {
                self.wan_ports(site_id, &gw, wan_ports, window).await?
            }
            _ => Vec::new(),
        };

        Ok(GatewaySummary {
            name: gw.name.unwrap_or_else(|| "Unknown".into()),
            site_name,
            model: gw.model.unwrap_or_default(),
            version: gw.version.unwrap_or_default(),
            status: gw.status.unwrap_or_else(|| "unknown".into()),
            uptime: gw.uptime.unwrap_or(0.0),
            ip: gw.ip.unwrap_or_default(),
            mac: gw.mac.unwrap_or_default(),
            timeframe: window.timeframe,
            num_ports: ports.len(),
            ports,
            id: gw.id,
            site_id: gw.site_id,
        })
    }

    async fn wan_ports(
        &self,
        site_id: &str,
        gw: &GatewayStats,
        wan_ports: &[PortSearchResult],
        window: &Window,
    ) -> Result<Vec<WanPort>, CoreError> {
        let config = degrade(
            self.client.get_site_device(site_id, &gw.id).await,
            "device config",
        )?;
        let configured = config.as_ref().map(configured_wan_addresses).unwrap_or_default();

        let runtime = match gw.mac.as_deref() {
            Some(mac) => {
                let wanted = normalize_mac(mac);
                let found = degrade(
                    self.client.search_site_gateways(site_id, mac).await,
                    "device search",
                )?
                .unwrap_or_default();
                found
                    .iter()
                    .find(|d| d.mac.as_deref().map(normalize_mac).as_deref() == Some(wanted.as_str()))
                    .or_else(|| found.first())
                    .map(runtime_wan_addresses)
                    .unwrap_or_default()
            }
            None => HashMap::new(),
        };

        let mut ports = Vec::with_capacity(wan_ports.len());
        for port in wan_ports {
            let port_id = port.port_id.clone().unwrap_or_default();
            let traffic = if port_id.is_empty() {
                None
            } else {
                self.port_totals(site_id, &gw.id, &port_id, window).await?
            };
            let desc = port.port_desc.as_deref().unwrap_or("").trim();
            ports.push(build_wan_port(
                port,
                configured.get(desc),
                runtime.get(&port_id),
                traffic,
            ));
        }
        Ok(ports)
    }

    async fn port_totals(
        &self,
        site_id: &str,
        device_id: &str,
        port_id: &str,
        window: &Window,
    ) -> Result<Option<TrafficTotals>, CoreError> {
        let query = insights_query(site_id, device_id, port_id, window);
        let insights = degrade(
            self.client.gateway_port_insights(&query).await,
            "port insights",
        )?;
        Ok(insights.map(|i| summarize(window, &i.rt, &i.rx_bps, &i.tx_bps).totals))
    }

    // ── Single gateway ───────────────────────────────────────────────

    /// Current counters for every port of one gateway, looked up by
    /// device id or MAC.
    pub async fn gateway_ports(&self, gateway: &str) -> Result<GatewayPorts, CoreError> {
        Ok(self.find_gateway(gateway).await?.into())
    }

    /// The 20-bucket rx/tx series for one gateway port.
    ///
    /// Without `site_id` the gateway's site comes from the org's gateway
    /// stats.
    pub async fn port_traffic(
        &self,
        gateway_id: &str,
        port_id: &str,
        timeframe: Timeframe,
        site_id: Option<&str>,
    ) -> Result<PortTraffic, CoreError> {
        let port_id = port_id.trim();
        if port_id.is_empty() {
            return Err(CoreError::Validation {
                message: "port id must not be empty".into(),
            });
        }

        let (device_id, site_id) = match site_id.filter(|s| !s.is_empty()) {
            // Insights are keyed by device id; a MAC has to be looked up.
            Some(site) if looks_like_mac(gateway_id) => {
                (self.find_gateway(gateway_id).await?.id, site.to_owned())
            }
            Some(site) => (gateway_id.to_owned(), site.to_owned()),
            None => {
                let gw = self.find_gateway(gateway_id).await?;
                let site = gw.site_id.ok_or_else(|| CoreError::Validation {
                    message: format!("gateway {gateway_id} is not assigned to a site"),
                })?;
                (gw.id, site)
            }
        };

        let window = Window::ending_at(self.clock.now(), timeframe);
        let query = insights_query(&site_id, &device_id, port_id, &window);
        let insights = self.client.gateway_port_insights(&query).await?;
        let summary = summarize(&window, &insights.rt, &insights.rx_bps, &insights.tx_bps);

        Ok(PortTraffic::new(device_id, port_id.to_owned(), site_id, summary))
    }

    async fn find_gateway(&self, key: &str) -> Result<GatewayStats, CoreError> {
        let org_id = self.org_id().await?;
        let by_mac = looks_like_mac(key).then(|| normalize_mac(key));

        self.client
            .list_org_gateway_stats(org_id)
            .await?
            .into_iter()
            .find(|gw| {
                gw.id == key
                    || by_mac.as_deref().is_some_and(|mac| {
                        gw.mac.as_deref().map(normalize_mac).as_deref() == Some(mac)
                    })
            })
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "gateway",
                identifier: key.to_owned(),
            })
    }
}

fn insights_query(site_id: &str, device_id: &str, port_id: &str, window: &Window) -> InsightsQuery {
    InsightsQuery {
        site_id: site_id.to_owned(),
        device_id: device_id.to_owned(),
        port_id: port_id.to_owned(),
        start: window.start,
        end: window.end,
        interval: window.interval,
    }
}

/// Keep going without an optional piece of data unless the failure would
/// hit every later call of the request too.
fn degrade<T>(result: Result<T, circuitstats_api::Error>, what: &str) -> Result<Option<T>, CoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let err = CoreError::from(e);
            if err.aborts_request() {
                return Err(err);
            }
            warn!(error = %err, "{what} failed; continuing without it");
            Ok(None)
        }
    }
}

