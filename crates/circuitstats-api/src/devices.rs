// Device endpoints
//
// Gateway stats are org-scoped; configuration and the stats-enriched
// device search are site-scoped.

use tracing::debug;

use crate::client::{MistClient, decode_each};
use crate::error::Error;
use crate::models::{DeviceConfig, DeviceSearchResult, GatewayStats, SearchResponse};

impl MistClient {
    /// Current stats for every gateway in the organization.
    ///
    /// `GET /api/v1/orgs/{org_id}/stats/devices?type=gateway`
    ///
    /// Entries that fail to decode are logged and dropped.
    pub async fn list_org_gateway_stats(&self, org_id: &str) -> Result<Vec<GatewayStats>, Error> {
        let url = self.api_url(&["orgs", org_id, "stats", "devices"])?;
        debug!(org_id, "listing gateway stats");
        let raw: Vec<serde_json::Value> = self.get(url, &[("type", "gateway".into())]).await?;
        Ok(decode_each(raw, "gateway stats"))
    }

    /// Device configuration, including `port_config`.
    ///
    /// `GET /api/v1/sites/{site_id}/devices/{device_id}`
    pub async fn get_site_device(&self, site_id: &str, device_id: &str) -> Result<DeviceConfig, Error> {
        let url = self.api_url(&["sites", site_id, "devices", device_id])?;
        debug!(site_id, device_id, "fetching device config");
        self.get(url, &[]).await
    }

    /// Search a site's gateways by MAC with runtime stats attached.
    ///
    /// `GET /api/v1/sites/{site_id}/devices/search?type=gateway&mac=..&stats=true`
    pub async fn search_site_gateways(
        &self,
        site_id: &str,
        mac: &str,
    ) -> Result<Vec<DeviceSearchResult>, Error> {
        let url = self.api_url(&["sites", site_id, "devices", "search"])?;
        debug!(site_id, mac, "searching gateway");
        let resp: SearchResponse = self
            .get(
                url,
                &[
                    ("type", "gateway".into()),
                    ("mac", mac.to_owned()),
                    ("stats", "true".into()),
                ],
            )
            .await?;
        Ok(decode_each(resp.results, "device search"))
    }
}
