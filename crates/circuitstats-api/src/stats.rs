// Port statistics and insights endpoints
//
// The port search returns cumulative counters for every switch/gateway
// port at a site; the insights endpoint returns a bucketed rx/tx series
// for one gateway port.

use tracing::debug;

use crate::client::{MistClient, decode_each};
use crate::error::Error;
use crate::models::{InsightsQuery, PortInsights, PortSearchResult, SearchResponse};

impl MistClient {
    /// Search port stats at a site, optionally bounded to a time range.
    ///
    /// `GET /api/v1/sites/{site_id}/stats/ports/search?start=..&end=..`
    pub async fn search_site_ports(
        &self,
        site_id: &str,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Vec<PortSearchResult>, Error> {
        let url = self.api_url(&["sites", site_id, "stats", "ports", "search"])?;
        debug!(site_id, ?start, ?end, "searching ports");

        let mut params = Vec::new();
        if let Some(start) = start {
            params.push(("start", start.to_string()));
        }
        if let Some(end) = end {
            params.push(("end", end.to_string()));
        }

        let resp: SearchResponse = self.get(url, &params).await?;
        Ok(decode_each(resp.results, "port search"))
    }

    /// Windowed rx/tx bps series for one gateway port.
    ///
    /// `GET /api/v1/sites/{site_id}/insights/gateway/{device_id}/stats`
    pub async fn gateway_port_insights(&self, query: &InsightsQuery) -> Result<PortInsights, Error> {
        let url = self.api_url(&[
            "sites",
            &query.site_id,
            "insights",
            "gateway",
            &query.device_id,
            "stats",
        ])?;
        debug!(
            device_id = %query.device_id,
            port_id = %query.port_id,
            interval = query.interval,
            "fetching port insights"
        );

        self.get(
            url,
            &[
                ("interval", query.interval.to_string()),
                ("start", query.start.to_string()),
                ("end", query.end.to_string()),
                ("port_id", query.port_id.clone()),
                ("metrics", "rx_bps,tx_bps".into()),
            ],
        )
        .await
    }
}
