// Site endpoints

use tracing::debug;

use crate::client::{MistClient, decode_each};
use crate::error::Error;
use crate::models::Site;

/// Mist pages site listings; one large page covers any realistic org.
const SITE_PAGE_LIMIT: u32 = 1000;

impl MistClient {
    /// List the sites of an organization.
    ///
    /// `GET /api/v1/orgs/{org_id}/sites?limit=1000`
    pub async fn list_org_sites(&self, org_id: &str) -> Result<Vec<Site>, Error> {
        let url = self.api_url(&["orgs", org_id, "sites"])?;
        debug!(org_id, "listing sites");
        let raw: Vec<serde_json::Value> = self
            .get(url, &[("limit", SITE_PAGE_LIMIT.to_string())])
            .await?;
        Ok(decode_each(raw, "site"))
    }

    /// Look up a single site.
    ///
    /// `GET /api/v1/sites/{site_id}`
    pub async fn get_site(&self, site_id: &str) -> Result<Site, Error> {
        let url = self.api_url(&["sites", site_id])?;
        debug!(site_id, "fetching site");
        self.get(url, &[]).await
    }
}
