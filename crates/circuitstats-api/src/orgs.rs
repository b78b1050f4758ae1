// Identity and organization endpoints

use tracing::debug;

use crate::client::MistClient;
use crate::error::Error;
use crate::models::{Org, SelfInfo};

impl MistClient {
    /// Who the active token belongs to, including its privilege list.
    ///
    /// `GET /api/v1/self`
    pub async fn get_self(&self) -> Result<SelfInfo, Error> {
        let url = self.api_url(&["self"])?;
        debug!("fetching token identity");
        self.get(url, &[]).await
    }

    /// `GET /api/v1/orgs/{org_id}`
    pub async fn get_org(&self, org_id: &str) -> Result<Org, Error> {
        let url = self.api_url(&["orgs", org_id])?;
        debug!(org_id, "fetching organization");
        self.get(url, &[]).await
    }
}
