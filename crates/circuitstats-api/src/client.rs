// Mist API HTTP client
//
// Wraps `reqwest::Client` with Mist URL construction, token auth, and
// rate-limit rotation. Endpoint methods live in sibling files as inherent
// impls so this module stays focused on transport mechanics.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, preview};
use crate::rotator::TokenRotator;
use crate::transport::TransportConfig;

/// Default Mist cloud (global 01).
pub const DEFAULT_HOST: &str = "api.mist.com";

/// Async client for the Mist REST API (`/api/v1/...`).
///
/// Every request goes through a [`RotationPass`](crate::RotationPass):
/// a 429 moves to the next token and retries, at most once per token.
pub struct MistClient {
    http: reqwest::Client,
    base_url: Url,
    rotator: TokenRotator,
}

impl MistClient {
    /// Build a client for a Mist cloud host.
    ///
    /// `host` is either a bare hostname (`api.eu.mist.com`, HTTPS implied)
    /// or a full base URL (`http://127.0.0.1:8080`).
    pub fn new(host: &str, rotator: TokenRotator, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Self::base_url_for(host)?;
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, rotator))
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, rotator: TokenRotator) -> Self {
        Self {
            http,
            base_url,
            rotator,
        }
    }

    fn base_url_for(host: &str) -> Result<Url, Error> {
        let raw = if host.contains("://") {
            host.to_owned()
        } else {
            format!("https://{host}")
        };
        let url = Url::parse(&raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl { url: raw });
        }
        Ok(url)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token rotator owned by this client.
    pub fn rotator(&self) -> &TokenRotator {
        &self.rotator
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `{base}/api/v1/{segments...}`, escaping each segment.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let resp = self.send(&url, params).await?;
        Self::handle_response(resp).await
    }

    /// Send a GET, rotating tokens on 429 until one succeeds or every
    /// token has been tried once.
    async fn send(&self, url: &Url, params: &[(&str, String)]) -> Result<reqwest::Response, Error> {
        let mut pass = self.rotator.pass();
        loop {
            let token_index = pass.index();
            let mut auth = HeaderValue::from_str(&format!(
                "Token {}",
                pass.current_token().expose_secret()
            ))
            .map_err(|_| Error::InvalidToken { index: token_index })?;
            auth.set_sensitive(true);

            debug!(token_index, "GET {url} params={params:?}");
            let resp = self
                .http
                .get(url.clone())
                .query(params)
                .header(AUTHORIZATION, auth)
                .send()
                .await?;

            if resp.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(resp);
            }

            warn!(token_index, "Mist API rate limit hit");
            if !pass.rotate_on_rate_limit() {
                return Err(Error::RateLimitExhausted {
                    tokens: self.rotator.len(),
                });
            }
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                preview(&body).to_owned()
            };
            return Err(Error::Authentication {
                status: status.as_u16(),
                message,
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// Decode each element of a JSON array on its own, dropping (and logging)
/// entries that don't match `T` instead of failing the whole list.
pub(crate) fn decode_each<T: DeserializeOwned>(values: Vec<serde_json::Value>, what: &str) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(index = i, error = %e, "skipping malformed {what} entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::models::Site;

    fn client(host: &str) -> MistClient {
        let rotator = TokenRotator::new(vec![SecretString::from("t".to_owned())]).unwrap();
        MistClient::new(host, rotator, &TransportConfig::default()).unwrap()
    }

    #[test]
    fn bare_host_gets_https() {
        let c = client("api.eu.mist.com");
        assert_eq!(c.base_url().as_str(), "https://api.eu.mist.com/");
    }

    #[test]
    fn api_url_escapes_segments() {
        let c = client("http://127.0.0.1:9000");
        let url = c.api_url(&["sites", "a/b", "stats"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/api/v1/sites/a%2Fb/stats");
    }

    #[test]
    fn decode_each_drops_bad_entries() {
        let values = vec![
            serde_json::json!({ "id": "s1", "name": "HQ" }),
            serde_json::json!({ "name": "no id" }),
        ];
        let sites: Vec<Site> = decode_each(values, "site");
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].id, "s1");
    }
}
