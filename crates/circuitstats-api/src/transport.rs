// Shared transport configuration for building the reqwest::Client.
//
// Connect and read timeouts live here; the Mist client performs no
// retry or backoff of its own beyond token rotation.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("circuitstats/", env!("CARGO_PKG_VERSION"));

/// Transport settings for the outbound HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Total request timeout (connect + read).
    pub timeout: Duration,
    /// Connect-phase timeout.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = self.connect_timeout.min(timeout);
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}
