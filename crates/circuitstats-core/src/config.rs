// ── Runtime service configuration ──
//
// Describes which Mist cloud to talk to and with which tokens. Carries
// credentials but never touches disk; the binary builds one from
// `circuitstats-config` and hands it in.

use std::time::Duration;

use secrecy::SecretString;

pub use circuitstats_api::DEFAULT_HOST;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Mist cloud host (`api.eu.mist.com`) or full base URL.
    pub host: String,
    /// API tokens in rotation order.
    pub tokens: Vec<SecretString>,
    /// Organization to report on. Auto-detected from the token's
    /// privileges when unset.
    pub org_id: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            tokens: Vec::new(),
            org_id: None,
            timeout: Duration::from_secs(30),
        }
    }
}
