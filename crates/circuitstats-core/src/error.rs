// ── Core error types ──
//
// Domain errors surfaced to the dashboard. The `From<circuitstats_api::Error>`
// impl sorts transport-layer failures into the four classes the HTTP layer
// cares about: bad credentials, rate-limit exhaustion, transient upstream
// trouble, and malformed payloads.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Credentials ──────────────────────────────────────────────────
    #[error("Mist API rejected the credentials (HTTP {status}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    #[error("All {tokens} Mist API token(s) are rate limited; try again shortly")]
    RateLimited { tokens: usize },

    // ── Upstream ─────────────────────────────────────────────────────
    #[error("Mist API unavailable: {message}")]
    UpstreamUnavailable { message: String, status: Option<u16> },

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Unexpected Mist API payload: {message}")]
    MalformedPayload { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("Invalid request: {message}")]
    Validation { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The caller may retry the same request later and expect success.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::UpstreamUnavailable { .. }
        )
    }

    /// Failures that would hit every further upstream call of the current
    /// request too; partial results are pointless once one occurs.
    pub fn aborts_request(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::RateLimited { .. } | Self::Config { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<circuitstats_api::Error> for CoreError {
    fn from(err: circuitstats_api::Error) -> Self {
        use circuitstats_api::Error as Api;

        let transient = err.is_transient();
        let upstream_status = err.status();

        match err {
            Api::Authentication { status, message } => Self::AuthenticationFailed { status, message },
            Api::RateLimitExhausted { tokens } => Self::RateLimited { tokens },
            Api::NoCredentials => Self::Config {
                message: "no Mist API token configured (set MIST_APITOKEN)".into(),
            },
            Api::InvalidToken { index } => Self::Config {
                message: format!("API token #{index} is not a valid header value"),
            },
            Api::Transport(e) if transient => Self::UpstreamUnavailable {
                status: upstream_status,
                message: if e.is_timeout() {
                    "request to Mist API timed out".into()
                } else {
                    e.to_string()
                },
            },
            // Redirect loops, undecodable bodies: retrying won't help.
            Api::Transport(e) => Self::Upstream {
                status: upstream_status.unwrap_or(502),
                message: format!("Mist API request failed: {e}"),
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("invalid Mist API URL: {e}"),
            },
            Api::InvalidBaseUrl { url } => Self::Config {
                message: format!("invalid Mist API host: {url}"),
            },
            Api::ClientBuild(message) => Self::Config { message },
            Api::Upstream { status, body } => {
                // Reuse the transport error's message, which trims the body.
                let message = Api::Upstream { status, body }.to_string();
                if transient {
                    Self::UpstreamUnavailable {
                        message,
                        status: Some(status),
                    }
                } else {
                    Self::Upstream { status, message }
                }
            }
            Api::Deserialization { message, body: _ } => Self::MalformedPayload { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err: CoreError = circuitstats_api::Error::Upstream {
            status: 503,
            body: "maintenance".into(),
        }
        .into();
        assert!(err.is_retryable());
        assert!(!err.aborts_request());
    }

    #[test]
    fn rate_limit_exhaustion_aborts_and_is_retryable() {
        let err: CoreError = circuitstats_api::Error::RateLimitExhausted { tokens: 3 }.into();
        assert!(matches!(err, CoreError::RateLimited { tokens: 3 }));
        assert!(err.aborts_request());
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_keep_status() {
        let err: CoreError = circuitstats_api::Error::Upstream {
            status: 404,
            body: "{}".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Upstream { status: 404, .. }));
        assert!(!err.is_retryable());
    }
}
