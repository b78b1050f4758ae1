use thiserror::Error;

/// Top-level error type for the `circuitstats-api` crate.
///
/// Covers every failure mode of a Mist API call: credential problems,
/// rate limiting, transport, non-success statuses, and payload decoding.
/// `circuitstats-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Credentials ─────────────────────────────────────────────────
    /// No API tokens were supplied to the rotator.
    #[error("No Mist API tokens configured")]
    NoCredentials,

    /// A configured token cannot be encoded as an HTTP header value.
    #[error("API token #{index} contains characters not allowed in an HTTP header")]
    InvalidToken { index: usize },

    /// The API rejected the token (HTTP 401) or lacks privileges (HTTP 403).
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    // ── Rate limiting ───────────────────────────────────────────────
    /// Every configured token answered HTTP 429 within one request.
    #[error("All {tokens} API token(s) are rate limited")]
    RateLimitExhausted { tokens: usize },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for API paths: {url}")]
    InvalidBaseUrl { url: String },

    /// Building the underlying HTTP client failed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Upstream ────────────────────────────────────────────────────
    /// Any other non-success HTTP status, with the raw body for diagnostics.
    #[error("Mist API error (HTTP {status}): {}", preview(.body))]
    Upstream { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the same request could succeed later without
    /// any configuration change.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::RateLimitExhausted { .. } => true,
            Self::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The upstream HTTP status, when the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Upstream { status, .. } => Some(*status),
            Self::RateLimitExhausted { .. } => Some(429),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// First 200 bytes of a response body, cut on a char boundary.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
