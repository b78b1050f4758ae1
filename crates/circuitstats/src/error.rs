//! Error types for the dashboard binary.
//!
//! [`ApiError`] turns a `CoreError` into a JSON HTTP response; [`AppError`]
//! covers startup failures and is rendered with miette.

use std::net::SocketAddr;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use circuitstats_config::ConfigError;
use circuitstats_core::CoreError;

/// Seconds clients should wait after every token was rate limited.
const RETRY_AFTER_SECS: &str = "60";

// ── HTTP errors ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    retryable: bool,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CoreError::AuthenticationFailed { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| *s == StatusCode::UNAUTHORIZED || *s == StatusCode::FORBIDDEN)
                .unwrap_or(StatusCode::UNAUTHORIZED),
            CoreError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::Upstream { status: 404, .. } | CoreError::NotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            CoreError::UpstreamUnavailable { .. }
            | CoreError::Upstream { .. }
            | CoreError::MalformedPayload { .. } => StatusCode::BAD_GATEWAY,
            CoreError::Validation { .. } => StatusCode::BAD_REQUEST,
            CoreError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.0.to_string(),
            retryable: self.0.is_retryable(),
        };
        let mut response = (status, Json(body)).into_response();
        if matches!(self.0, CoreError::RateLimited { .. }) {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        response
    }
}

// ── Startup errors ───────────────────────────────────────────────────

#[derive(Debug, Error, Diagnostic)]
pub enum AppError {
    #[error(transparent)]
    #[diagnostic(
        code(circuitstats::config),
        help(
            "Set MIST_APITOKEN (comma-separated for several tokens) and optionally\n\
             MIST_ORG_ID / MIST_HOST, or put them in the config file."
        )
    )]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(circuitstats::mist))]
    Core(#[from] CoreError),

    #[error("could not listen on {addr}")]
    #[diagnostic(
        code(circuitstats::bind),
        help("Pick another port with --port or PORT, or another address with --bind.")
    )]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server failure")]
    #[diagnostic(code(circuitstats::serve))]
    Serve(#[source] std::io::Error),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Core(CoreError::AuthenticationFailed { .. }) => 3,
            Self::Core(_) => 1,
            Self::Bind { .. } | Self::Serve(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_keeps_upstream_status() {
        let err = ApiError(CoreError::AuthenticationFailed {
            status: 403,
            message: "forbidden".into(),
        });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (CoreError::RateLimited { tokens: 2 }, StatusCode::SERVICE_UNAVAILABLE),
            (
                CoreError::UpstreamUnavailable {
                    message: "timeout".into(),
                    status: None,
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                CoreError::NotFound {
                    entity_type: "gateway",
                    identifier: "x".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::Validation {
                    message: "bad".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::Config {
                    message: "set MIST_ORG_ID".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn rate_limit_sets_retry_after() {
        let response = ApiError(CoreError::RateLimited { tokens: 1 }).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from_static("60"))
        );
    }
}
