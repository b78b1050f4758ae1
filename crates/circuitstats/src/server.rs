//! HTTP layer: routes, handlers, and request logging.
//!
//! Every `/api` response uses the same envelope: `{"success": true,
//! "data": ...}` on success, `{"success": false, "error": ..., "retryable":
//! ...}` on failure.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::{Html, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use circuitstats_core::{
    CoreError, GatewayPorts, GatewaySummary, Organization, OrganizationRef, PortTraffic, Site,
    StatsService, Timeframe,
};

use crate::error::ApiError;

const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StatsService>,
}

impl AppState {
    pub fn new(service: StatsService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        success: true,
        data,
    }))
}

// ── Router ──────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/organization", get(organization))
        .route("/api/organizations", get(organizations))
        .route("/api/sites", get(sites))
        .route("/api/gateways", get(gateways))
        .route("/api/gateway/:gateway_id/ports", get(gateway_ports))
        // Port ids contain slashes (`ge-0/0/1`), so the rest of the path is
        // captured whole and split in the handler.
        .route("/api/gateway/:gateway_id/port/*rest", get(port_traffic))
        .with_state(state)
        .layer(middleware::from_fn(log_request))
}

async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    if path == "/health" {
        debug!(%method, %path, status, elapsed_ms, "request");
    } else {
        info!(%method, %path, status, elapsed_ms, "request");
    }
    response
}

/// Resolve once SIGINT or SIGTERM arrives.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

// ── Handlers ────────────────────────────────────────────────────────

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

async fn organization(State(state): State<AppState>) -> ApiResult<Organization> {
    ok(state.service.organization().await?)
}

async fn organizations(State(state): State<AppState>) -> ApiResult<Vec<OrganizationRef>> {
    ok(state.service.organizations().await?)
}

async fn sites(State(state): State<AppState>) -> ApiResult<Vec<Site>> {
    ok(state.service.sites().await?)
}

#[derive(Debug, Default, Deserialize)]
struct WindowParams {
    duration: Option<String>,
    site_id: Option<String>,
}

impl WindowParams {
    fn timeframe(&self) -> Timeframe {
        Timeframe::from_query(self.duration.as_deref())
    }

    fn site_id(&self) -> Option<&str> {
        self.site_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

async fn gateways(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Vec<GatewaySummary>> {
    let timeframe = params.timeframe();
    info!(%timeframe, site_id = ?params.site_id(), "gateway overview");
    ok(state
        .service
        .gateway_overview(timeframe, params.site_id())
        .await?)
}

async fn gateway_ports(
    State(state): State<AppState>,
    Path(gateway_id): Path<String>,
) -> ApiResult<GatewayPorts> {
    ok(state.service.gateway_ports(&gateway_id).await?)
}

async fn port_traffic(
    State(state): State<AppState>,
    Path((gateway_id, rest)): Path<(String, String)>,
    Query(params): Query<WindowParams>,
) -> ApiResult<PortTraffic> {
    let port_id = traffic_port_id(&rest).ok_or_else(|| CoreError::NotFound {
        entity_type: "route",
        identifier: format!("/api/gateway/{gateway_id}/port/{rest}"),
    })?;
    ok(state
        .service
        .port_traffic(&gateway_id, port_id, params.timeframe(), params.site_id())
        .await?)
}

/// The port id out of `<port_id>/traffic`. The path extractor has already
/// percent-decoded it, so `ge-0%2F0%2F1` and `ge-0/0/1` arrive alike.
fn traffic_port_id(rest: &str) -> Option<&str> {
    rest.trim_start_matches('/')
        .strip_suffix("/traffic")
        .filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traffic_port_id_forms() {
        assert_eq!(traffic_port_id("ge-0/0/1/traffic"), Some("ge-0/0/1"));
        assert_eq!(traffic_port_id("/ge-0/0/1/traffic"), Some("ge-0/0/1"));
        assert_eq!(traffic_port_id("wan/traffic"), Some("wan"));
        assert_eq!(traffic_port_id("/traffic"), None);
        assert_eq!(traffic_port_id("ge-0/0/1"), None);
    }
}
