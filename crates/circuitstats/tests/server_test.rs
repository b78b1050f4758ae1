#![allow(clippy::unwrap_used)]
// HTTP tests for the dashboard router, driven with `tower::ServiceExt`.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::Router;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use circuitstats::{AppState, build_router};
use circuitstats_api::{MistClient, TokenRotator, TransportConfig};
use circuitstats_core::{FixedClock, StatsService};

const NOW: i64 = 1_700_000_000;

// ── Helpers ─────────────────────────────────────────────────────────

fn router_for(host: &str, tokens: &[&str], org_id: Option<&str>) -> Router {
    let rotator = TokenRotator::new(
        tokens
            .iter()
            .map(|t| SecretString::from((*t).to_owned()))
            .collect(),
    )
    .unwrap();
    let client = MistClient::new(host, rotator, &TransportConfig::default()).unwrap();
    let service = StatsService::with_client(
        client,
        org_id.map(str::to_owned),
        Arc::new(FixedClock(NOW)),
    );
    build_router(AppState::new(service))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

async fn mount_gateway(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/stats/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "gw-1",
            "mac": "aabbcc001122",
            "name": "edge-1",
            "site_id": "site-1",
            "port_stat": { "ge-0/0/1": { "up": true, "rx_bytes": 5 } }
        }])))
        .mount(server)
        .await;
}

// ── Health / index ──────────────────────────────────────────────────

#[tokio::test]
async fn test_health_without_reachable_upstream() {
    // Nothing listens on port 9; the health route must not care.
    let app = router_for("http://127.0.0.1:9", &["alpha"], None);

    let (status, _, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_index_serves_html() {
    let app = router_for("http://127.0.0.1:9", &["alpha"], None);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

// ── Envelope / error mapping ────────────────────────────────────────

#[tokio::test]
async fn test_sites_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "site-1", "name": "HQ", "timezone": "America/Denver", "num_devices": 4 }
        ])))
        .mount(&server)
        .await;
    let app = router_for(&server.uri(), &["alpha"], Some("org-1"));

    let (status, _, body) = get(&app, "/api/sites").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": [{
                "id": "site-1",
                "name": "HQ",
                "address": "",
                "timezone": "America/Denver",
                "num_devices": 4
            }]
        })
    );
}

#[tokio::test]
async fn test_upstream_401_maps_to_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "bad token" })))
        .mount(&server)
        .await;
    let app = router_for(&server.uri(), &["alpha"], Some("org-1"));

    let (status, _, body) = get(&app, "/api/organization").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["retryable"], false);
    assert!(body["error"].as_str().unwrap().contains("bad token"));
}

#[tokio::test]
async fn test_rate_limit_exhaustion_maps_to_503() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/sites"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;
    let app = router_for(&server.uri(), &["alpha", "bravo"], Some("org-1"));

    let (status, headers, body) = get(&app, "/api/sites").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(headers.contains_key(header::RETRY_AFTER));
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_ambiguous_org_maps_to_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "privileges": [{ "org_id": "org-1" }, { "org_id": "org-2" }]
        })))
        .mount(&server)
        .await;
    let app = router_for(&server.uri(), &["alpha"], None);

    let (status, _, body) = get(&app, "/api/gateways?duration=1h").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("MIST_ORG_ID"));
}

// ── Gateway routes ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_gateway_is_404() {
    let server = MockServer::start().await;
    mount_gateway(&server).await;
    let app = router_for(&server.uri(), &["alpha"], Some("org-1"));

    let (status, _, body) = get(&app, "/api/gateway/gw-9/ports").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _, body) = get(&app, "/api/gateway/gw-1/ports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ports"]["ge-0/0/1"]["rx_bytes"], 5);
}

#[tokio::test]
async fn test_port_traffic_raw_and_encoded_ids_agree() {
    let server = MockServer::start().await;
    mount_gateway(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sites/site-1/insights/gateway/gw-1/stats"))
        .and(query_param("port_id", "ge-0/0/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rx_bps": [100, 200],
            "tx_bps": [50, null, 25]
        })))
        .mount(&server)
        .await;
    let app = router_for(&server.uri(), &["alpha"], Some("org-1"));

    let (status, _, raw) = get(&app, "/api/gateway/gw-1/port/ge-0/0/1/traffic?duration=1h").await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, encoded) = get(&app, "/api/gateway/gw-1/port/ge-0%2F0%2F1/traffic?duration=1h").await;
    assert_eq!(raw, encoded);

    let data = &raw["data"];
    assert_eq!(data["port_id"], "ge-0/0/1");
    assert_eq!(data["site_id"], "site-1");
    assert_eq!(data["timeframe"], "1h");
    assert_eq!(data["interval"], 180);
    assert_eq!(data["timestamps"].as_array().unwrap().len(), 20);
    assert_eq!(data["rx_bps"].as_array().unwrap().len(), 20);
    assert_eq!(data["tx_bps"][1], 0.0);
    assert_eq!(data["totals"]["tx_buckets"], 2);
}

#[tokio::test]
async fn test_port_route_without_traffic_suffix_is_404() {
    let app = router_for("http://127.0.0.1:9", &["alpha"], Some("org-1"));
    let (status, _, _) = get(&app, "/api/gateway/gw-1/port/ge-0/0/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
