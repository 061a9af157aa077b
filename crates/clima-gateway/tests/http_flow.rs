#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use clima_core::weather::WeatherReading;
use clima_core::FetchError;
use clima_gateway::app_state::AppState;
use clima_gateway::config::ClimaConfig;
use clima_gateway::obs::ClimaMetrics;
use clima_gateway::router::build_router;
use clima_gateway::upstream::WeatherSource;

/// Fake upstream returning a fixed outcome and counting calls.
struct FixedSource {
    outcome: Result<WeatherReading, FetchError>,
    calls: AtomicUsize,
}

#[async_trait]
impl WeatherSource for FixedSource {
    async fn fetch(&self, _city: &str) -> Result<WeatherReading, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

fn buenos_aires() -> WeatherReading {
    WeatherReading {
        canonical_name: "Buenos Aires".into(),
        temperature: serde_json::Number::from(22),
        description: "cielo despejado".into(),
    }
}

fn state_with(
    cfg: ClimaConfig,
    outcome: Result<WeatherReading, FetchError>,
) -> (AppState, Arc<FixedSource>, Arc<ClimaMetrics>) {
    let source = Arc::new(FixedSource {
        outcome,
        calls: AtomicUsize::new(0),
    });
    let metrics = Arc::new(ClimaMetrics::new());
    let state = AppState::with_source(cfg, source.clone(), metrics.clone());
    (state, source, metrics)
}

fn app_with(
    outcome: Result<WeatherReading, FetchError>,
) -> (Router, Arc<FixedSource>, Arc<ClimaMetrics>) {
    let (state, source, metrics) = state_with(ClimaConfig::default(), outcome);
    (build_router(state), source, metrics)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn fresh_lookup_returns_full_reading() {
    let (app, _, _) = app_with(Ok(buenos_aires()));

    let (status, body) = get(&app, "/clima?ciudad=Buenos%20Aires").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"ciudad":"Buenos Aires","temp":22,"descripcion":"cielo despejado","cached":false}"#
    );
}

#[tokio::test]
async fn repeat_lookup_for_same_city_is_cached() {
    let (app, source, metrics) = app_with(Ok(buenos_aires()));

    get_json(&app, "/clima?ciudad=Buenos%20Aires").await;
    let (status, body) = get_json(&app, "/clima?ciudad=%20buenos%20AIRES%20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached"], true);
    assert_eq!(body["temp"], 22);
    assert!(body.get("descripcion").is_none());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(metrics.city_queries("buenos aires"), 2);
}

#[tokio::test]
async fn missing_city_is_400_regardless_of_state() {
    let (app, source, _) = app_with(Ok(buenos_aires()));
    get_json(&app, "/clima?ciudad=Lima").await;

    for uri in ["/clima", "/clima?ciudad=", "/clima?ciudad=%20%20", "/clima?other=1"] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Debe ingresar una ciudad");
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transport_failure_is_502() {
    let (app, _, metrics) = app_with(Err(FetchError::Connection("connection refused".into())));

    let (status, body) = get_json(&app, "/clima?ciudad=Lima").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "No se pudo conectar con el servicio de clima");

    let labels = [("endpoint", "/clima"), ("error_type", "connection_error")];
    assert_eq!(metrics.request_errors.get(&labels), 1);
}

#[tokio::test]
async fn bad_payload_is_502_with_its_own_message() {
    let (app, _, _) = app_with(Err(FetchError::BadPayload("expected value".into())));

    let (status, body) = get_json(&app, "/clima?ciudad=Lima").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Respuesta inválida del servicio de clima");
}

#[tokio::test]
async fn unknown_city_is_404() {
    let (app, _, metrics) = app_with(Err(FetchError::NotFound { status: 404 }));

    let (status, body) = get_json(&app, "/clima?ciudad=Desconocida").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Ciudad no encontrada");
    assert_eq!(metrics.cache_misses.get(&[]), 1);
    assert_eq!(metrics.request_duration.count(&[("endpoint", "/clima")]), 1);
}

#[tokio::test]
async fn health_reports_ok_with_timestamp() {
    let (app, _, _) = app_with(Ok(buenos_aires()));

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let ts = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok(), "bad timestamp: {ts}");
}

#[tokio::test]
async fn metrics_exposes_help_and_type_lines() {
    let (app, _, _) = app_with(Ok(buenos_aires()));
    get_json(&app, "/clima?ciudad=Buenos%20Aires").await;
    get_json(&app, "/clima?ciudad=Buenos%20Aires").await;

    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ctype = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(ctype.starts_with("text/plain"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("# HELP clima_requests_total"));
    assert!(text.contains("# TYPE clima_requests_total counter"));
    assert!(text.contains("clima_cache_hits_total 1\n"));
    assert!(text.contains("clima_cache_misses_total 1\n"));
    assert!(text.contains("clima_city_queries_total{city=\"buenos aires\"} 2"));
    assert!(text.contains("clima_city_queries_max 2\n"));
    assert!(text.contains("clima_city_temperature_celsius{city=\"buenos aires\"} 22"));
    assert!(text.contains("clima_requests_total{endpoint=\"/metrics\",method=\"GET\"} 1"));
}

#[tokio::test]
async fn index_serves_html() {
    let (app, _, _) = app_with(Ok(buenos_aires()));
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<form"));
}

#[tokio::test]
async fn cache_ttl_comes_from_config() {
    let mut cfg = ClimaConfig::default();
    cfg.cache.ttl_secs = 90;
    let (state, _, _) = state_with(cfg, Ok(buenos_aires()));

    assert_eq!(state.cfg().cache.ttl_secs, 90);
    assert_eq!(state.cache().ttl(), std::time::Duration::from_secs(90));
    assert!(state.cache().is_empty());

    let app = build_router(state.clone());
    get_json(&app, "/clima?ciudad=Buenos%20Aires").await;
    assert_eq!(state.cache().len(), 1);
    assert_eq!(state.cache().get("buenos aires"), Some(serde_json::Number::from(22)));
}
