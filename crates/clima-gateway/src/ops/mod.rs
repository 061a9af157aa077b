//! Operational HTTP endpoints.
//!
//! - `/`        : landing page
//! - `/health`  : liveness with a UTC timestamp
//! - `/metrics` : Prometheus text format

use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::app_state::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

fn observed<R>(state: &AppState, endpoint: &str, f: impl FnOnce() -> R) -> R {
    let started = Instant::now();
    let recorder = state.recorder();
    recorder.request(endpoint, "GET");
    let out = f();
    recorder.request_latency(endpoint, started.elapsed());
    out
}

pub async fn index(State(state): State<AppState>) -> Html<&'static str> {
    observed(&state, "/", || Html(INDEX_HTML))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    observed(&state, "/health", || {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        (StatusCode::OK, Json(json!({ "status": "ok", "timestamp": timestamp })))
    })
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    // the scrape itself is counted before rendering so it shows up in its own body
    observed(&state, "/metrics", || {
        let body = state.metrics().render();
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response()
    })
}
