//! Axum router wiring.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops::index))
        .route("/health", get(ops::health))
        .route("/clima", get(transport::http::clima))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
