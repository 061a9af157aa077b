use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClimaQuery {
    pub ciudad: Option<String>,
}

/// `GET /clima?ciudad=...`
///
/// An undecodable query string is treated like a missing city so the caller
/// still gets the pipeline's 400 body and metrics.
pub async fn clima(State(app): State<AppState>, q: Option<Query<ClimaQuery>>) -> Response {
    let ciudad = q.and_then(|Query(q)| q.ciudad);
    app.weather().lookup(ciudad.as_deref()).await.into_response()
}
