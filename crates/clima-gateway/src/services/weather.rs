//! `/clima` pipeline: validate -> cache -> upstream -> cache fill -> respond.
//!
//! Every path, including failures, records the request count, the error type
//! when there is one, and the end-to-end latency before the reply is built.

use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use clima_core::error::{ClimaError, Result};
use clima_core::weather::{celsius, normalize_city, ClimaPayload};

use crate::cache::TtlCache;
use crate::obs::MetricsRecorder;
use crate::upstream::WeatherSource;

pub const CLIMA_ENDPOINT: &str = "/clima";

/// Serialized JSON reply with its status.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Reply {
    fn error(err: &ClimaError) -> Self {
        let kind = err.kind();
        Self {
            status: StatusCode::from_u16(kind.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: json!({ "error": kind.public_message() }).to_string().into_bytes(),
        }
    }

    /// Decode the body; used by tests and logging.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

pub struct WeatherService {
    cache: Arc<TtlCache>,
    source: Arc<dyn WeatherSource>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl WeatherService {
    pub fn new(
        cache: Arc<TtlCache>,
        source: Arc<dyn WeatherSource>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            cache,
            source,
            metrics,
        }
    }

    /// Handle one `/clima` request. Never fails: errors become JSON replies.
    pub async fn lookup(&self, ciudad: Option<&str>) -> Reply {
        let started = Instant::now();
        self.metrics.request(CLIMA_ENDPOINT, "GET");

        let reply = match self.resolve(ciudad).await.and_then(|p| self.encode(&p)) {
            Ok(body) => {
                self.metrics.payload_size(body.len());
                Reply {
                    status: StatusCode::OK,
                    body,
                }
            }
            Err(err) => {
                self.metrics.request_error(CLIMA_ENDPOINT, err.kind().as_str());
                if matches!(err, ClimaError::Internal(_)) {
                    tracing::error!(error = %err, "clima request failed");
                }
                Reply::error(&err)
            }
        };

        self.metrics.request_latency(CLIMA_ENDPOINT, started.elapsed());
        reply
    }

    async fn resolve(&self, ciudad: Option<&str>) -> Result<ClimaPayload> {
        let requested = ciudad
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(ClimaError::MissingCity)?;
        let key = normalize_city(requested);

        if let Some(temp) = self.cache.get(&key) {
            tracing::debug!(city = %key, "cache hit");
            self.metrics.cache_hit();
            self.record_city(&key, celsius(&temp));
            return Ok(ClimaPayload::cached(requested, temp));
        }

        tracing::debug!(city = %key, "cache miss");
        self.metrics.cache_miss();

        let reading = self.source.fetch(requested).await?;

        self.cache.set(&key, reading.temperature.clone());
        self.record_city(&key, reading.celsius());
        Ok(ClimaPayload::fresh(reading))
    }

    fn record_city(&self, key: &str, temp: f64) {
        self.metrics.city_temperature(key, temp);
        self.metrics.city_query(key);
    }

    fn encode(&self, payload: &ClimaPayload) -> Result<Vec<u8>> {
        serde_json::to_vec(payload)
            .map_err(|e| ClimaError::Internal(format!("encode response failed: {e}")))
    }
}
