use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use clima_core::error::{ClimaError, FetchError, Result};
use clima_core::weather::{UpstreamWeather, WeatherReading};

use crate::config::UpstreamSection;
use crate::obs::MetricsRecorder;

/// Current-conditions lookup by city name. One attempt, no retries.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, city: &str) -> std::result::Result<WeatherReading, FetchError>;
}

/// OpenWeatherMap "current weather" client.
pub struct OpenWeatherClient {
    http: Client,
    endpoint: String,
    api_key: String,
    units: String,
    lang: String,
    metrics: Arc<dyn MetricsRecorder>,
}

impl OpenWeatherClient {
    pub fn new(cfg: &UpstreamSection, metrics: Arc<dyn MetricsRecorder>) -> Result<Self> {
        Self::with_timeout(cfg, Duration::from_secs(cfg.timeout_secs), metrics)
    }

    /// Same as `new` with an explicit request timeout.
    pub fn with_timeout(
        cfg: &UpstreamSection,
        timeout: Duration,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClimaError::Config(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            endpoint: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            units: cfg.units.clone(),
            lang: cfg.lang.clone(),
            metrics,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch(&self, city: &str) -> std::result::Result<WeatherReading, FetchError> {
        let started = Instant::now();

        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%city, timeout = e.is_timeout(), error = %e, "upstream request failed");
                FetchError::Connection(e.to_string())
            })?;

        let status = resp.status();
        let body = resp.bytes().await;
        self.metrics.upstream_latency(started.elapsed());

        let body = body.map_err(|e| {
            tracing::warn!(%city, error = %e, "upstream body read failed");
            FetchError::Connection(e.to_string())
        })?;

        // classification order: unparseable body, then status, then shape
        let doc: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(%city, status = status.as_u16(), error = %e, "upstream body is not json");
            FetchError::BadPayload(e.to_string())
        })?;

        if status != StatusCode::OK {
            tracing::info!(%city, status = status.as_u16(), "upstream reported city not found");
            return Err(FetchError::NotFound {
                status: status.as_u16(),
            });
        }

        UpstreamWeather::from_value(doc)
            .and_then(UpstreamWeather::into_reading)
            .inspect_err(|e| {
                tracing::warn!(%city, error = %e, "upstream payload has unexpected shape");
            })
    }
}
