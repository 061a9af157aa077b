//! Shared application state for the clima gateway.
//!
//! Owns the metrics registry, the temperature cache, and the `/clima`
//! pipeline. Startup errors are returned as `Result` rather than panicking.

use std::sync::Arc;
use std::time::Duration;

use clima_core::error::Result;

use crate::cache::TtlCache;
use crate::config::ClimaConfig;
use crate::obs::{ClimaMetrics, MetricsRecorder};
use crate::services::WeatherService;
use crate::upstream::{OpenWeatherClient, WeatherSource};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ClimaConfig,
    metrics: Arc<ClimaMetrics>,
    cache: Arc<TtlCache>,
    weather: WeatherService,
}

impl AppState {
    /// Build application state backed by the real upstream client.
    pub fn new(cfg: ClimaConfig) -> Result<Self> {
        let metrics = Arc::new(ClimaMetrics::new());

        if cfg.upstream.api_key.is_empty() {
            tracing::warn!("upstream api key is empty; lookups will be rejected upstream");
        }

        let client = OpenWeatherClient::new(&cfg.upstream, metrics.clone())?;
        Ok(Self::with_source(cfg, Arc::new(client), metrics))
    }

    /// Build application state around any weather source (tests, fakes).
    pub fn with_source(
        cfg: ClimaConfig,
        source: Arc<dyn WeatherSource>,
        metrics: Arc<ClimaMetrics>,
    ) -> Self {
        let cache = Arc::new(TtlCache::new(Duration::from_secs(cfg.cache.ttl_secs)));
        let weather = WeatherService::new(cache.clone(), source, metrics.clone());

        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                metrics,
                cache,
                weather,
            }),
        }
    }

    pub fn cfg(&self) -> &ClimaConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &ClimaMetrics {
        &self.inner.metrics
    }

    pub fn recorder(&self) -> &dyn MetricsRecorder {
        self.inner.metrics.as_ref()
    }

    pub fn cache(&self) -> &TtlCache {
        &self.inner.cache
    }

    pub fn weather(&self) -> &WeatherService {
        &self.inner.weather
    }
}
