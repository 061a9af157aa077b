use std::time::Duration;

/// Observation sink used by the request pipeline and the upstream client.
pub trait MetricsRecorder: Send + Sync {
    fn request(&self, endpoint: &str, method: &str);
    fn request_error(&self, endpoint: &str, error_type: &str);
    fn request_latency(&self, endpoint: &str, elapsed: Duration);
    fn cache_hit(&self);
    fn cache_miss(&self);
    fn upstream_latency(&self, elapsed: Duration);
    /// Last temperature served for `city`.
    fn city_temperature(&self, city: &str, celsius: f64);
    /// Count one query for `city` and refresh the most-queried gauge.
    fn city_query(&self, city: &str);
    fn payload_size(&self, bytes: usize);
}

/// Discards every observation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl MetricsRecorder for NoopRecorder {
    fn request(&self, _endpoint: &str, _method: &str) {}
    fn request_error(&self, _endpoint: &str, _error_type: &str) {}
    fn request_latency(&self, _endpoint: &str, _elapsed: Duration) {}
    fn cache_hit(&self) {}
    fn cache_miss(&self) {}
    fn upstream_latency(&self, _elapsed: Duration) {}
    fn city_temperature(&self, _city: &str, _celsius: f64) {}
    fn city_query(&self, _city: &str) {}
    fn payload_size(&self, _bytes: usize) {}
}
