//! Metrics registry for the clima gateway.
//!
//! Counter/gauge/histogram families with dynamic labels backed by `DashMap`.
//! Label sets are flattened into sorted key vectors to keep deterministic
//! identity. Histogram buckets are fixed integers (microseconds or bytes) to
//! avoid floating point accumulation.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::recorder::MetricsRecorder;

type LabelKey = Vec<(String, String)>;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// `k1="v1",k2="v2"` without braces.
fn label_body(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// `{k="v"}` or nothing for an unlabeled series.
fn label_block(key: &[(String, String)]) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", label_body(key))
    }
}

fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Sorted snapshot so scrapes are stable across renders.
fn sorted<V, T>(map: &DashMap<LabelKey, V>, read: impl Fn(&V) -> T) -> Vec<(LabelKey, T)> {
    let mut rows: Vec<(LabelKey, T)> = map
        .iter()
        .map(|r| (r.key().clone(), read(r.value())))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "counter");
        for (key, val) in sorted(&self.map, |c| c.load(Ordering::Relaxed)) {
            let _ = writeln!(out, "{}{} {}", name, label_block(&key), val);
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "gauge");
        for (key, val) in sorted(&self.map, |g| g.load(Ordering::Relaxed)) {
            let _ = writeln!(out, "{}{} {}", name, label_block(&key), val);
        }
    }
}

/// Gauge holding an `f64` as raw bits.
#[derive(Default)]
pub struct FloatGaugeVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl FloatGaugeVec {
    pub fn set(&self, labels: &[(&str, &str)], v: f64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        gauge.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<f64> {
        self.map
            .get(&label_key(labels))
            .map(|g| f64::from_bits(g.load(Ordering::Relaxed)))
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "gauge");
        for (key, val) in sorted(&self.map, |g| f64::from_bits(g.load(Ordering::Relaxed))) {
            let _ = writeln!(out, "{}{} {}", name, label_block(&key), val);
        }
    }
}

// 100us .. 15s; the top bucket matches the upstream timeout.
pub const LATENCY_BUCKETS_MICROS: &[u64] = &[
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000, 5_000_000, 15_000_000,
];

pub const SIZE_BUCKETS_BYTES: &[u64] = &[32, 64, 128, 256, 512, 1_024, 4_096];

struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: Vec<AtomicU64>,
}

impl AtomicHistogram {
    fn new(len: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0),
            buckets: (0..len).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

pub struct HistogramVec {
    bounds: &'static [u64],
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl Default for HistogramVec {
    fn default() -> Self {
        Self::with_buckets(LATENCY_BUCKETS_MICROS)
    }
}

impl HistogramVec {
    pub fn with_buckets(bounds: &'static [u64]) -> Self {
        Self {
            bounds,
            map: DashMap::new(),
        }
    }

    /// Observe a duration on the microsecond scale.
    pub fn observe_duration(&self, labels: &[(&str, &str)], duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.observe(labels, micros);
    }

    /// Observe a raw value and increment cumulative buckets.
    pub fn observe(&self, labels: &[(&str, &str)], value: u64) {
        let bounds = self.bounds;
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicHistogram::new(bounds.len()));

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(value, Ordering::Relaxed);

        for (i, &b) in bounds.iter().enumerate() {
            if value <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "histogram");
        let mut keys: Vec<LabelKey> = self.map.iter().map(|r| r.key().clone()).collect();
        keys.sort();

        for key in keys {
            let Some(hist) = self.map.get(&key) else {
                continue;
            };
            let body = label_body(&key);
            let prefix = if body.is_empty() { String::new() } else { format!("{},", body) };

            for (i, &le) in self.bounds.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = hist.sum.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_sum{} {}", name, label_block(&key), sum);
            let _ = writeln!(out, "{}_count{} {}", name, label_block(&key), count);
        }
    }
}

/// Per-city query counts plus the running maximum, updated together.
#[derive(Default)]
struct CityTally {
    counts: HashMap<String, u64>,
    max: u64,
}

pub struct ClimaMetrics {
    pub requests: CounterVec,
    pub request_errors: CounterVec,
    pub request_duration: HistogramVec, // In Microseconds
    pub cache_hits: CounterVec,
    pub cache_misses: CounterVec,
    pub upstream_duration: HistogramVec, // In Microseconds
    pub city_temperature: FloatGaugeVec,
    pub city_queries_max: GaugeVec,
    pub response_size: HistogramVec, // In Bytes
    city_tally: Mutex<CityTally>,
}

impl Default for ClimaMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ClimaMetrics {
    pub fn new() -> Self {
        let m = Self {
            requests: CounterVec::default(),
            request_errors: CounterVec::default(),
            request_duration: HistogramVec::with_buckets(LATENCY_BUCKETS_MICROS),
            cache_hits: CounterVec::default(),
            cache_misses: CounterVec::default(),
            upstream_duration: HistogramVec::with_buckets(LATENCY_BUCKETS_MICROS),
            city_temperature: FloatGaugeVec::default(),
            city_queries_max: GaugeVec::default(),
            response_size: HistogramVec::with_buckets(SIZE_BUCKETS_BYTES),
            city_tally: Mutex::new(CityTally::default()),
        };
        // unlabeled series are exported as 0 before the first event
        m.cache_hits.add(&[], 0);
        m.cache_misses.add(&[], 0);
        m.city_queries_max.set(&[], 0);
        m
    }

    /// Queries seen so far for `city`.
    pub fn city_queries(&self, city: &str) -> u64 {
        self.city_tally.lock().counts.get(city).copied().unwrap_or(0)
    }

    /// Highest per-city query count.
    pub fn max_city_queries(&self) -> u64 {
        self.city_tally.lock().max
    }

    /// Render every family in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.requests.render(
            "clima_requests_total",
            "Requests received by endpoint and method.",
            &mut out,
        );
        self.request_errors.render(
            "clima_request_errors_total",
            "Failed requests by endpoint and error type.",
            &mut out,
        );
        self.request_duration.render(
            "clima_request_duration_micros",
            "End-to-end request latency in microseconds.",
            &mut out,
        );
        self.cache_hits.render(
            "clima_cache_hits_total",
            "Lookups answered from the temperature cache.",
            &mut out,
        );
        self.cache_misses.render(
            "clima_cache_misses_total",
            "Lookups that required an upstream call.",
            &mut out,
        );
        self.upstream_duration.render(
            "clima_upstream_duration_micros",
            "Upstream weather API latency in microseconds.",
            &mut out,
        );
        self.city_temperature.render(
            "clima_city_temperature_celsius",
            "Last temperature served per city.",
            &mut out,
        );
        self.render_city_queries(&mut out);
        self.city_queries_max.render(
            "clima_city_queries_max",
            "Query count of the most requested city.",
            &mut out,
        );
        self.response_size.render(
            "clima_response_size_bytes",
            "Size of successful response bodies in bytes.",
            &mut out,
        );
        out
    }

    fn render_city_queries(&self, out: &mut String) {
        let name = "clima_city_queries_total";
        header(out, name, "Queries received per city.", "counter");

        let mut rows: Vec<(String, u64)> = {
            let tally = self.city_tally.lock();
            tally.counts.iter().map(|(k, v)| (k.clone(), *v)).collect()
        };
        rows.sort();
        for (city, count) in rows {
            let _ = writeln!(out, "{}{{city=\"{}\"}} {}", name, escape_label(&city), count);
        }
    }
}

impl MetricsRecorder for ClimaMetrics {
    fn request(&self, endpoint: &str, method: &str) {
        self.requests.inc(&[("endpoint", endpoint), ("method", method)]);
    }

    fn request_error(&self, endpoint: &str, error_type: &str) {
        self.request_errors
            .inc(&[("endpoint", endpoint), ("error_type", error_type)]);
    }

    fn request_latency(&self, endpoint: &str, elapsed: Duration) {
        self.request_duration
            .observe_duration(&[("endpoint", endpoint)], elapsed);
    }

    fn cache_hit(&self) {
        self.cache_hits.inc(&[]);
    }

    fn cache_miss(&self) {
        self.cache_misses.inc(&[]);
    }

    fn upstream_latency(&self, elapsed: Duration) {
        self.upstream_duration.observe_duration(&[], elapsed);
    }

    fn city_temperature(&self, city: &str, celsius: f64) {
        self.city_temperature.set(&[("city", city)], celsius);
    }

    fn city_query(&self, city: &str) {
        let mut tally = self.city_tally.lock();
        let count = {
            let c = tally.counts.entry(city.to_string()).or_insert(0);
            *c += 1;
            *c
        };
        if count > tally.max {
            tally.max = count;
        }
        self.city_queries_max
            .set(&[], i64::try_from(tally.max).unwrap_or(i64::MAX));
    }

    fn payload_size(&self, bytes: usize) {
        self.response_size
            .observe(&[], u64::try_from(bytes).unwrap_or(u64::MAX));
    }
}
