//! Temperature cache keyed by normalized city name.
//!
//! Entries are never swept in the background: a stale entry is purged by the
//! lookup that finds it. Lookup-and-expire runs under a single lock so two
//! concurrent requests cannot disagree on hit/miss for the same instant.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Number;

#[derive(Debug, Clone)]
struct CacheEntry {
    temperature: Number,
    recorded_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached temperature if the entry is at most `ttl` old.
    pub fn get(&self, city_key: &str) -> Option<Number> {
        self.get_at(city_key, Instant::now())
    }

    /// Overwrite the entry for `city_key`, stamped now.
    pub fn set(&self, city_key: &str, temperature: Number) {
        self.set_at(city_key, temperature, Instant::now());
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, city_key: &str, now: Instant) -> Option<Number> {
        let mut entries = self.entries.lock();
        let entry = entries.get(city_key)?;

        let age = now.saturating_duration_since(entry.recorded_at);
        if age <= self.ttl {
            return Some(entry.temperature.clone());
        }

        entries.remove(city_key);
        let age_ms = u64::try_from(age.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(city = %city_key, age_ms, "cache entry expired");
        None
    }

    fn set_at(&self, city_key: &str, temperature: Number, now: Instant) {
        self.entries.lock().insert(
            city_key.to_string(),
            CacheEntry {
                temperature,
                recorded_at: now,
            },
        );
    }
}
