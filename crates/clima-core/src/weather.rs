//! Weather data model: upstream wire shape, normalized reading, and the
//! JSON body served by `/clima`.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::FetchError;

/// Cache and metric key for a city: trimmed and lowercased.
pub fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Current conditions for one city, as reported upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    /// City name as spelled by the provider.
    pub canonical_name: String,
    /// Degrees Celsius, kept in the provider's JSON form (`22` stays `22`).
    pub temperature: Number,
    /// Localized, human readable description.
    pub description: String,
}

impl WeatherReading {
    /// Temperature as a float, for gauges.
    pub fn celsius(&self) -> f64 {
        celsius(&self.temperature)
    }
}

/// Float view of a JSON temperature.
pub fn celsius(temp: &Number) -> f64 {
    temp.as_f64().unwrap_or(f64::NAN)
}

/// Subset of the OpenWeatherMap "current weather" document we depend on.
#[derive(Debug, Deserialize)]
pub struct UpstreamWeather {
    pub name: String,
    pub main: UpstreamMain,
    #[serde(default)]
    pub weather: Vec<UpstreamCondition>,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamMain {
    pub temp: Number,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamCondition {
    pub description: String,
}

impl UpstreamWeather {
    /// Parse an already-decoded JSON document.
    pub fn from_value(v: serde_json::Value) -> Result<Self, FetchError> {
        serde_json::from_value(v).map_err(|e| FetchError::BadPayload(e.to_string()))
    }

    /// Flatten into a reading. The first condition entry carries the description.
    pub fn into_reading(self) -> Result<WeatherReading, FetchError> {
        let description = self
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| FetchError::BadPayload("weather list is empty".into()))?;

        Ok(WeatherReading {
            canonical_name: self.name,
            temperature: self.main.temp,
            description,
        })
    }
}

/// Successful `/clima` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimaPayload {
    pub ciudad: String,
    pub temp: Number,
    /// Only the temperature is cached, so hits carry no description.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub descripcion: Option<String>,
    pub cached: bool,
}

impl ClimaPayload {
    /// Body for a fresh upstream reading.
    pub fn fresh(reading: WeatherReading) -> Self {
        Self {
            ciudad: reading.canonical_name,
            temp: reading.temperature,
            descripcion: Some(reading.description),
            cached: false,
        }
    }

    /// Body for a cache hit. `city` is the caller's (trimmed) spelling.
    pub fn cached(city: &str, temp: Number) -> Self {
        Self {
            ciudad: city.to_string(),
            temp,
            descripcion: None,
            cached: true,
        }
    }
}
