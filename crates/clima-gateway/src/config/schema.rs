use std::net::SocketAddr;

use serde::Deserialize;
use clima_core::error::{ClimaError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimaConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub cache: CacheSection,
}

impl Default for ClimaConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerSection::default(),
            upstream: UpstreamSection::default(),
            cache: CacheSection::default(),
        }
    }
}

impl ClimaConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ClimaError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.upstream.validate()?;
        self.cache.validate()?;

        Ok(())
    }

    /// Apply overrides from `WEATHER_API_KEY`, `CACHE_TTL`, `HOST`, `PORT`.
    ///
    /// `lookup` abstracts the environment so tests can feed fixed values.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("WEATHER_API_KEY") {
            self.upstream.api_key = key;
        }
        if let Some(ttl) = lookup("CACHE_TTL") {
            self.cache.ttl_secs = parse_env("CACHE_TTL", &ttl)?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_env("PORT", &port)?;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ClimaError::Config(format!("server listen address invalid: {e}")))
    }
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ClimaError::Config(format!("{name} must be a number: {e}")))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ClimaError::Config("server.port must not be 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_units")]
    pub units: String,

    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            units: default_units(),
            lang: default_lang(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClimaError::Config(
                "upstream.base_url must start with http:// or https://".into(),
            ));
        }
        if !(1..=120).contains(&self.timeout_secs) {
            return Err(ClimaError::Config(
                "upstream.timeout_secs must be between 1 and 120".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=86_400).contains(&self.ttl_secs) {
            return Err(ClimaError::Config(
                "cache.ttl_secs must be between 1 and 86400".into(),
            ));
        }
        Ok(())
    }
}

fn default_version() -> u32 {
    1
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}
fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".into()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_units() -> String {
    "metric".into()
}
fn default_lang() -> String {
    "es".into()
}
fn default_ttl_secs() -> u64 {
    60
}
