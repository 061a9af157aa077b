//! Config loader (strict parsing + env overrides).

pub mod schema;

use std::fs;
use std::path::Path;

use clima_core::error::{ClimaError, Result};

pub use schema::{CacheSection, ClimaConfig, ServerSection, UpstreamSection};

const DEFAULT_CONFIG_FILE: &str = "clima.yaml";

pub fn load_from_file(path: &str) -> Result<ClimaConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ClimaError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ClimaConfig> {
    let cfg: ClimaConfig = serde_yaml::from_str(s)
        .map_err(|e| ClimaError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Startup loader: `$CLIMA_CONFIG`, else `clima.yaml` when present, else
/// built-in defaults; environment overrides are applied last.
pub fn load() -> Result<ClimaConfig> {
    let mut cfg = match std::env::var("CLIMA_CONFIG") {
        Ok(path) => load_from_file(&path)?,
        Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => load_from_file(DEFAULT_CONFIG_FILE)?,
        Err(_) => ClimaConfig::default(),
    };

    cfg.apply_env_with(|name| std::env::var(name).ok())?;
    cfg.validate()?;
    Ok(cfg)
}
