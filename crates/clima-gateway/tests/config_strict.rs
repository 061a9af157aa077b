#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;

use clima_core::ErrorKind;
use clima_gateway::config::{self, ClimaConfig};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
cache:
  ttl_sec: 30 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn ok_minimal_config_uses_defaults() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.cache.ttl_secs, 60);
    assert_eq!(cfg.upstream.timeout_secs, 15);
    assert_eq!(cfg.upstream.units, "metric");
    assert_eq!(cfg.listen_addr().unwrap().to_string(), "0.0.0.0:5000");
}

#[test]
fn full_config_round_trips_values() {
    let ok = r#"
version: 1
server: { host: "127.0.0.1", port: 8081 }
upstream:
  base_url: "http://localhost:9000/weather"
  api_key: "abc123"
  timeout_secs: 5
  lang: "en"
cache: { ttl_secs: 120 }
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.listen_addr().unwrap().port(), 8081);
    assert_eq!(cfg.upstream.api_key, "abc123");
    assert_eq!(cfg.upstream.lang, "en");
    assert_eq!(cfg.cache.ttl_secs, 120);
}

#[test]
fn rejects_out_of_range_values() {
    for bad in [
        "version: 2\n",
        "cache: { ttl_secs: 0 }\n",
        "upstream: { timeout_secs: 600 }\n",
        "upstream: { base_url: \"ftp://example.com\" }\n",
        "server: { port: 0 }\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "accepted: {bad}");
    }
}

#[test]
fn env_overrides_apply() {
    let env: HashMap<&str, &str> = [
        ("WEATHER_API_KEY", "k-1"),
        ("CACHE_TTL", "90"),
        ("HOST", "127.0.0.1"),
        ("PORT", "7000"),
    ]
    .into_iter()
    .collect();

    let mut cfg = ClimaConfig::default();
    cfg.apply_env_with(|name| env.get(name).map(|v| v.to_string()))
        .expect("overrides must apply");

    assert_eq!(cfg.upstream.api_key, "k-1");
    assert_eq!(cfg.cache.ttl_secs, 90);
    assert_eq!(cfg.listen_addr().unwrap().to_string(), "127.0.0.1:7000");
}

#[test]
fn env_override_with_garbage_number_fails() {
    let mut cfg = ClimaConfig::default();
    let err = cfg
        .apply_env_with(|name| (name == "CACHE_TTL").then(|| "soon".to_string()))
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Config);
}
