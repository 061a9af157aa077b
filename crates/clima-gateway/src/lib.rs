//! clima gateway library entry.
//!
//! This crate wires the config loader, temperature cache, metrics registry,
//! upstream weather client, and the `/clima` pipeline into an axum router.
//! It is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod cache;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
pub mod transport;
pub mod upstream;
