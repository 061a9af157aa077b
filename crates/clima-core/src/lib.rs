//! clima core: transport-agnostic error types and the weather data model.
//!
//! This crate defines the error surface and the payload shapes shared by the
//! gateway, its upstream client, and tests. It intentionally carries no
//! transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ClimaError`/`FetchError` so a bad
//! upstream body never takes the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod weather;

/// Shared result type.
pub use error::{ClimaError, ErrorKind, FetchError, Result};
pub use weather::{normalize_city, ClimaPayload, WeatherReading};
