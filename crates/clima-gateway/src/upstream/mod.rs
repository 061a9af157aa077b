//! Upstream weather provider.
//!
//! Exposes the `WeatherSource` seam the request pipeline depends on and the
//! OpenWeatherMap-backed implementation used in production.

pub mod client;

pub use client::{OpenWeatherClient, WeatherSource};
