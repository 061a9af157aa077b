//! Request pipelines behind the HTTP routes.

pub mod weather;

pub use weather::{Reply, WeatherService, CLIMA_ENDPOINT};
