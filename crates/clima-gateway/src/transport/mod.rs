//! Transport layer (HTTP).
//!
//! Extracts query parameters and hands them to the service pipelines.

pub mod http;
