//! In-process temperature cache with lazy TTL eviction.

pub mod store;

pub use store::TtlCache;
