//! Top-level facade crate for clima.
//!
//! Re-exports the core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use clima_core::*;
}

pub mod gateway {
    pub use clima_gateway::*;
}
