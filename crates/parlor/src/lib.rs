//! Top-level facade crate for parlor.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use parlor_core::*;
}

pub mod gateway {
    pub use parlor_gateway::*;
}
